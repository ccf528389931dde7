//=========================================================================
// Input Actions
//=========================================================================
//
// Semantic actions produced by the controls map and consumed by screens.
//
// Actions: what a raw input means (ACTIVATE, MOVE_UP, ...).
// Action list: what a screen declares it reacts to, with its debounce
// policy.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== InputAction =========================================================

/// Semantic action recognised by the client.
///
/// Screens bind handlers to a subset of these through their action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputAction {
    //--- Selection --------------------------------------------------------

    Activate,
    GoBack,

    //--- Translation ------------------------------------------------------

    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveIn,
    MoveOut,

    //--- Rotation ---------------------------------------------------------

    RotateLeft,
    RotateRight,

    //--- System -----------------------------------------------------------

    Pause,
}

impl InputAction {
    /// Every action, in declaration order.
    pub const ALL: [InputAction; 11] = [
        Self::Activate,
        Self::GoBack,
        Self::MoveUp,
        Self::MoveDown,
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveIn,
        Self::MoveOut,
        Self::RotateLeft,
        Self::RotateRight,
        Self::Pause,
    ];

    /// Upper-case name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Activate => "ACTIVATE",
            Self::GoBack => "GO_BACK",
            Self::MoveUp => "MOVE_UP",
            Self::MoveDown => "MOVE_DOWN",
            Self::MoveLeft => "MOVE_LEFT",
            Self::MoveRight => "MOVE_RIGHT",
            Self::MoveIn => "MOVE_IN",
            Self::MoveOut => "MOVE_OUT",
            Self::RotateLeft => "ROTATE_LEFT",
            Self::RotateRight => "ROTATE_RIGHT",
            Self::Pause => "PAUSE",
        }
    }
}

impl fmt::Display for InputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//=== ActionListItem ======================================================

/// One entry of a screen's declared action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionListItem {
    pub action: InputAction,

    /// Wrap the handler in a debounce guard.
    pub should_bounce: bool,
}

impl ActionListItem {
    /// Action whose handler is debounced.
    pub const fn bounced(action: InputAction) -> Self {
        Self { action, should_bounce: true }
    }

    /// Action whose handler runs on every dispatch.
    pub const fn direct(action: InputAction) -> Self {
        Self { action, should_bounce: false }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
