//=========================================================================
// Input Event Types
//
// Defines the client's representation of low-level device input.
//
// This module abstracts away platform-specific input (e.g. Winit, a
// browser host) into a unified format consumed by the device adapters.
//
// Responsibilities:
// - Represent keyboard, pointer and gamepad inputs in a portable way
// - Identify raw inputs inside the shared input map (`InputKey`)
// - Carry the most recent raw event to action handlers (`RawInputEvent`)
//
// Event Flow:
// ```text
// Platform Layer (Winit)
//         ↓
//    DeviceEvent (this module)
//         ↓
//    Scene observables → device adapters
//         ↓
//    InputMap (InputKey → RawInputEvent)
//         ↓
//    InputCommand (action + last event)
// ```
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::action::InputAction;
use super::gamepad::{GamepadButton, GamepadDescriptor, GamepadId, StickValues};

//=== MouseButton =========================================================

/// Physical pointer button identifier.
///
/// The `Other` variant covers side buttons, pen barrels and any
/// non-standard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left, or a touch contact).
    Left,

    /// Secondary button (typically right).
    Right,

    /// Middle button (wheel click).
    Middle,

    /// Any other button.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
///
/// Coverage:
/// - Alphanumeric keys (A-Z, 0-9)
/// - Arrow keys
/// - Common special keys (Space, Enter, Escape, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    ShiftLeft,
    ShiftRight,

    /// Fallback for keys the platform layer cannot name.
    Unidentified,
}

//=== ButtonPhase =========================================================

/// Press or release edge of a digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonPhase {
    Pressed,
    Released,
}

//=== KeyboardInfo ========================================================

/// A keyboard event as delivered by the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyboardInfo {
    pub key: KeyCode,
    pub phase: ButtonPhase,
}

impl KeyboardInfo {
    pub fn down(key: KeyCode) -> Self {
        Self { key, phase: ButtonPhase::Pressed }
    }

    pub fn up(key: KeyCode) -> Self {
        Self { key, phase: ButtonPhase::Released }
    }
}

//=== PointerInfo =========================================================

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down(MouseButton),
    Up(MouseButton),
    Move,
}

/// A pointer event in screen space (pixels, top-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInfo {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

impl PointerInfo {
    pub fn down(button: MouseButton, x: f32, y: f32) -> Self {
        Self { kind: PointerKind::Down(button), x, y }
    }

    pub fn up(button: MouseButton, x: f32, y: f32) -> Self {
        Self { kind: PointerKind::Up(button), x, y }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self { kind: PointerKind::Move, x, y }
    }
}

//=== InputKey ============================================================

/// Key of an entry in the shared input map.
///
/// Keyboard entries are keyed by physical key, the pointer by a synthetic
/// tap tag, and gamepad inputs by the action they were mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    Key(KeyCode),
    PointerTap,
    Mapped(InputAction),
}

//=== RawInputEvent =======================================================

/// Most recent raw event recorded for an input map entry.
///
/// Handed to action handlers alongside their prior state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInputEvent {
    Keyboard(KeyboardInfo),
    Pointer(PointerInfo),
    GamepadButton {
        gamepad: GamepadId,
        button: GamepadButton,
    },

    /// Normalised stick deflection that exceeded the dead zone.
    Axis {
        gamepad: GamepadId,
        value: f32,
    },
}

impl RawInputEvent {
    /// Returns `true` for analog stick entries.
    pub fn is_axis(&self) -> bool {
        matches!(self, Self::Axis { .. })
    }
}

//=== DeviceEvent =========================================================

/// Host-level device event routed into the client once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    Keyboard(KeyboardInfo),
    Pointer(PointerInfo),
    GamepadConnected(GamepadDescriptor),
    GamepadDisconnected(GamepadId),
    GamepadButton {
        gamepad: GamepadId,
        button: GamepadButton,
        phase: ButtonPhase,
    },
    GamepadSticks {
        gamepad: GamepadId,
        left: StickValues,
        right: StickValues,
    },
}

impl DeviceEvent {
    /// Continuous events may be coalesced by the platform (last one wins).
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            Self::Pointer(PointerInfo { kind: PointerKind::Move, .. }) | Self::GamepadSticks { .. }
        )
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
