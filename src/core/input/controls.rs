//=========================================================================
// Controls Map
//=========================================================================
//
// Static raw-input → action bindings shared by every screen.
//
// Architecture:
//   InputKey::Key(code)      → key_bindings      → InputAction
//   InputKey::PointerTap     → pointer_binding   → InputAction
//   InputKey::Mapped(action) → action (already resolved by the gamepad)
//   GamepadButton            → gamepad_bindings  → InputAction
//
// Keys absent from the map are unmapped input and are dropped silently.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::{
    action::InputAction,
    event::{InputKey, KeyCode},
    gamepad::GamepadButton,
};

//=== ControlsMap =========================================================

/// Raw input to action bindings.
///
/// [`ControlsMap::default`] carries the stock bindings; [`ControlsMap::new`]
/// starts empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsMap {
    key_bindings: HashMap<KeyCode, InputAction>,
    gamepad_bindings: HashMap<GamepadButton, InputAction>,
    pointer_binding: Option<InputAction>,
}

impl ControlsMap {
    /// Creates a map with no bindings.
    pub fn new() -> Self {
        Self {
            key_bindings: HashMap::new(),
            gamepad_bindings: HashMap::new(),
            pointer_binding: None,
        }
    }

    //--- Binding API ------------------------------------------------------

    /// Binds a keyboard key to an action, replacing any previous binding.
    pub fn bind_key(&mut self, key: KeyCode, action: InputAction) -> &mut Self {
        self.key_bindings.insert(key, action);
        self
    }

    /// Removes a keyboard binding.
    pub fn unbind_key(&mut self, key: KeyCode) -> &mut Self {
        self.key_bindings.remove(&key);
        self
    }

    /// Binds a gamepad button to an action.
    pub fn bind_gamepad_button(&mut self, button: GamepadButton, action: InputAction) -> &mut Self {
        self.gamepad_bindings.insert(button, action);
        self
    }

    /// Binds pointer taps to an action (`None` disables the pointer).
    pub fn bind_pointer(&mut self, action: Option<InputAction>) -> &mut Self {
        self.pointer_binding = action;
        self
    }

    /// Removes every binding.
    pub fn clear(&mut self) {
        self.key_bindings.clear();
        self.gamepad_bindings.clear();
        self.pointer_binding = None;
    }

    //--- Lookup -----------------------------------------------------------

    /// Resolves an input map key to its action.
    pub fn action_for(&self, key: &InputKey) -> Option<InputAction> {
        match key {
            InputKey::Key(code) => self.key_bindings.get(code).copied(),
            InputKey::PointerTap => self.pointer_binding,
            InputKey::Mapped(action) => Some(*action),
        }
    }

    /// Returns `true` if the keyboard key is bound.
    pub fn is_key_mapped(&self, key: KeyCode) -> bool {
        self.key_bindings.contains_key(&key)
    }

    /// Resolves a gamepad button to its action.
    pub fn action_for_button(&self, button: GamepadButton) -> Option<InputAction> {
        self.gamepad_bindings.get(&button).copied()
    }
}

impl Default for ControlsMap {
    fn default() -> Self {
        use GamepadButton as Pad;
        use InputAction::*;
        use KeyCode::*;

        let mut controls = Self::new();

        //--- Keyboard -----------------------------------------------------
        for (key, action) in [
            (KeyW, MoveUp),
            (ArrowUp, MoveUp),
            (KeyS, MoveDown),
            (ArrowDown, MoveDown),
            (KeyA, MoveLeft),
            (ArrowLeft, MoveLeft),
            (KeyD, MoveRight),
            (ArrowRight, MoveRight),
            (Enter, Activate),
            (Space, Activate),
            (Escape, GoBack),
            (Backspace, GoBack),
            (Delete, GoBack),
            (KeyQ, RotateLeft),
            (KeyE, RotateRight),
            (KeyP, Pause),
        ] {
            controls.bind_key(key, action);
        }

        //--- Pointer ------------------------------------------------------
        controls.bind_pointer(Some(Activate));

        //--- Gamepad ------------------------------------------------------
        for (button, action) in [
            (Pad::South, Activate),
            (Pad::East, GoBack),
            (Pad::DPadUp, MoveUp),
            (Pad::DPadDown, MoveDown),
            (Pad::DPadLeft, MoveLeft),
            (Pad::DPadRight, MoveRight),
            (Pad::LeftBumper, RotateLeft),
            (Pad::RightBumper, RotateRight),
            (Pad::Start, Pause),
        ] {
            controls.bind_gamepad_button(button, action);
        }

        controls
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_menu_navigation() {
        let controls = ControlsMap::default();
        assert_eq!(controls.action_for(&InputKey::Key(KeyCode::KeyW)), Some(InputAction::MoveUp));
        assert_eq!(controls.action_for(&InputKey::Key(KeyCode::ArrowDown)), Some(InputAction::MoveDown));
        assert_eq!(controls.action_for(&InputKey::Key(KeyCode::Enter)), Some(InputAction::Activate));
        assert_eq!(controls.action_for(&InputKey::Key(KeyCode::Escape)), Some(InputAction::GoBack));
        assert_eq!(controls.action_for(&InputKey::PointerTap), Some(InputAction::Activate));
        assert_eq!(controls.action_for_button(GamepadButton::South), Some(InputAction::Activate));
    }

    #[test]
    fn unmapped_key_resolves_to_none() {
        let controls = ControlsMap::default();
        assert_eq!(controls.action_for(&InputKey::Key(KeyCode::KeyZ)), None);
        assert!(!controls.is_key_mapped(KeyCode::KeyZ));
    }

    #[test]
    fn mapped_entries_resolve_to_themselves() {
        let controls = ControlsMap::new();
        assert_eq!(
            controls.action_for(&InputKey::Mapped(InputAction::MoveIn)),
            Some(InputAction::MoveIn)
        );
    }

    #[test]
    fn rebinding_replaces_previous_action() {
        let mut controls = ControlsMap::default();
        controls.bind_key(KeyCode::Space, InputAction::Pause);
        assert_eq!(controls.action_for(&InputKey::Key(KeyCode::Space)), Some(InputAction::Pause));

        controls.unbind_key(KeyCode::Space);
        assert_eq!(controls.action_for(&InputKey::Key(KeyCode::Space)), None);
    }

    #[test]
    fn clear_removes_everything() {
        let mut controls = ControlsMap::default();
        controls.clear();
        assert_eq!(controls.action_for(&InputKey::Key(KeyCode::KeyW)), None);
        assert_eq!(controls.action_for(&InputKey::PointerTap), None);
        assert_eq!(controls.action_for_button(GamepadButton::South), None);
    }
}
