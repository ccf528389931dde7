//=========================================================================
// Platform Event Mapper
//
// Converts Winit window input into client `DeviceEvent`s.
//
// Responsibilities:
// - Translate keyboard keys and mouse buttons
// - Attach the last known cursor position to mouse button events
// - Drop OS key repeat and keys the client has no code for
//
//=========================================================================

use winit::event::{ElementState, KeyEvent, MouseButton as WinitMouseButton};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::core::input::{DeviceEvent, KeyCode, KeyboardInfo, MouseButton, PointerInfo};

//=== Key Conversion ======================================================

impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Numeric keys -----------------------------------------------------
            Digit0 => KeyCode::Digit0, Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2, Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4, Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6, Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8, Digit9 => KeyCode::Digit9,

            //--- Alphabetic keys --------------------------------------------------
            KeyA => KeyCode::KeyA, KeyB => KeyCode::KeyB, KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD, KeyE => KeyCode::KeyE, KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG, KeyH => KeyCode::KeyH, KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ, KeyK => KeyCode::KeyK, KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM, KeyN => KeyCode::KeyN, KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP, KeyQ => KeyCode::KeyQ, KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS, KeyT => KeyCode::KeyT, KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV, KeyW => KeyCode::KeyW, KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY, KeyZ => KeyCode::KeyZ,

            //--- Arrow keys -------------------------------------------------------
            ArrowDown => KeyCode::ArrowDown, ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight, ArrowUp => KeyCode::ArrowUp,

            //--- Menu / editing keys ----------------------------------------------
            Space => KeyCode::Space, Enter => KeyCode::Enter,
            NumpadEnter => KeyCode::Enter, Escape => KeyCode::Escape,
            Tab => KeyCode::Tab, Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,
            ShiftLeft => KeyCode::ShiftLeft, ShiftRight => KeyCode::ShiftRight,

            //--- Fallback ---------------------------------------------------------
            _ => KeyCode::Unidentified,
        }
    }
}

//=== Mouse Conversion ====================================================

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=== EventMapper =========================================================

/// Stateful converter: remembers the cursor so button events carry a
/// position, as pointer events do on the web.
#[derive(Debug, Default)]
pub(crate) struct EventMapper {
    cursor: (f32, f32),
}

impl EventMapper {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Converts a key event. Repeats and unknown keys yield `None`.
    pub(crate) fn key(&self, event: &KeyEvent) -> Option<DeviceEvent> {
        if event.repeat {
            return None;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        self.key_code(code, event.state)
    }

    pub(crate) fn key_code(&self, code: WinitKeyCode, state: ElementState) -> Option<DeviceEvent> {
        let key = KeyCode::from(code);
        if key == KeyCode::Unidentified {
            return None;
        }
        let info = match state {
            ElementState::Pressed => KeyboardInfo::down(key),
            ElementState::Released => KeyboardInfo::up(key),
        };
        Some(DeviceEvent::Keyboard(info))
    }

    pub(crate) fn mouse_button(&self, button: WinitMouseButton, state: ElementState) -> DeviceEvent {
        let button = MouseButton::from(button);
        let (x, y) = self.cursor;
        let info = match state {
            ElementState::Pressed => PointerInfo::down(button, x, y),
            ElementState::Released => PointerInfo::up(button, x, y),
        };
        DeviceEvent::Pointer(info)
    }

    pub(crate) fn cursor_moved(&mut self, x: f64, y: f64) -> DeviceEvent {
        self.cursor = (x as f32, y as f32);
        DeviceEvent::Pointer(PointerInfo::moved(self.cursor.0, self.cursor.1))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
