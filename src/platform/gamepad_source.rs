//=========================================================================
// Platform Gamepad Source
//
// Polls desktop gamepads through `gilrs` and converts their activity into
// client `DeviceEvent`s.
//
// Responsibilities:
// - Announce connects (with a guessed gamepad family) and disconnects
// - Translate standard-layout buttons
// - Track both sticks per gamepad and report them as one reading
//
// Notes:
// gilrs has no button count. A pad without any mapping (SDL or driver)
// reports only unknown buttons, so it is announced with zero buttons and
// the gamepad adapter never selects it. Stick y is flipped to the
// client's down-positive convention.
//
//=========================================================================

use std::collections::HashMap;

use gilrs::{Axis, Button, EventType, Gilrs, MappingSource};
use log::*;

use crate::core::input::{
    ButtonPhase, DeviceEvent, GamepadButton, GamepadDescriptor, GamepadId, GamepadKind, StickValues,
};

use super::input_buffer::InputBuffer;

/// Buttons of the standard layout the client maps.
const STANDARD_BUTTONS: usize = 12;

//=== Button Conversion ===================================================

/// Standard-layout button, or `None` for buttons the client ignores.
fn button(button: Button) -> Option<GamepadButton> {
    let mapped = match button {
        Button::South => GamepadButton::South,
        Button::East => GamepadButton::East,
        Button::West => GamepadButton::West,
        Button::North => GamepadButton::North,
        Button::DPadUp => GamepadButton::DPadUp,
        Button::DPadDown => GamepadButton::DPadDown,
        Button::DPadLeft => GamepadButton::DPadLeft,
        Button::DPadRight => GamepadButton::DPadRight,
        Button::LeftTrigger => GamepadButton::LeftBumper,
        Button::RightTrigger => GamepadButton::RightBumper,
        Button::Start => GamepadButton::Start,
        Button::Select => GamepadButton::Select,
        _ => return None,
    };
    Some(mapped)
}

/// Guesses the gamepad family from its reported name.
fn kind(name: &str) -> GamepadKind {
    let name = name.to_ascii_lowercase();
    if name.contains("xbox") || name.contains("xinput") {
        GamepadKind::Xbox
    } else if ["dualshock", "dualsense", "playstation", "ps4", "ps5", "sony"]
        .iter()
        .any(|tag| name.contains(tag))
    {
        GamepadKind::DualShock
    } else {
        GamepadKind::Generic
    }
}

//=== GamepadMapper =======================================================

/// Stateful converter: keeps the latest stick values per gamepad, since
/// gilrs reports one axis at a time.
#[derive(Debug, Default)]
pub(crate) struct GamepadMapper {
    sticks: HashMap<GamepadId, (StickValues, StickValues)>,
}

impl GamepadMapper {
    pub(crate) fn connected(&mut self, gamepad: GamepadId, name: &str, mapped: bool) -> DeviceEvent {
        self.sticks.insert(gamepad, (StickValues::ZERO, StickValues::ZERO));
        DeviceEvent::GamepadConnected(GamepadDescriptor {
            id: gamepad,
            kind: kind(name),
            button_count: if mapped { STANDARD_BUTTONS } else { 0 },
        })
    }

    pub(crate) fn disconnected(&mut self, gamepad: GamepadId) -> DeviceEvent {
        self.sticks.remove(&gamepad);
        DeviceEvent::GamepadDisconnected(gamepad)
    }

    pub(crate) fn button(&self, gamepad: GamepadId, pressed: Button, phase: ButtonPhase) -> Option<DeviceEvent> {
        button(pressed).map(|button| DeviceEvent::GamepadButton { gamepad, button, phase })
    }

    /// Updates one stick axis and returns the combined reading.
    pub(crate) fn axis(&mut self, gamepad: GamepadId, axis: Axis, value: f32) -> Option<DeviceEvent> {
        let (left, right) = self.sticks.entry(gamepad).or_default();
        match axis {
            Axis::LeftStickX => left.x = value,
            Axis::LeftStickY => left.y = -value,
            Axis::RightStickX => right.x = value,
            Axis::RightStickY => right.y = -value,
            _ => return None,
        }
        Some(DeviceEvent::GamepadSticks {
            gamepad,
            left: *left,
            right: *right,
        })
    }
}

//=== GamepadSource =======================================================

/// Owner of the gilrs context. Gamepads are optional: without a backend
/// the source stays silent.
pub(crate) struct GamepadSource {
    gilrs: Option<Gilrs>,
    mapper: GamepadMapper,
}

impl GamepadSource {
    pub(crate) fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            Err(gilrs::Error::NotImplemented(dummy)) => {
                warn!(target: "platform::gamepad", "Gamepads are not supported on this platform");
                Some(dummy)
            }
            Err(e) => {
                warn!(target: "platform::gamepad", "Gamepad backend unavailable: {}", e);
                None
            }
        };

        Self {
            gilrs,
            mapper: GamepadMapper::default(),
        }
    }

    /// Source without a backend.
    #[cfg(test)]
    pub(crate) fn disabled() -> Self {
        Self {
            gilrs: None,
            mapper: GamepadMapper::default(),
        }
    }

    /// Announces pads that are already connected. gilrs only reports
    /// connects that happen after it was created, and every application
    /// run starts with an empty gamepad manager.
    pub(crate) fn announce_connected(&mut self, buffer: &mut InputBuffer) {
        let Some(gilrs) = &self.gilrs else {
            return;
        };
        for (id, pad) in gilrs.gamepads() {
            debug!(target: "platform::gamepad", "Gamepad {} present: {}", id, pad.name());
            let mapped = pad.mapping_source() != MappingSource::None;
            buffer.push(self.mapper.connected(client_id(id), pad.name(), mapped));
        }
    }

    //--- poll() -----------------------------------------------------------
    //
    // Drains pending gilrs events into the buffer.
    //
    pub(crate) fn poll(&mut self, buffer: &mut InputBuffer) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };

        while let Some(gilrs::Event { id, event, .. }) = gilrs.next_event() {
            let gamepad = client_id(id);
            let mapped = match event {
                EventType::Connected => {
                    let pad = gilrs.gamepad(id);
                    info!(target: "platform::gamepad", "Gamepad {} connected: {}", id, pad.name());
                    let mapped = pad.mapping_source() != MappingSource::None;
                    Some(self.mapper.connected(gamepad, pad.name(), mapped))
                }
                EventType::Disconnected => {
                    info!(target: "platform::gamepad", "Gamepad {} disconnected", id);
                    Some(self.mapper.disconnected(gamepad))
                }
                EventType::ButtonPressed(button, _) => self.mapper.button(gamepad, button, ButtonPhase::Pressed),
                EventType::ButtonReleased(button, _) => self.mapper.button(gamepad, button, ButtonPhase::Released),
                EventType::AxisChanged(axis, value, _) => self.mapper.axis(gamepad, axis, value),
                _ => None,
            };

            match mapped {
                Some(event) => buffer.push(event),
                None => trace!(target: "platform::gamepad", "Unmapped gamepad event ignored"),
            }
        }
    }
}

fn client_id(id: gilrs::GamepadId) -> GamepadId {
    GamepadId(usize::from(id) as u32)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_guessed_from_name() {
        assert_eq!(kind("Xbox Wireless Controller"), GamepadKind::Xbox);
        assert_eq!(kind("Sony DualSense"), GamepadKind::DualShock);
        assert_eq!(kind("PS4 Controller"), GamepadKind::DualShock);
        assert_eq!(kind("8BitDo Pro 2"), GamepadKind::Generic);
    }

    #[test]
    fn unmapped_pad_reports_no_buttons() {
        let mut mapper = GamepadMapper::default();

        let event = mapper.connected(GamepadId(0), "Mystery Stick", false);
        assert_eq!(
            event,
            DeviceEvent::GamepadConnected(GamepadDescriptor {
                id: GamepadId(0),
                kind: GamepadKind::Generic,
                button_count: 0,
            })
        );

        let DeviceEvent::GamepadConnected(descriptor) = mapper.connected(GamepadId(1), "Xbox 360", true) else {
            panic!("expected a connect event");
        };
        assert_eq!(descriptor.button_count, STANDARD_BUTTONS);
    }

    #[test]
    fn standard_buttons_convert() {
        let mapper = GamepadMapper::default();

        assert_eq!(
            mapper.button(GamepadId(2), Button::South, ButtonPhase::Pressed),
            Some(DeviceEvent::GamepadButton {
                gamepad: GamepadId(2),
                button: GamepadButton::South,
                phase: ButtonPhase::Pressed,
            })
        );
        assert_eq!(button(Button::LeftTrigger), Some(GamepadButton::LeftBumper));
        assert_eq!(mapper.button(GamepadId(2), Button::Mode, ButtonPhase::Pressed), None);
    }

    #[test]
    fn axes_combine_into_one_reading_with_y_flipped() {
        let mut mapper = GamepadMapper::default();
        mapper.connected(GamepadId(0), "Xbox", true);

        mapper.axis(GamepadId(0), Axis::LeftStickX, 0.5);
        let event = mapper.axis(GamepadId(0), Axis::RightStickY, 1.0);

        assert_eq!(
            event,
            Some(DeviceEvent::GamepadSticks {
                gamepad: GamepadId(0),
                left: StickValues::new(0.5, 0.0),
                right: StickValues::new(0.0, -1.0),
            })
        );
        assert_eq!(mapper.axis(GamepadId(0), Axis::LeftZ, 1.0), None);
    }

    #[test]
    fn disconnect_forgets_stick_state() {
        let mut mapper = GamepadMapper::default();
        mapper.axis(GamepadId(0), Axis::LeftStickX, 1.0);

        assert_eq!(mapper.disconnected(GamepadId(0)), DeviceEvent::GamepadDisconnected(GamepadId(0)));

        let event = mapper.axis(GamepadId(0), Axis::LeftStickY, 0.0);
        assert_eq!(
            event,
            Some(DeviceEvent::GamepadSticks {
                gamepad: GamepadId(0),
                left: StickValues::ZERO,
                right: StickValues::ZERO,
            })
        );
    }
}
