//=========================================================================
// Gamepads
//=========================================================================
//
// Host-agnostic gamepad model shared by every scene.
//
// Architecture:
//   DeviceEvent::Gamepad* → GamepadManager::handle()
//       → on_connected / on_disconnected (Rc<Gamepad>)
//       → Gamepad::on_button_down / on_button_up
//       → stick cells (polled by the gamepad adapter)
//
// Connect and disconnect are announced through observables; stick values
// are only stored and never announced.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::event::{ButtonPhase, DeviceEvent};
use crate::core::observable::Observable;

//=== Identifiers =========================================================

/// Host-assigned gamepad slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GamepadId(pub u32);

/// Digital gamepad button, in standard layout naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    South,
    East,
    West,
    North,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    LeftBumper,
    RightBumper,
    Start,
    Select,
}

/// Gamepad family reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadKind {
    Xbox,
    DualShock,
    Generic,

    /// Motion controllers; never selected for menu input.
    PoseEnabled,
}

/// Data carried by a connect event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamepadDescriptor {
    pub id: GamepadId,
    pub kind: GamepadKind,
    pub button_count: usize,
}

//=== StickValues =========================================================

/// Analog stick deflection, `x` right-positive and `y` down-positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickValues {
    pub x: f32,
    pub y: f32,
}

impl StickValues {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamps to the unit square, applies a radial dead zone and rescales
    /// the remaining range back to `[0, 1]`.
    pub fn normalized(self, dead_zone: f32) -> Self {
        let x = self.x.clamp(-1.0, 1.0);
        let y = self.y.clamp(-1.0, 1.0);
        let magnitude = (x * x + y * y).sqrt();

        if magnitude <= dead_zone || magnitude == 0.0 {
            return Self::ZERO;
        }

        let scaled = ((magnitude - dead_zone) / (1.0 - dead_zone)).min(1.0);
        let factor = scaled / magnitude;
        Self::new(x * factor, y * factor)
    }
}

//=== Gamepad =============================================================

/// A connected gamepad.
pub struct Gamepad {
    descriptor: GamepadDescriptor,
    left_stick: Cell<StickValues>,
    right_stick: Cell<StickValues>,

    pub on_button_down: Observable<GamepadButton>,
    pub on_button_up: Observable<GamepadButton>,
}

impl Gamepad {
    pub fn new(descriptor: GamepadDescriptor) -> Self {
        Self {
            descriptor,
            left_stick: Cell::new(StickValues::ZERO),
            right_stick: Cell::new(StickValues::ZERO),
            on_button_down: Observable::new(),
            on_button_up: Observable::new(),
        }
    }

    pub fn id(&self) -> GamepadId {
        self.descriptor.id
    }

    pub fn kind(&self) -> GamepadKind {
        self.descriptor.kind
    }

    pub fn button_count(&self) -> usize {
        self.descriptor.button_count
    }

    /// Gamepads reporting zero buttons are host artefacts, not controllers.
    pub fn has_buttons(&self) -> bool {
        self.descriptor.button_count > 0
    }

    pub fn left_stick(&self) -> StickValues {
        self.left_stick.get()
    }

    pub fn right_stick(&self) -> StickValues {
        self.right_stick.get()
    }

    pub fn set_sticks(&self, left: StickValues, right: StickValues) {
        self.left_stick.set(left);
        self.right_stick.set(right);
    }
}

impl std::fmt::Debug for Gamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gamepad")
            .field("descriptor", &self.descriptor)
            .field("left_stick", &self.left_stick.get())
            .field("right_stick", &self.right_stick.get())
            .finish()
    }
}

//=== GamepadManager ======================================================

/// Tracks connected gamepads and announces connection changes.
#[derive(Debug, Default)]
pub struct GamepadManager {
    gamepads: RefCell<Vec<Rc<Gamepad>>>,

    pub on_connected: Observable<Rc<Gamepad>>,
    pub on_disconnected: Observable<Rc<Gamepad>>,
}

impl GamepadManager {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Event Intake -----------------------------------------------------

    /// Applies a gamepad device event. Returns `false` for other events.
    pub fn handle(&self, event: &DeviceEvent) -> bool {
        match event {
            DeviceEvent::GamepadConnected(descriptor) => {
                self.connect(*descriptor);
            }
            DeviceEvent::GamepadDisconnected(id) => {
                self.disconnect(*id);
            }
            DeviceEvent::GamepadButton { gamepad, button, phase } => {
                if let Some(pad) = self.get(*gamepad) {
                    match phase {
                        ButtonPhase::Pressed => pad.on_button_down.notify(button),
                        ButtonPhase::Released => pad.on_button_up.notify(button),
                    }
                }
            }
            DeviceEvent::GamepadSticks { gamepad, left, right } => {
                if let Some(pad) = self.get(*gamepad) {
                    pad.set_sticks(*left, *right);
                }
            }
            _ => return false,
        }
        true
    }

    fn connect(&self, descriptor: GamepadDescriptor) {
        if self.get(descriptor.id).is_some() {
            debug!("Gamepad {:?} already connected", descriptor.id);
            return;
        }

        info!("Gamepad connected: {:?}", descriptor);
        let pad = Rc::new(Gamepad::new(descriptor));
        self.gamepads.borrow_mut().push(Rc::clone(&pad));
        self.on_connected.notify(&pad);
    }

    fn disconnect(&self, id: GamepadId) {
        let removed = {
            let mut gamepads = self.gamepads.borrow_mut();
            let index = gamepads.iter().position(|p| p.id() == id);
            index.map(|i| gamepads.remove(i))
        };

        if let Some(pad) = removed {
            info!("Gamepad disconnected: {:?}", id);
            self.on_disconnected.notify(&pad);
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn get(&self, id: GamepadId) -> Option<Rc<Gamepad>> {
        self.gamepads.borrow().iter().find(|p| p.id() == id).cloned()
    }

    /// Connected gamepads in connection order.
    pub fn gamepads(&self) -> Vec<Rc<Gamepad>> {
        self.gamepads.borrow().clone()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
