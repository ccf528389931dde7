//=========================================================================
// Input Device Adapters
//=========================================================================
//
// Per-device listeners that keep the Input Manager's pressed-input map
// current for one scene.
//
// Architecture:
//   scene / gamepad observables ──(observer)──► crossbeam channel
//                                                      │
//   InputManager::get_inputs() → check_inputs(&mut InputMap) ◄┘
//
// Observers never touch the map directly: they forward a copy of the
// event, and the adapter applies it when polled. Analog sticks have no
// events at all and are read on every poll.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::{
    action::InputAction,
    controls::ControlsMap,
    event::{ButtonPhase, InputKey, KeyboardInfo, PointerInfo, PointerKind, RawInputEvent},
    gamepad::{Gamepad, GamepadButton, GamepadId, GamepadKind, GamepadManager},
    input_map::InputMap,
};
use crate::core::{observable::ObserverToken, scene::Scene};

//=== DeviceAdapter =======================================================

/// Disposable per-scene device subscription.
pub trait DeviceAdapter {
    /// Applies pending device events (and polled values) to the map.
    fn check_inputs(&mut self, map: &mut InputMap);

    /// Drops every subscription. Further polls are no-ops.
    fn dispose(&mut self);
}

//=========================================================================
// Keyboard
//=========================================================================

pub struct KeyboardAdapter {
    scene: Rc<Scene>,
    controls: Rc<ControlsMap>,
    token: Option<ObserverToken>,
    events: Receiver<KeyboardInfo>,
}

impl KeyboardAdapter {
    pub fn enable(scene: &Rc<Scene>, controls: Rc<ControlsMap>) -> Self {
        let (tx, rx) = unbounded();
        let token = scene.on_keyboard.add(move |info| {
            let _ = tx.send(*info);
        });

        Self {
            scene: Rc::clone(scene),
            controls,
            token: Some(token),
            events: rx,
        }
    }
}

impl DeviceAdapter for KeyboardAdapter {
    fn check_inputs(&mut self, map: &mut InputMap) {
        for info in self.events.try_iter() {
            if !self.controls.is_key_mapped(info.key) {
                continue;
            }
            let key = InputKey::Key(info.key);
            match info.phase {
                ButtonPhase::Pressed => {
                    map.press(key, RawInputEvent::Keyboard(info));
                }
                ButtonPhase::Released => {
                    map.release(&key);
                }
            }
        }
    }

    fn dispose(&mut self) {
        if let Some(token) = self.token.take() {
            self.scene.on_keyboard.remove(token);
        }
        self.events.try_iter().for_each(drop);
    }
}

//=========================================================================
// Pointer
//=========================================================================

pub struct PointerAdapter {
    scene: Rc<Scene>,
    token: Option<ObserverToken>,
    events: Receiver<PointerInfo>,
}

impl PointerAdapter {
    pub fn enable(scene: &Rc<Scene>) -> Self {
        let (tx, rx) = unbounded();
        let token = scene.on_pointer.add(move |info| {
            if !matches!(info.kind, PointerKind::Move) {
                let _ = tx.send(*info);
            }
        });

        Self {
            scene: Rc::clone(scene),
            token: Some(token),
            events: rx,
        }
    }
}

impl DeviceAdapter for PointerAdapter {
    fn check_inputs(&mut self, map: &mut InputMap) {
        for info in self.events.try_iter() {
            match info.kind {
                PointerKind::Down(_) => {
                    map.press(InputKey::PointerTap, RawInputEvent::Pointer(info));
                }
                PointerKind::Up(_) => {
                    map.release(&InputKey::PointerTap);
                }
                PointerKind::Move => {}
            }
        }
    }

    fn dispose(&mut self) {
        if let Some(token) = self.token.take() {
            self.scene.on_pointer.remove(token);
        }
        self.events.try_iter().for_each(drop);
    }
}

//=========================================================================
// Gamepad
//=========================================================================

/// Gamepad activity forwarded from manager and pad observables.
enum GamepadSignal {
    Connected(Rc<Gamepad>),
    Disconnected(GamepadId),
    Button(GamepadId, GamepadButton, ButtonPhase),
}

/// Button subscription on the selected gamepad.
struct Selection {
    pad: Rc<Gamepad>,
    down: ObserverToken,
    up: ObserverToken,
}

pub struct GamepadAdapter {
    gamepads: Rc<GamepadManager>,
    controls: Rc<ControlsMap>,
    preferred: GamepadKind,
    dead_zone: f32,

    selection: Option<Selection>,
    manager_tokens: Option<(ObserverToken, ObserverToken)>,
    sender: Sender<GamepadSignal>,
    events: Receiver<GamepadSignal>,
}

impl GamepadAdapter {
    /// Subscribes to the scene's gamepad manager and selects an already
    /// connected gamepad if there is one.
    pub fn enable(scene: &Rc<Scene>, controls: Rc<ControlsMap>, preferred: GamepadKind, dead_zone: f32) -> Self {
        let gamepads = Rc::clone(scene.gamepads());
        let (tx, rx) = unbounded();

        let connected_tx = tx.clone();
        let connected = gamepads.on_connected.add(move |pad| {
            let _ = connected_tx.send(GamepadSignal::Connected(Rc::clone(pad)));
        });
        let disconnected_tx = tx.clone();
        let disconnected = gamepads.on_disconnected.add(move |pad| {
            let _ = disconnected_tx.send(GamepadSignal::Disconnected(pad.id()));
        });

        let mut adapter = Self {
            gamepads,
            controls,
            preferred,
            dead_zone,
            selection: None,
            manager_tokens: Some((connected, disconnected)),
            sender: tx,
            events: rx,
        };

        let connected = adapter.gamepads.gamepads();
        let usable = |pad: &&Rc<Gamepad>| pad.has_buttons() && pad.kind() != GamepadKind::PoseEnabled;
        let initial = connected
            .iter()
            .filter(usable)
            .find(|pad| pad.kind() == preferred)
            .or_else(|| connected.iter().find(usable));

        if let Some(pad) = initial {
            adapter.select(Rc::clone(pad));
        }
        info!("Gamepad input enabled, selected: {:?}", adapter.selected());

        adapter
    }

    /// Currently selected gamepad.
    pub fn selected(&self) -> Option<GamepadId> {
        self.selection.as_ref().map(|s| s.pad.id())
    }

    //--- Selection --------------------------------------------------------

    /// Selects `pad` if it is usable and wins over the current selection.
    /// Inputs held on a replaced pad are dropped from the map, since its
    /// release events are no longer delivered.
    fn consider(&mut self, pad: Rc<Gamepad>, map: &mut InputMap) {
        if !pad.has_buttons() {
            debug!("Ignoring gamepad {:?} reporting no buttons", pad.id());
            return;
        }
        if pad.kind() == GamepadKind::PoseEnabled {
            debug!("Ignoring pose-enabled gamepad {:?}", pad.id());
            return;
        }
        if self.selection.is_some() && pad.kind() != self.preferred {
            return;
        }

        if let Some(previous) = self.selected().filter(|id| *id != pad.id()) {
            debug!("Gamepad {:?} replaced by {:?}", previous, pad.id());
            map.retain(|_, event| !from_gamepad(event, previous));
        }
        self.select(pad);
    }

    fn select(&mut self, pad: Rc<Gamepad>) {
        self.unsubscribe();

        let id = pad.id();
        let down_tx = self.sender.clone();
        let down = pad.on_button_down.add(move |button| {
            let _ = down_tx.send(GamepadSignal::Button(id, *button, ButtonPhase::Pressed));
        });
        let up_tx = self.sender.clone();
        let up = pad.on_button_up.add(move |button| {
            let _ = up_tx.send(GamepadSignal::Button(id, *button, ButtonPhase::Released));
        });

        debug!("Gamepad {:?} ({:?}) selected", id, pad.kind());
        self.selection = Some(Selection { pad, down, up });
    }

    fn unsubscribe(&mut self) {
        if let Some(selection) = self.selection.take() {
            selection.pad.on_button_down.remove(selection.down);
            selection.pad.on_button_up.remove(selection.up);
        }
    }

    //--- Mapping ----------------------------------------------------------

    fn apply_button(&self, map: &mut InputMap, gamepad: GamepadId, button: GamepadButton, phase: ButtonPhase) {
        let Some(action) = self.controls.action_for_button(button) else {
            return;
        };
        let key = InputKey::Mapped(action);
        match phase {
            ButtonPhase::Pressed => {
                map.press(key, RawInputEvent::GamepadButton { gamepad, button });
            }
            ButtonPhase::Released => {
                map.release(&key);
            }
        }
    }

    fn apply_sticks(&self, map: &mut InputMap) {
        let Some(selection) = &self.selection else {
            return;
        };
        let id = selection.pad.id();
        let left = selection.pad.left_stick().normalized(self.dead_zone);
        let right = selection.pad.right_stick().normalized(self.dead_zone);

        apply_axis(map, id, left.x, InputAction::MoveLeft, InputAction::MoveRight);
        apply_axis(map, id, left.y, InputAction::MoveUp, InputAction::MoveDown);
        apply_axis(map, id, right.x, InputAction::RotateLeft, InputAction::RotateRight);
        apply_axis(map, id, right.y, InputAction::MoveIn, InputAction::MoveOut);
    }
}

impl DeviceAdapter for GamepadAdapter {
    fn check_inputs(&mut self, map: &mut InputMap) {
        let signals: Vec<GamepadSignal> = self.events.try_iter().collect();

        for signal in signals {
            match signal {
                GamepadSignal::Connected(pad) => self.consider(pad, map),
                GamepadSignal::Disconnected(id) => {
                    if self.selected() == Some(id) {
                        info!("Selected gamepad {:?} disconnected", id);
                        self.unsubscribe();
                        map.retain(|_, event| !from_gamepad(event, id));
                    }
                }
                GamepadSignal::Button(id, button, phase) => {
                    if self.selected() == Some(id) {
                        self.apply_button(map, id, button, phase);
                    }
                }
            }
        }

        self.apply_sticks(map);
    }

    fn dispose(&mut self) {
        if let Some((connected, disconnected)) = self.manager_tokens.take() {
            self.gamepads.on_connected.remove(connected);
            self.gamepads.on_disconnected.remove(disconnected);
        }
        self.unsubscribe();
        self.events.try_iter().for_each(drop);
    }
}

//--- Helpers --------------------------------------------------------------

/// Maps one normalised axis onto a pair of opposing actions.
fn apply_axis(map: &mut InputMap, gamepad: GamepadId, value: f32, negative: InputAction, positive: InputAction) {
    if value == 0.0 {
        release_axis(map, negative);
        release_axis(map, positive);
        return;
    }

    let (on, off) = if value < 0.0 { (negative, positive) } else { (positive, negative) };
    map.press(InputKey::Mapped(on), RawInputEvent::Axis { gamepad, value: value.abs() });
    release_axis(map, off);
}

/// Releases a mapped action only if it is currently held by a stick.
fn release_axis(map: &mut InputMap, action: InputAction) {
    let key = InputKey::Mapped(action);
    if map.get(&key).is_some_and(RawInputEvent::is_axis) {
        map.release(&key);
    }
}

fn from_gamepad(event: &RawInputEvent, id: GamepadId) -> bool {
    match event {
        RawInputEvent::GamepadButton { gamepad, .. } | RawInputEvent::Axis { gamepad, .. } => *gamepad == id,
        _ => false,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::{testing::MockHost, HostEngine};
    use crate::core::input::{
        event::{DeviceEvent, KeyCode, MouseButton},
        gamepad::{GamepadDescriptor, StickValues},
    };

    //--- Helpers ----------------------------------------------------------

    fn scene() -> Rc<Scene> {
        let host = MockHost::new();
        let scene = Scene::new("test", host.create_scene_renderer("test"), Rc::new(GamepadManager::new()));
        scene.attach_control();
        scene
    }

    fn connect(scene: &Scene, id: u32, kind: GamepadKind, button_count: usize) {
        scene.gamepads().handle(&DeviceEvent::GamepadConnected(GamepadDescriptor {
            id: GamepadId(id),
            kind,
            button_count,
        }));
    }

    fn gamepad(scene: &Rc<Scene>) -> GamepadAdapter {
        GamepadAdapter::enable(scene, Rc::new(ControlsMap::default()), GamepadKind::Xbox, 0.1)
    }

    //--- Keyboard ---------------------------------------------------------

    #[test]
    fn keyboard_press_and_release() {
        let scene = scene();
        let mut adapter = KeyboardAdapter::enable(&scene, Rc::new(ControlsMap::default()));
        let mut map = InputMap::new();

        scene.dispatch(&DeviceEvent::Keyboard(KeyboardInfo::down(KeyCode::Enter)));
        adapter.check_inputs(&mut map);
        assert!(map.is_pressed(&InputKey::Key(KeyCode::Enter)));

        scene.dispatch(&DeviceEvent::Keyboard(KeyboardInfo::up(KeyCode::Enter)));
        adapter.check_inputs(&mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn keyboard_ignores_unmapped_keys() {
        let scene = scene();
        let mut adapter = KeyboardAdapter::enable(&scene, Rc::new(ControlsMap::default()));
        let mut map = InputMap::new();

        scene.dispatch(&DeviceEvent::Keyboard(KeyboardInfo::down(KeyCode::KeyZ)));
        adapter.check_inputs(&mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn disposed_keyboard_stops_listening() {
        let scene = scene();
        let mut adapter = KeyboardAdapter::enable(&scene, Rc::new(ControlsMap::default()));
        let mut map = InputMap::new();

        adapter.dispose();
        assert!(!scene.on_keyboard.has_observers());

        scene.dispatch(&DeviceEvent::Keyboard(KeyboardInfo::down(KeyCode::Enter)));
        adapter.check_inputs(&mut map);
        assert!(map.is_empty());
    }

    //--- Pointer ----------------------------------------------------------

    #[test]
    fn pointer_down_is_a_tap() {
        let scene = scene();
        let mut adapter = PointerAdapter::enable(&scene);
        let mut map = InputMap::new();

        scene.dispatch(&DeviceEvent::Pointer(PointerInfo::moved(3.0, 4.0)));
        scene.dispatch(&DeviceEvent::Pointer(PointerInfo::down(MouseButton::Left, 3.0, 4.0)));
        adapter.check_inputs(&mut map);
        assert!(map.is_pressed(&InputKey::PointerTap));
        assert_eq!(map.len(), 1);

        scene.dispatch(&DeviceEvent::Pointer(PointerInfo::up(MouseButton::Left, 3.0, 4.0)));
        adapter.check_inputs(&mut map);
        assert!(map.is_empty());
    }

    //--- Gamepad Selection ------------------------------------------------

    #[test]
    fn zero_button_gamepad_is_ignored_until_a_valid_one_connects() {
        let scene = scene();
        let mut adapter = gamepad(&scene);
        let mut map = InputMap::new();

        connect(&scene, 0, GamepadKind::Generic, 0);
        adapter.check_inputs(&mut map);
        assert_eq!(adapter.selected(), None);

        connect(&scene, 1, GamepadKind::Generic, 16);
        adapter.check_inputs(&mut map);
        assert_eq!(adapter.selected(), Some(GamepadId(1)));
    }

    #[test]
    fn preferred_kind_replaces_selection() {
        let scene = scene();
        let mut adapter = gamepad(&scene);
        let mut map = InputMap::new();

        connect(&scene, 1, GamepadKind::DualShock, 16);
        connect(&scene, 2, GamepadKind::Generic, 12);
        adapter.check_inputs(&mut map);
        assert_eq!(adapter.selected(), Some(GamepadId(1)));

        connect(&scene, 3, GamepadKind::Xbox, 16);
        adapter.check_inputs(&mut map);
        assert_eq!(adapter.selected(), Some(GamepadId(3)));
    }

    #[test]
    fn replaced_gamepad_releases_its_held_inputs() {
        let scene = scene();
        let mut adapter = gamepad(&scene);
        let mut map = InputMap::new();

        connect(&scene, 1, GamepadKind::Generic, 16);
        adapter.check_inputs(&mut map);
        scene.gamepads().handle(&DeviceEvent::GamepadButton {
            gamepad: GamepadId(1),
            button: GamepadButton::South,
            phase: ButtonPhase::Pressed,
        });
        adapter.check_inputs(&mut map);
        assert!(map.is_pressed(&InputKey::Mapped(InputAction::Activate)));

        connect(&scene, 2, GamepadKind::Xbox, 16);
        scene.gamepads().handle(&DeviceEvent::GamepadButton {
            gamepad: GamepadId(1),
            button: GamepadButton::South,
            phase: ButtonPhase::Released,
        });
        for _ in 0..5 {
            adapter.check_inputs(&mut map);
        }

        assert_eq!(adapter.selected(), Some(GamepadId(2)));
        assert!(!map.is_pressed(&InputKey::Mapped(InputAction::Activate)));
    }

    #[test]
    fn pose_enabled_is_never_selected() {
        let scene = scene();
        let mut adapter = gamepad(&scene);
        let mut map = InputMap::new();

        connect(&scene, 1, GamepadKind::PoseEnabled, 4);
        adapter.check_inputs(&mut map);
        assert_eq!(adapter.selected(), None);
    }

    #[test]
    fn already_connected_gamepad_is_selected_on_enable() {
        let scene = scene();
        connect(&scene, 1, GamepadKind::Generic, 0);
        connect(&scene, 2, GamepadKind::Generic, 12);
        connect(&scene, 3, GamepadKind::Xbox, 16);

        assert_eq!(gamepad(&scene).selected(), Some(GamepadId(3)));
    }

    #[test]
    fn disconnect_clears_selection_and_its_inputs() {
        let scene = scene();
        connect(&scene, 1, GamepadKind::Xbox, 16);
        let mut adapter = gamepad(&scene);
        let mut map = InputMap::new();

        scene.gamepads().handle(&DeviceEvent::GamepadButton {
            gamepad: GamepadId(1),
            button: GamepadButton::South,
            phase: ButtonPhase::Pressed,
        });
        adapter.check_inputs(&mut map);
        assert!(map.is_pressed(&InputKey::Mapped(InputAction::Activate)));

        scene.gamepads().handle(&DeviceEvent::GamepadDisconnected(GamepadId(1)));
        adapter.check_inputs(&mut map);
        assert_eq!(adapter.selected(), None);
        assert!(map.is_empty());
    }

    //--- Gamepad Mapping --------------------------------------------------

    #[test]
    fn buttons_of_other_gamepads_are_ignored() {
        let scene = scene();
        connect(&scene, 1, GamepadKind::Xbox, 16);
        connect(&scene, 2, GamepadKind::Generic, 16);
        let mut adapter = gamepad(&scene);
        let mut map = InputMap::new();

        scene.gamepads().handle(&DeviceEvent::GamepadButton {
            gamepad: GamepadId(2),
            button: GamepadButton::South,
            phase: ButtonPhase::Pressed,
        });
        adapter.check_inputs(&mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn sticks_map_to_actions_outside_dead_zone() {
        let scene = scene();
        connect(&scene, 1, GamepadKind::Xbox, 16);
        let mut adapter = gamepad(&scene);
        let mut map = InputMap::new();

        scene.gamepads().handle(&DeviceEvent::GamepadSticks {
            gamepad: GamepadId(1),
            left: StickValues::new(0.0, -1.0),
            right: StickValues::new(0.05, 0.0),
        });
        adapter.check_inputs(&mut map);
        assert!(map.is_pressed(&InputKey::Mapped(InputAction::MoveUp)));
        assert!(!map.is_pressed(&InputKey::Mapped(InputAction::MoveDown)));
        assert!(!map.is_pressed(&InputKey::Mapped(InputAction::RotateRight)));

        scene.gamepads().handle(&DeviceEvent::GamepadSticks {
            gamepad: GamepadId(1),
            left: StickValues::ZERO,
            right: StickValues::ZERO,
        });
        adapter.check_inputs(&mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn centred_stick_leaves_digital_entries_alone() {
        let scene = scene();
        connect(&scene, 1, GamepadKind::Xbox, 16);
        let mut adapter = gamepad(&scene);
        let mut map = InputMap::new();

        scene.gamepads().handle(&DeviceEvent::GamepadButton {
            gamepad: GamepadId(1),
            button: GamepadButton::DPadUp,
            phase: ButtonPhase::Pressed,
        });
        adapter.check_inputs(&mut map);
        adapter.check_inputs(&mut map);

        assert!(map.is_pressed(&InputKey::Mapped(InputAction::MoveUp)));
    }

    #[test]
    fn dispose_unsubscribes_from_manager() {
        let scene = scene();
        connect(&scene, 1, GamepadKind::Xbox, 16);
        let mut adapter = gamepad(&scene);

        adapter.dispose();

        assert!(!scene.gamepads().on_connected.has_observers());
        assert!(!scene.gamepads().on_disconnected.has_observers());
        let pad = scene.gamepads().get(GamepadId(1)).unwrap();
        assert!(!pad.on_button_down.has_observers());
        assert_eq!(adapter.selected(), None);
    }
}
