//=========================================================================
// Input Manager
//
// Owns the device adapters of every registered scene and the shared
// pressed-input map, and turns pressed inputs into semantic actions.
//
// Responsibilities:
// - Register / unregister keyboard, pointer and gamepad adapters per scene
// - Poll a scene's adapters once per tick (`get_inputs`)
// - Project pressed inputs into ordered `InputCommand`s via the controls map
// - Publish non-empty batches to `on_input_available` subscribers
// - Drop a scene's registration once the scene is disposed
//
// The manager is shared by every screen's Input Processor through a
// `SharedInputManager` handle.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

//=== External Crates =====================================================
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, trace, warn};

//=== Internal Modules ====================================================
use crate::core::input::{
    action::InputAction,
    controls::ControlsMap,
    devices::{DeviceAdapter, GamepadAdapter, KeyboardAdapter, PointerAdapter},
    event::{InputKey, RawInputEvent},
    gamepad::GamepadKind,
    input_map::InputMap,
};
use crate::core::{
    observable::{Observable, ObserverToken},
    scene::{Scene, SceneId},
};

//=== Public Types ========================================================

/// Input manager handle shared by the controller and every processor.
pub type SharedInputManager = Rc<RefCell<InputManager>>;

/// One pressed input resolved to its action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputCommand {
    pub action: InputAction,
    pub last_event: RawInputEvent,
}

/// Commands produced by one poll, in press order.
pub type InputBatch = Vec<InputCommand>;

//=== InputRegistration ===================================================
//
// Active device subscriptions of one scene, plus the inputs its adapters
// put into the shared map and that are still held.
//
struct InputRegistration {
    scene: SceneId,
    scene_handle: Rc<Scene>,
    adapters: Vec<Box<dyn DeviceAdapter>>,
    held: Vec<InputKey>,
    dispose_token: Option<ObserverToken>,
}

impl InputRegistration {
    fn dispose(&mut self, map: &mut InputMap) {
        for adapter in &mut self.adapters {
            adapter.dispose();
        }
        self.adapters.clear();
        for key in self.held.drain(..) {
            map.release(&key);
        }
        if let Some(token) = self.dispose_token.take() {
            self.scene_handle.on_dispose.remove(token);
        }
        self.scene_handle.detach_control();
    }
}

//=== InputManager ========================================================

pub struct InputManager {
    input_map: InputMap,
    registrations: Vec<InputRegistration>,
    controls: Rc<ControlsMap>,
    preferred_gamepad: GamepadKind,
    dead_zone: f32,
    on_input_available: Observable<InputBatch>,

    disposed_tx: Sender<SceneId>,
    disposed_rx: Receiver<SceneId>,
}

impl InputManager {
    //--- Constructor ------------------------------------------------------
    pub fn new(controls: ControlsMap, preferred_gamepad: GamepadKind, dead_zone: f32) -> Self {
        let (disposed_tx, disposed_rx) = unbounded();
        Self {
            input_map: InputMap::new(),
            registrations: Vec::new(),
            controls: Rc::new(controls),
            preferred_gamepad,
            dead_zone,
            on_input_available: Observable::new(),
            disposed_tx,
            disposed_rx,
        }
    }

    /// Wraps the manager into a shared handle.
    pub fn shared(self) -> SharedInputManager {
        Rc::new(RefCell::new(self))
    }

    //--- register_input_for_scene() ---------------------------------------
    //
    // Enables every device adapter for `scene` and attaches scene input.
    // A scene that is already registered is re-registered from scratch.
    // Disposing the scene later drops the registration at the next poll.
    //
    pub fn register_input_for_scene(&mut self, scene: &Rc<Scene>) {
        self.drain_disposed();
        if self.has_registration(scene.id()) {
            warn!("Scene '{}' already has an input registration, replacing it", scene.name());
            self.remove_registration(scene.id());
        }

        let adapters: Vec<Box<dyn DeviceAdapter>> = vec![
            Box::new(KeyboardAdapter::enable(scene, Rc::clone(&self.controls))),
            Box::new(PointerAdapter::enable(scene)),
            Box::new(GamepadAdapter::enable(
                scene,
                Rc::clone(&self.controls),
                self.preferred_gamepad,
                self.dead_zone,
            )),
        ];

        let disposed_tx = self.disposed_tx.clone();
        let dispose_token = scene.on_dispose.add(move |id| {
            let _ = disposed_tx.send(*id);
        });

        scene.attach_control();
        self.registrations.push(InputRegistration {
            scene: scene.id(),
            scene_handle: Rc::clone(scene),
            adapters,
            held: Vec::new(),
            dispose_token: Some(dispose_token),
        });
        debug!("Input registered for scene '{}'", scene.name());
    }

    //--- unregister_input_for_scene() -------------------------------------
    //
    // Disposes the scene's adapters, releases the inputs they were holding
    // and detaches scene input. Inputs held through other registrations are
    // kept. Unknown scenes are reported and otherwise ignored.
    //
    pub fn unregister_input_for_scene(&mut self, scene: &Scene) {
        self.drain_disposed();
        if !self.remove_registration(scene.id()) {
            warn!("Unable to find an input registration for scene '{}'", scene.name());
            return;
        }
        debug!("Input unregistered for scene '{}'", scene.name());
    }

    fn remove_registration(&mut self, scene: SceneId) -> bool {
        let Some(index) = self.registrations.iter().position(|r| r.scene == scene) else {
            return false;
        };
        let mut registration = self.registrations.remove(index);
        registration.dispose(&mut self.input_map);
        true
    }

    /// Drops registrations whose scene announced disposal.
    fn drain_disposed(&mut self) {
        let disposed: Vec<SceneId> = self.disposed_rx.try_iter().collect();
        for scene in disposed {
            if self.remove_registration(scene) {
                debug!("Input registration dropped for disposed scene {:?}", scene);
            }
        }
    }

    //--- get_inputs() -----------------------------------------------------
    //
    // Polls the scene's adapters, projects the input map into commands and
    // publishes them when there is at least one.
    //
    pub fn get_inputs(&mut self, scene: SceneId) -> InputBatch {
        self.drain_disposed();
        let Some(registration) = self.registrations.iter_mut().find(|r| r.scene == scene) else {
            return InputBatch::new();
        };

        let map = &mut self.input_map;
        let before: Vec<InputKey> = map.iter().map(|(key, _)| *key).collect();
        for adapter in &mut registration.adapters {
            adapter.check_inputs(map);
        }
        registration.held.retain(|key| map.is_pressed(key));
        registration
            .held
            .extend(map.iter().map(|(key, _)| *key).filter(|key| !before.contains(key)));

        let batch: InputBatch = self
            .input_map
            .iter()
            .filter_map(|(key, event)| {
                self.controls.action_for(key).map(|action| InputCommand {
                    action,
                    last_event: *event,
                })
            })
            .collect();

        if !batch.is_empty() {
            trace!("Inputs available: {:?}", batch.iter().map(|c| c.action).collect::<Vec<_>>());
            self.on_input_available.notify(&batch);
        }
        batch
    }

    //--- Queries ----------------------------------------------------------

    /// Fired by `get_inputs` with every non-empty batch.
    pub fn on_input_available(&self) -> &Observable<InputBatch> {
        &self.on_input_available
    }

    pub fn has_registration(&self, scene: SceneId) -> bool {
        self.registrations.iter().any(|r| r.scene == scene)
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn input_map(&self) -> &InputMap {
        &self.input_map
    }

    pub fn controls(&self) -> &ControlsMap {
        &self.controls
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(ControlsMap::default(), GamepadKind::Xbox, 0.1)
    }
}

impl fmt::Debug for InputManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputManager")
            .field("registrations", &self.registrations.len())
            .field("pressed", &self.input_map.len())
            .field("subscribers", &self.on_input_available.observer_count())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
