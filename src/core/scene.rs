//=========================================================================
// Scene Handle
//=========================================================================
//
// Shared handle to one host scene: its renderer, its before-render
// timeline and the device observables input adapters subscribe to.
//
// Architecture:
//   Scene (Rc)
//     ├─ renderer: Box<dyn SceneRenderer>
//     ├─ timeline: Timeline        (advanced before every render)
//     ├─ on_keyboard / on_pointer  (fed while input is attached)
//     └─ gamepads: Rc<GamepadManager> (shared by every scene)
//
// Flow:
//   dispatch(DeviceEvent) → observables → device adapters
//   render(delta) → timeline.advance(delta) → renderer.render()
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::{
    host::SceneRenderer,
    input::{
        event::{DeviceEvent, KeyboardInfo, PointerInfo},
        gamepad::GamepadManager,
    },
    observable::Observable,
    timeline::Timeline,
};

//=== SceneId =============================================================

/// Process-unique scene identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

//=== Scene ===============================================================

pub struct Scene {
    id: SceneId,
    name: String,
    renderer: RefCell<Box<dyn SceneRenderer>>,
    timeline: Timeline,
    gamepads: Rc<GamepadManager>,
    input_attached: Cell<bool>,
    disposed: Cell<bool>,

    pub on_keyboard: Observable<KeyboardInfo>,
    pub on_pointer: Observable<PointerInfo>,
    pub on_dispose: Observable<SceneId>,
}

impl Scene {
    /// Wraps a host renderer into a shared scene handle.
    pub fn new(name: &str, renderer: Box<dyn SceneRenderer>, gamepads: Rc<GamepadManager>) -> Rc<Self> {
        let id = SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed));
        debug!("Scene '{}' created ({:?})", name, id);

        Rc::new(Self {
            id,
            name: name.to_owned(),
            renderer: RefCell::new(renderer),
            timeline: Timeline::new(),
            gamepads,
            input_attached: Cell::new(false),
            disposed: Cell::new(false),
            on_keyboard: Observable::new(),
            on_pointer: Observable::new(),
            on_dispose: Observable::new(),
        })
    }

    //--- Accessors --------------------------------------------------------

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timeline advanced once per rendered frame.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn gamepads(&self) -> &Rc<GamepadManager> {
        &self.gamepads
    }

    //--- Input Attachment -------------------------------------------------

    /// Starts delivering keyboard and pointer events to the observables.
    pub fn attach_control(&self) {
        self.input_attached.set(true);
    }

    pub fn detach_control(&self) {
        self.input_attached.set(false);
    }

    pub fn is_input_attached(&self) -> bool {
        self.input_attached.get()
    }

    /// Delivers a keyboard or pointer event. Returns `true` if delivered.
    pub fn dispatch(&self, event: &DeviceEvent) -> bool {
        if !self.input_attached.get() || self.disposed.get() {
            return false;
        }
        match event {
            DeviceEvent::Keyboard(info) => self.on_keyboard.notify(info),
            DeviceEvent::Pointer(info) => self.on_pointer.notify(info),
            _ => return false,
        }
        true
    }

    //--- Rendering --------------------------------------------------------

    /// Runs the before-render timeline, then draws the scene.
    pub fn render(&self, delta: Duration) {
        if self.disposed.get() {
            return;
        }
        trace!("Rendering scene '{}'", self.name);
        self.timeline.advance(delta);
        self.renderer.borrow_mut().render();
    }

    //--- Disposal ---------------------------------------------------------

    /// Announces disposal and drops every subscriber. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        debug!("Scene '{}' disposed", self.name);
        self.input_attached.set(false);
        self.on_dispose.notify(&self.id);
        self.on_keyboard.clear();
        self.on_pointer.clear();
        self.on_dispose.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("input_attached", &self.input_attached.get())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
