//=========================================================================
// Host Services
//=========================================================================
//
// Collaborator traits for everything the client delegates to its render
// host: window presentation, scene rendering, GUI widgets, animation
// groups, audio playback and the frame loop itself.
//
// Architecture:
//   Application<H: HostEngine>
//       ├── create_scene_renderer()  → Box<dyn SceneRenderer>
//       ├── create_gui()             → Box<dyn GuiLayer>
//       ├── create_animation_group() → Box<dyn AnimationGroup>
//       └── load_sound()             → Box<dyn Sound>
//
//   RenderLoop::run(|Frame| -> LoopControl)
//
// The core never reimplements any of these; the desktop implementation
// lives in `platform`, mocks for unit tests live in `testing`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::input::event::DeviceEvent;

//=== HostEngine ==========================================================

/// Render engine services used by the application controller and screens.
pub trait HostEngine {
    //--- Presentation -----------------------------------------------------

    fn enter_fullscreen(&self);
    fn exit_fullscreen(&self);

    /// Shows the loading indicator until [`hide_loading_ui`](Self::hide_loading_ui).
    fn display_loading_ui(&self);
    fn hide_loading_ui(&self);

    //--- Lifecycle --------------------------------------------------------

    /// Releases every engine resource. The engine is unusable afterwards.
    fn dispose(&self);

    /// Asks the host to restart the whole application from scratch.
    fn request_reload(&self);

    //--- Factories --------------------------------------------------------

    fn create_scene_renderer(&self, name: &str) -> Box<dyn SceneRenderer>;

    /// Builds a full-screen GUI layer with one entry per item.
    fn create_gui(&self, name: &str, items: &[&str]) -> Box<dyn GuiLayer>;

    fn create_animation_group(&self, name: &str, tracks: Vec<AnimationTrack>) -> Box<dyn AnimationGroup>;

    /// Starts loading a sound; [`Sound::is_loaded`] reports completion.
    fn load_sound(&self, name: &str, url: &str, options: SoundOptions) -> Box<dyn Sound>;
}

//=== Scene Services ======================================================

/// Draws one scene's content.
pub trait SceneRenderer {
    fn render(&mut self);
}

/// Host GUI layer (menu container, buttons, text, selection icon).
pub trait GuiLayer {
    /// Sets the opacity of the whole layer, in `[0, 1]`.
    fn set_alpha(&mut self, alpha: f32);

    fn set_visible(&mut self, visible: bool);

    /// Moves the selection icon next to `index`, offset vertically in pixels.
    fn highlight(&mut self, index: Option<usize>, offset: f32);

    /// Takes the next pending click, if any.
    fn poll_click(&mut self) -> Option<usize>;
}

//=== Animation ===========================================================

/// Value of a single keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyValue {
    Float(f32),
    Vector([f32; 3]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: u32,
    pub value: KeyValue,
}

impl Keyframe {
    pub fn float(frame: u32, value: f32) -> Self {
        Self { frame, value: KeyValue::Float(value) }
    }

    pub fn vector(frame: u32, value: [f32; 3]) -> Self {
        Self { frame, value: KeyValue::Vector(value) }
    }
}

/// Keyframes animating one property of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrack {
    pub target: String,
    pub property: String,
    pub frame_rate: u32,
    pub keys: Vec<Keyframe>,
}

impl AnimationTrack {
    pub fn new(target: &str, property: &str, frame_rate: u32, keys: Vec<Keyframe>) -> Self {
        Self {
            target: target.to_owned(),
            property: property.to_owned(),
            frame_rate,
            keys,
        }
    }

    /// Highest keyframe index of the track.
    pub fn last_frame(&self) -> u32 {
        self.keys.iter().map(|k| k.frame).max().unwrap_or(0)
    }

    /// Playback length at the track's frame rate.
    pub fn duration(&self) -> Duration {
        if self.frame_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(f64::from(self.last_frame()) / f64::from(self.frame_rate))
    }
}

/// A group of tracks played together.
pub trait AnimationGroup {
    fn start(&mut self, looping: bool);
    fn stop(&mut self);

    /// Returns `true` once, on the first poll after playback ended.
    fn poll_finished(&mut self) -> bool;
}

//=== Audio ===============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundOptions {
    pub looping: bool,
    pub autoplay: bool,
    pub volume: f32,
}

impl Default for SoundOptions {
    fn default() -> Self {
        Self {
            looping: false,
            autoplay: false,
            volume: 1.0,
        }
    }
}

pub trait Sound {
    fn play(&mut self);
    fn stop(&mut self);

    /// Ramps the volume to `volume` over `fade`.
    fn set_volume(&mut self, volume: f32, fade: Duration);

    fn is_loaded(&self) -> bool;
}

//=== Frame Loop ==========================================================

/// Input and timing for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Time since the previous frame.
    pub delta: Duration,

    /// Device events buffered since the previous frame, in arrival order.
    pub events: Vec<DeviceEvent>,
}

/// Returned by the per-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Drives the per-frame callback once per display refresh.
pub trait RenderLoop {
    type Error;

    fn run<F>(self, frame: F) -> Result<(), Self::Error>
    where
        F: FnMut(Frame) -> LoopControl;
}

//=========================================================================
// Test Doubles
//=========================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    //--- Shared Mock State ------------------------------------------------

    pub struct MockAnimationState {
        pub name: String,
        pub tracks: Vec<AnimationTrack>,
        pub starts: Cell<u32>,
        pub stopped: Cell<bool>,
        pub finished: Cell<bool>,
    }

    impl MockAnimationState {
        /// Simulates the host reporting the end of playback.
        pub fn finish(&self) {
            self.finished.set(true);
        }
    }

    pub struct MockSoundState {
        pub name: String,
        pub loaded: Cell<bool>,
        pub playing: Cell<bool>,
        pub volume: Cell<f32>,
        pub fades: RefCell<Vec<(f32, Duration)>>,
    }

    pub struct MockGuiState {
        pub name: String,
        pub items: Vec<String>,
        pub alpha: Cell<f32>,
        pub visible: Cell<bool>,
        pub highlighted: Cell<Option<usize>>,
        pub offset: Cell<f32>,
        pub clicks: RefCell<VecDeque<usize>>,
    }

    #[derive(Default)]
    pub struct HostRecord {
        pub calls: Vec<&'static str>,
        pub renders: HashMap<String, Rc<Cell<usize>>>,
        pub animations: Vec<Rc<MockAnimationState>>,
        pub sounds: Vec<Rc<MockSoundState>>,
        pub guis: Vec<Rc<MockGuiState>>,
    }

    //--- MockHost ---------------------------------------------------------

    #[derive(Clone, Default)]
    pub struct MockHost {
        pub record: Rc<RefCell<HostRecord>>,
    }

    impl MockHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.record.borrow().calls.clone()
        }

        pub fn render_count(&self, scene: &str) -> usize {
            self.record.borrow().renders.get(scene).map_or(0, |c| c.get())
        }

        pub fn animation(&self, name: &str) -> Rc<MockAnimationState> {
            let record = self.record.borrow();
            let found = record.animations.iter().find(|a| a.name == name);
            Rc::clone(found.unwrap_or_else(|| panic!("no animation group named {name}")))
        }

        pub fn sound(&self, name: &str) -> Rc<MockSoundState> {
            let record = self.record.borrow();
            let found = record.sounds.iter().find(|s| s.name == name);
            Rc::clone(found.unwrap_or_else(|| panic!("no sound named {name}")))
        }

        pub fn gui(&self, name: &str) -> Rc<MockGuiState> {
            let record = self.record.borrow();
            let found = record.guis.iter().find(|g| g.name == name);
            Rc::clone(found.unwrap_or_else(|| panic!("no gui named {name}")))
        }

        fn log(&self, call: &'static str) {
            self.record.borrow_mut().calls.push(call);
        }
    }

    impl HostEngine for MockHost {
        fn enter_fullscreen(&self) {
            self.log("enter_fullscreen");
        }

        fn exit_fullscreen(&self) {
            self.log("exit_fullscreen");
        }

        fn display_loading_ui(&self) {
            self.log("display_loading_ui");
        }

        fn hide_loading_ui(&self) {
            self.log("hide_loading_ui");
        }

        fn dispose(&self) {
            self.log("dispose");
        }

        fn request_reload(&self) {
            self.log("request_reload");
        }

        fn create_scene_renderer(&self, name: &str) -> Box<dyn SceneRenderer> {
            let count = Rc::new(Cell::new(0));
            self.record
                .borrow_mut()
                .renders
                .insert(name.to_owned(), Rc::clone(&count));
            Box::new(MockRenderer { count })
        }

        fn create_gui(&self, name: &str, items: &[&str]) -> Box<dyn GuiLayer> {
            let state = Rc::new(MockGuiState {
                name: name.to_owned(),
                items: items.iter().map(|s| s.to_string()).collect(),
                alpha: Cell::new(1.0),
                visible: Cell::new(true),
                highlighted: Cell::new(None),
                offset: Cell::new(0.0),
                clicks: RefCell::new(VecDeque::new()),
            });
            self.record.borrow_mut().guis.push(Rc::clone(&state));
            Box::new(MockGui { state })
        }

        fn create_animation_group(&self, name: &str, tracks: Vec<AnimationTrack>) -> Box<dyn AnimationGroup> {
            let state = Rc::new(MockAnimationState {
                name: name.to_owned(),
                tracks,
                starts: Cell::new(0),
                stopped: Cell::new(false),
                finished: Cell::new(false),
            });
            self.record.borrow_mut().animations.push(Rc::clone(&state));
            Box::new(MockAnimation { state })
        }

        fn load_sound(&self, name: &str, _url: &str, options: SoundOptions) -> Box<dyn Sound> {
            let state = Rc::new(MockSoundState {
                name: name.to_owned(),
                loaded: Cell::new(false),
                playing: Cell::new(options.autoplay),
                volume: Cell::new(options.volume),
                fades: RefCell::new(Vec::new()),
            });
            self.record.borrow_mut().sounds.push(Rc::clone(&state));
            Box::new(MockSound { state })
        }
    }

    //--- Mock Services ----------------------------------------------------

    struct MockRenderer {
        count: Rc<Cell<usize>>,
    }

    impl SceneRenderer for MockRenderer {
        fn render(&mut self) {
            self.count.set(self.count.get() + 1);
        }
    }

    struct MockGui {
        state: Rc<MockGuiState>,
    }

    impl GuiLayer for MockGui {
        fn set_alpha(&mut self, alpha: f32) {
            self.state.alpha.set(alpha);
        }

        fn set_visible(&mut self, visible: bool) {
            self.state.visible.set(visible);
        }

        fn highlight(&mut self, index: Option<usize>, offset: f32) {
            self.state.highlighted.set(index);
            self.state.offset.set(offset);
        }

        fn poll_click(&mut self) -> Option<usize> {
            self.state.clicks.borrow_mut().pop_front()
        }
    }

    struct MockAnimation {
        state: Rc<MockAnimationState>,
    }

    impl AnimationGroup for MockAnimation {
        fn start(&mut self, _looping: bool) {
            self.state.starts.set(self.state.starts.get() + 1);
        }

        fn stop(&mut self) {
            self.state.stopped.set(true);
        }

        fn poll_finished(&mut self) -> bool {
            self.state.finished.replace(false)
        }
    }

    struct MockSound {
        state: Rc<MockSoundState>,
    }

    impl Sound for MockSound {
        fn play(&mut self) {
            self.state.playing.set(true);
        }

        fn stop(&mut self) {
            self.state.playing.set(false);
        }

        fn set_volume(&mut self, volume: f32, fade: Duration) {
            self.state.volume.set(volume);
            self.state.fades.borrow_mut().push((volume, fade));
        }

        fn is_loaded(&self) -> bool {
            self.state.loaded.get()
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
