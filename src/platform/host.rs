//=========================================================================
// Desktop Host
//=========================================================================
//
// `HostEngine` implementation for the winit window.
//
// Architecture:
//   WinitHost ──writes──> SurfaceState (Rc, cells) <──reads── FrameDriver
//
// The host never touches the window directly. Requests such as fullscreen
// or the loading indicator are recorded in `SurfaceState` and applied to
// the window by the frame driver after each frame callback.
//
// Services:
// - HeadlessRenderer: counts frames, no GPU work
// - TimedAnimationGroup: wall-clock playback of keyframe tracks
// - SilentSound: tracks volume and load progress, plays nothing
// - LogGui: mirrors widget state into the log
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, info, trace};

//=== Internal Dependencies ===============================================

use crate::core::host::{
    AnimationGroup, AnimationTrack, GuiLayer, HostEngine, SceneRenderer, Sound, SoundOptions,
};

//=== Constants ===========================================================

pub(crate) const WINDOW_TITLE: &str = "Space Truckers";
pub(crate) const LOADING_TEXT: &str = "Loading Space Truckers: The Video Game...";

/// Simulated load time of a silent sound.
const SOUND_LOAD_TIME: Duration = Duration::from_millis(500);

//=== SurfaceState ========================================================

/// Window requests shared between the host and the frame driver.
#[derive(Debug)]
pub(crate) struct SurfaceState {
    fullscreen: Cell<bool>,
    loading: Cell<bool>,
    loading_progress: Cell<f32>,
    disposed: Cell<bool>,
    reload_requested: Cell<bool>,
    size: Cell<(u32, u32)>,
}

impl SurfaceState {
    pub(crate) fn new() -> Self {
        Self {
            fullscreen: Cell::new(false),
            loading: Cell::new(false),
            loading_progress: Cell::new(0.0),
            disposed: Cell::new(false),
            reload_requested: Cell::new(false),
            size: Cell::new((0, 0)),
        }
    }

    /// Clears per-application flags before a new application starts.
    pub(crate) fn reset(&self) {
        self.loading.set(false);
        self.loading_progress.set(0.0);
        self.disposed.set(false);
        self.reload_requested.set(false);
    }

    /// Window title for the current state.
    pub(crate) fn title(&self) -> String {
        if self.loading.get() {
            format!("{} {:.2}%", LOADING_TEXT, self.loading_progress.get())
        } else {
            WINDOW_TITLE.to_owned()
        }
    }

    pub(crate) fn report_progress(&self, percent: f32) {
        let percent = percent.clamp(0.0, 100.0);
        if percent > self.loading_progress.get() {
            self.loading_progress.set(percent);
        }
    }

    pub(crate) fn resize(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    pub(crate) fn wants_fullscreen(&self) -> bool {
        self.fullscreen.get()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub(crate) fn reload_requested(&self) -> bool {
        self.reload_requested.get()
    }
}

//=== WinitHost ===========================================================

/// Handle given to the application. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WinitHost {
    surface: Rc<SurfaceState>,
}

impl WinitHost {
    pub(crate) fn new(surface: Rc<SurfaceState>) -> Self {
        Self { surface }
    }
}

impl HostEngine for WinitHost {
    fn enter_fullscreen(&self) {
        debug!(target: "platform::host", "Fullscreen requested");
        self.surface.fullscreen.set(true);
    }

    fn exit_fullscreen(&self) {
        debug!(target: "platform::host", "Leaving fullscreen");
        self.surface.fullscreen.set(false);
    }

    fn display_loading_ui(&self) {
        info!(target: "platform::host", "{}", LOADING_TEXT);
        self.surface.loading.set(true);
    }

    fn hide_loading_ui(&self) {
        self.surface.loading.set(false);
    }

    fn dispose(&self) {
        info!(target: "platform::host", "Disposing host engine");
        self.surface.disposed.set(true);
    }

    fn request_reload(&self) {
        self.surface.reload_requested.set(true);
    }

    fn create_scene_renderer(&self, name: &str) -> Box<dyn SceneRenderer> {
        Box::new(HeadlessRenderer {
            name: name.to_owned(),
            frames: 0,
        })
    }

    fn create_gui(&self, name: &str, items: &[&str]) -> Box<dyn GuiLayer> {
        debug!(target: "platform::host", "GUI '{}' created with {:?}", name, items);
        Box::new(LogGui {
            name: name.to_owned(),
            items: items.iter().map(|s| s.to_string()).collect(),
            visible: true,
            highlighted: None,
        })
    }

    fn create_animation_group(&self, name: &str, tracks: Vec<AnimationTrack>) -> Box<dyn AnimationGroup> {
        let duration = tracks
            .iter()
            .map(AnimationTrack::duration)
            .max()
            .unwrap_or_default();
        debug!(target: "platform::host", "Animation group '{}' ({:?})", name, duration);
        Box::new(TimedAnimationGroup {
            name: name.to_owned(),
            duration,
            started: None,
            looping: false,
        })
    }

    fn load_sound(&self, name: &str, url: &str, options: SoundOptions) -> Box<dyn Sound> {
        debug!(target: "platform::host", "Loading sound '{}' from {}", name, url);
        Box::new(SilentSound {
            name: name.to_owned(),
            surface: Rc::clone(&self.surface),
            requested: Instant::now(),
            loaded: Cell::new(false),
            playing: options.autoplay,
            volume: options.volume,
        })
    }
}

//=== Services ============================================================

struct HeadlessRenderer {
    name: String,
    frames: u64,
}

impl SceneRenderer for HeadlessRenderer {
    fn render(&mut self) {
        self.frames += 1;
        trace!(target: "platform::render", "Scene '{}' frame {}", self.name, self.frames);
    }
}

struct TimedAnimationGroup {
    name: String,
    duration: Duration,
    started: Option<Instant>,
    looping: bool,
}

impl AnimationGroup for TimedAnimationGroup {
    fn start(&mut self, looping: bool) {
        self.looping = looping;
        self.started = Some(Instant::now());
    }

    fn stop(&mut self) {
        self.started = None;
    }

    fn poll_finished(&mut self) -> bool {
        let Some(started) = self.started else {
            return false;
        };
        if started.elapsed() < self.duration {
            return false;
        }
        if self.looping {
            self.started = Some(Instant::now());
            return false;
        }
        trace!(target: "platform::host", "Animation group '{}' finished", self.name);
        self.started = None;
        true
    }
}

struct SilentSound {
    name: String,
    surface: Rc<SurfaceState>,
    requested: Instant,
    loaded: Cell<bool>,
    playing: bool,
    volume: f32,
}

impl Sound for SilentSound {
    fn play(&mut self) {
        debug!(target: "platform::host", "Sound '{}' playing at {:.3}", self.name, self.volume);
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn set_volume(&mut self, volume: f32, fade: Duration) {
        trace!(target: "platform::host", "Sound '{}' volume {} over {:?}", self.name, volume, fade);
        self.volume = volume;
    }

    fn is_loaded(&self) -> bool {
        if self.loaded.get() {
            return true;
        }
        let progress = self.requested.elapsed().as_secs_f32() / SOUND_LOAD_TIME.as_secs_f32();
        self.surface.report_progress(progress * 100.0);
        if progress >= 1.0 {
            self.loaded.set(true);
        }
        self.loaded.get()
    }
}

struct LogGui {
    name: String,
    items: Vec<String>,
    visible: bool,
    highlighted: Option<usize>,
}

impl GuiLayer for LogGui {
    fn set_alpha(&mut self, _alpha: f32) {}

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            debug!(target: "platform::gui", "'{}' visible: {}", self.name, visible);
            self.visible = visible;
        }
    }

    fn highlight(&mut self, index: Option<usize>, _offset: f32) {
        if self.highlighted != index {
            let label = index.and_then(|i| self.items.get(i)).map(String::as_str);
            info!(target: "platform::gui", "'{}' selection: {}", self.name, label.unwrap_or("none"));
            self.highlighted = index;
        }
    }

    fn poll_click(&mut self) -> Option<usize> {
        None
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
