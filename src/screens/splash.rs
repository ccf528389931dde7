//=========================================================================
// Splash Screen
//=========================================================================
//
// Opening cut-scene: four billboard segments played back to back over
// the title theme, skippable with ACTIVATE.
//
// Sequence:
//   poweredBy → babylon → community → callToAction → CTA text shown
//
// Each segment fades in, holds, then fades out (the last one scales
// instead of fading out). Segment ends are forwarded through a channel
// and chained on the next update.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::PI;
use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};
use log::info;

//=== Internal Dependencies ===============================================

use super::{cutscene::CutSceneSegment, Screen};
use crate::core::{
    host::{AnimationTrack, GuiLayer, HostEngine, Keyframe, Sound, SoundOptions},
    input::{
        ActionContext, ActionHandler, ActionListItem, ActionTarget, GamepadManager, InputAction,
        InputProcessor, RawInputEvent, SharedInputManager,
    },
    observable::Observable,
    scene::Scene,
};

//=== Constants ===========================================================

const ANIMATION_FPS: u32 = 30;

/// Seconds a billboard stays fully visible between entrance and exit.
const HOLD_SECONDS: f32 = 2.5;

const THEME_URL: &str = "assets/sounds/space-trucker-title-theme.m4a";
const THEME_VOLUME: f32 = 0.998;
const THEME_FADE: Duration = Duration::from_millis(400);

const CALL_TO_ACTION: &str = "Press any key or tap the screen to continue...";

const ACTIONS: [ActionListItem; 1] = [ActionListItem::bounced(InputAction::Activate)];

//=== SplashState =========================================================

/// Input-facing state of the splash screen.
#[derive(Debug, Default)]
pub struct SplashState {
    skip_requested: bool,
}

impl SplashState {
    fn activate(&mut self, context: ActionContext, _event: &RawInputEvent) -> bool {
        if !self.skip_requested && !context.prior_state {
            info!("Key press detected. Skipping cut scene.");
            self.skip_requested = true;
            return true;
        }
        false
    }
}

impl ActionTarget for SplashState {
    fn action_handler(action: InputAction) -> Option<ActionHandler<Self>> {
        match action {
            InputAction::Activate => Some(Self::activate),
            _ => None,
        }
    }
}

//=== SplashScreen ========================================================

pub struct SplashScreen {
    scene: Rc<Scene>,
    processor: InputProcessor<SplashState>,
    state: SplashState,

    segments: Vec<CutSceneSegment>,
    current: Option<usize>,
    segment_ended: Receiver<usize>,
    started: bool,

    music: Box<dyn Sound>,
    call_to_action: Box<dyn GuiLayer>,
    ready_notified: bool,

    /// Fired once when the title theme has loaded.
    pub on_ready: Observable<()>,
}

impl SplashScreen {
    pub fn new(
        host: &dyn HostEngine,
        gamepads: Rc<GamepadManager>,
        input_manager: SharedInputManager,
        debounce: Duration,
    ) -> Self {
        let scene = Scene::new("splash", host.create_scene_renderer("splash"), gamepads);

        let mut call_to_action = host.create_gui("splashGui", &[CALL_TO_ACTION]);
        call_to_action.set_visible(false);

        let segments = vec![
            CutSceneSegment::new(host, "poweredBy", powered_by_tracks()),
            CutSceneSegment::new(host, "babylon", fade_tracks(2.5, 0.0)),
            CutSceneSegment::new(host, "community", community_tracks()),
            CutSceneSegment::new(host, "callToAction", call_to_action_tracks()),
        ];

        let (tx, segment_ended) = unbounded();
        for (index, segment) in segments.iter().enumerate() {
            let tx = tx.clone();
            segment.on_end.add_once(move |_| {
                let _ = tx.send(index);
            });
        }

        let music = host.load_sound(
            "theme",
            THEME_URL,
            SoundOptions {
                looping: false,
                autoplay: false,
                volume: 0.01,
            },
        );

        let processor = InputProcessor::new(Rc::clone(&scene), input_manager, &ACTIONS, debounce);

        Self {
            scene,
            processor,
            state: SplashState::default(),
            segments,
            current: None,
            segment_ended,
            started: false,
            music,
            call_to_action,
            ready_notified: false,
            on_ready: Observable::new(),
        }
    }

    //--- Sequence ---------------------------------------------------------

    /// Starts the theme and the first segment.
    pub fn run(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.current = Some(0);
        self.music.play();
        self.music.set_volume(THEME_VOLUME, THEME_FADE);
        if let Some(first) = self.segments.first_mut() {
            first.start();
        }
    }

    /// Fires `on_ready` the first time the theme reports loaded.
    pub fn check_ready(&mut self) -> bool {
        if self.ready_notified || !self.music.is_loaded() {
            return false;
        }
        self.ready_notified = true;
        info!("Splash screen ready");
        self.on_ready.notify(&());
        true
    }

    fn advance_from(&mut self, ended: usize) {
        let next = ended + 1;
        match self.segments.get_mut(next) {
            Some(segment) => {
                self.current = Some(next);
                segment.start();
            }
            None => {
                info!("Cut scene finished, showing call to action");
                self.call_to_action.set_visible(true);
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn skip_requested(&self) -> bool {
        self.state.skip_requested
    }

    /// Name of the segment currently playing.
    pub fn current_segment(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.segments.get(i))
            .filter(|s| s.is_running())
            .map(CutSceneSegment::name)
    }
}

impl Screen for SplashScreen {
    fn scene(&self) -> &Rc<Scene> {
        &self.scene
    }

    fn update(&mut self, _delta: Option<Duration>) {
        self.processor.update(&mut self.state);

        if self.state.skip_requested {
            if let Some(index) = self.current.take() {
                self.segments[index].stop();
            }
            return;
        }

        if let Some(index) = self.current {
            self.segments[index].poll();
        }

        let ended: Vec<usize> = self.segment_ended.try_iter().collect();
        for index in ended {
            self.advance_from(index);
        }
    }

    fn attach_controls(&mut self) {
        self.processor.attach_control();
    }

    fn detach_controls(&mut self) {
        self.processor.detach_control();
    }
}

//=========================================================================
// Keyframes
//=========================================================================

fn frame(seconds: f32) -> u32 {
    (seconds * ANIMATION_FPS as f32).round() as u32
}

/// Entrance, exit and end frames for a segment entering over `enter` seconds.
fn timings(enter: f32, outro: f32) -> [u32; 4] {
    let exit = enter + HOLD_SECONDS;
    [0, frame(enter), frame(exit), frame(exit + outro)]
}

fn visibility(frames: [u32; 4], end_value: f32) -> AnimationTrack {
    let [start, entrance, exit, end] = frames;
    AnimationTrack::new(
        "billboard",
        "visibility",
        ANIMATION_FPS,
        vec![
            Keyframe::float(start, 0.0),
            Keyframe::float(entrance, 1.0),
            Keyframe::float(exit, 0.998),
            Keyframe::float(end, end_value),
        ],
    )
}

fn fade_tracks(enter: f32, end_value: f32) -> Vec<AnimationTrack> {
    vec![visibility(timings(enter, HOLD_SECONDS), end_value)]
}

fn powered_by_tracks() -> Vec<AnimationTrack> {
    let frames = timings(3.5, HOLD_SECONDS);
    let [start, entrance, exit, end] = frames;
    let flip = AnimationTrack::new(
        "billboard",
        "rotation.x",
        ANIMATION_FPS,
        vec![
            Keyframe::float(start, PI),
            Keyframe::float(entrance, 0.0),
            Keyframe::float(exit, PI),
            Keyframe::float(end, 2.0 * PI),
        ],
    );
    vec![visibility(frames, 0.0), flip]
}

fn community_tracks() -> Vec<AnimationTrack> {
    vec![visibility(timings(4.0, 3.0), 0.0)]
}

fn call_to_action_tracks() -> Vec<AnimationTrack> {
    let frames = timings(3.0, 3.0);
    let [start, entrance, exit, end] = frames;
    let scale = AnimationTrack::new(
        "billboard",
        "scaling",
        ANIMATION_FPS,
        vec![
            Keyframe::vector(start, [1.0, 1.0, 1.0]),
            Keyframe::vector(entrance, [1.25, 1.0, 1.25]),
            Keyframe::vector(exit, [1.5, 1.0, 1.5]),
            Keyframe::vector(end, [1.0, 1.0, 1.0]),
        ],
    );
    vec![visibility(frames, 1.0), scale]
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::testing::MockHost;
    use crate::core::input::{DeviceEvent, InputManager, KeyCode, KeyboardInfo, DEFAULT_DEBOUNCE};
    use std::cell::Cell;

    //--- Helpers ----------------------------------------------------------

    fn splash(host: &MockHost) -> SplashScreen {
        SplashScreen::new(
            host,
            Rc::new(GamepadManager::new()),
            InputManager::default().shared(),
            DEFAULT_DEBOUNCE,
        )
    }

    fn group(name: &str) -> String {
        format!("{name}-animGroupCS")
    }

    //--- Construction -----------------------------------------------------

    #[test]
    fn builds_four_segments_at_thirty_fps() {
        let host = MockHost::new();
        let _splash = splash(&host);

        let powered = host.animation(&group("poweredBy"));
        assert_eq!(powered.tracks.len(), 2);
        assert_eq!(powered.tracks[0].last_frame(), 255);
        assert_eq!(powered.tracks[1].property, "rotation.x");

        assert_eq!(host.animation(&group("babylon")).tracks[0].last_frame(), 225);
        assert_eq!(host.animation(&group("community")).tracks[0].last_frame(), 285);

        let cta = host.animation(&group("callToAction"));
        assert_eq!(cta.tracks[1].property, "scaling");
        assert_eq!(cta.tracks[0].keys[3].value, crate::core::host::KeyValue::Float(1.0));
    }

    #[test]
    fn call_to_action_starts_hidden() {
        let host = MockHost::new();
        let _splash = splash(&host);
        assert!(!host.gui("splashGui").visible.get());
    }

    //--- Sequence ---------------------------------------------------------

    #[test]
    fn run_plays_theme_and_first_segment() {
        let host = MockHost::new();
        let mut splash = splash(&host);

        splash.run();
        splash.run();

        let theme = host.sound("theme");
        assert!(theme.playing.get());
        assert_eq!(*theme.fades.borrow(), vec![(0.998, Duration::from_millis(400))]);
        assert_eq!(host.animation(&group("poweredBy")).starts.get(), 1);
        assert_eq!(splash.current_segment(), Some("poweredBy"));
    }

    #[test]
    fn segments_chain_and_reveal_call_to_action() {
        let host = MockHost::new();
        let mut splash = splash(&host);
        splash.run();

        for (name, next) in [
            ("poweredBy", Some("babylon")),
            ("babylon", Some("community")),
            ("community", Some("callToAction")),
        ] {
            host.animation(&group(name)).finish();
            splash.update(None);
            assert_eq!(splash.current_segment(), next);
        }

        assert!(!host.gui("splashGui").visible.get());
        host.animation(&group("callToAction")).finish();
        splash.update(None);
        assert!(host.gui("splashGui").visible.get());
    }

    #[test]
    fn on_ready_fires_once_theme_is_loaded() {
        let host = MockHost::new();
        let mut splash = splash(&host);
        let ready = Rc::new(Cell::new(0));

        let r = Rc::clone(&ready);
        splash.on_ready.add(move |_| r.set(r.get() + 1));

        assert!(!splash.check_ready());
        host.sound("theme").loaded.set(true);
        assert!(splash.check_ready());
        assert!(!splash.check_ready());

        assert_eq!(ready.get(), 1);
    }

    //--- Skipping ---------------------------------------------------------

    #[test]
    fn activate_requests_skip_and_stops_segment() {
        let host = MockHost::new();
        let mut splash = splash(&host);
        splash.run();
        splash.attach_controls();

        splash
            .scene()
            .dispatch(&DeviceEvent::Keyboard(KeyboardInfo::down(KeyCode::Enter)));
        splash.update(None);

        assert!(splash.skip_requested());
        assert!(host.animation(&group("poweredBy")).stopped.get());
        assert_eq!(splash.current_segment(), None);
    }

    #[test]
    fn activate_only_skips_on_first_press() {
        let mut state = SplashState::default();
        let event = RawInputEvent::Keyboard(KeyboardInfo::down(KeyCode::Enter));

        assert!(!state.activate(ActionContext { prior_state: true }, &event));
        assert!(!state.skip_requested);

        assert!(state.activate(ActionContext { prior_state: false }, &event));
        assert!(!state.activate(ActionContext { prior_state: false }, &event));
        assert!(state.skip_requested);
    }
}
