//=========================================================================
// Space Trucker Application
//
// Top-level controller: owns the state machine, the shared input
// pipeline and the screens, and drives them from the host render loop.
//
// Architecture:
// ```text
//     ApplicationBuilder ──build(host)──> Application ──run(loop)──> RunOutcome
//         │                                   │
//         ├─ with_debounce()                  ├─ initialize()
//         ├─ with_dead_zone()                 └─ frame() once per refresh
//         ├─ with_preferred_gamepad()             ├─ route device events
//         ├─ with_fullscreen()                    ├─ apply screen notifications
//         └─ with_controls()                      ├─ update active screen
//                                                 └─ render active scene
// ```
//
// Screens never switch states themselves: their observables queue an
// `AppCommand` that the controller applies on the next frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::{
    host::{Frame, HostEngine, LoopControl, RenderLoop},
    input::{
        ControlsMap, DeviceEvent, GamepadKind, GamepadManager, InputManager, SharedInputManager,
        DEFAULT_DEBOUNCE,
    },
    observable::Observable,
    state::{AppState, AppStateMachine},
};
use crate::screens::{MenuScreen, RunningScreen, Screen, SplashScreen};

//=== Configuration =======================================================

/// Settings resolved by [`ApplicationBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationConfig {
    pub debounce: Duration,
    pub dead_zone: f32,
    pub preferred_gamepad: GamepadKind,
    pub fullscreen: bool,
    pub controls: ControlsMap,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            dead_zone: 0.1,
            preferred_gamepad: GamepadKind::Xbox,
            fullscreen: true,
            controls: ControlsMap::default(),
        }
    }
}

//=== ApplicationBuilder ==================================================

/// Builder for configuring and constructing an [`Application`].
///
/// # Default Values
///
/// - **Debounce window**: 250 ms
/// - **Stick dead zone**: 0.1
/// - **Preferred gamepad**: Xbox
/// - **Fullscreen**: on
/// - **Controls**: [`ControlsMap::default`]
///
/// # Examples
///
/// ```no_run
/// use space_trucker::platform::{Platform, PlatformError};
/// use space_trucker::ApplicationBuilder;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), PlatformError> {
/// let mut platform = Platform::new()?;
/// let mut app = ApplicationBuilder::new()
///     .with_debounce(Duration::from_millis(200))
///     .with_fullscreen(false)
///     .build(platform.host());
/// app.run(&mut platform)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ApplicationBuilder {
    config: ApplicationConfig,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window during which repeated bounced actions are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        assert!(!window.is_zero(), "Debounce window must be positive");
        self.config.debounce = window;
        self
    }

    /// Sets the radial dead zone applied to gamepad sticks.
    ///
    /// # Panics
    ///
    /// Panics unless `0.0 <= dead_zone < 1.0`.
    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        assert!(
            (0.0..1.0).contains(&dead_zone),
            "Dead zone must be in [0, 1), got {}",
            dead_zone
        );
        self.config.dead_zone = dead_zone;
        self
    }

    /// Gamepad kind that wins selection over any other connected pad.
    pub fn with_preferred_gamepad(mut self, kind: GamepadKind) -> Self {
        self.config.preferred_gamepad = kind;
        self
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.config.fullscreen = fullscreen;
        self
    }

    pub fn with_controls(mut self, controls: ControlsMap) -> Self {
        self.config.controls = controls;
        self
    }

    pub fn build<H: HostEngine>(self, host: H) -> Application<H> {
        info!(
            "Building application (debounce: {:?}, dead zone: {}, gamepad: {:?})",
            self.config.debounce, self.config.dead_zone, self.config.preferred_gamepad
        );

        let (commands_tx, commands_rx) = unbounded();
        Application {
            host,
            config: self.config,
            state: AppStateMachine::new(),
            gamepads: Rc::new(GamepadManager::new()),
            input_manager: None,
            screens: None,
            active: None,
            commands_tx,
            commands_rx,
            reload_requested: false,
        }
    }
}

//=== Application =========================================================

/// How a [`Application::run`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The user exited; the host asked for a fresh application.
    Reload,
    /// The render loop stopped on its own (window closed).
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppCommand {
    StartCutscene,
    Play,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveScreen {
    Splash,
    Menu,
    Running,
}

struct Screens {
    splash: SplashScreen,
    menu: MenuScreen,
    running: RunningScreen,
}

pub struct Application<H: HostEngine> {
    host: H,
    config: ApplicationConfig,
    state: AppStateMachine,
    gamepads: Rc<GamepadManager>,
    input_manager: Option<SharedInputManager>,
    screens: Option<Screens>,
    active: Option<ActiveScreen>,

    commands_tx: Sender<AppCommand>,
    commands_rx: Receiver<AppCommand>,
    reload_requested: bool,
}

impl<H: HostEngine> Application<H> {
    //--- Initialization ---------------------------------------------------

    /// Shows the loading indicator and builds the input pipeline and the
    /// splash and menu screens. Idempotent.
    pub fn initialize(&mut self) {
        if self.screens.is_some() {
            return;
        }
        info!("Initializing application");

        if self.config.fullscreen {
            self.host.enter_fullscreen();
        }
        self.host.display_loading_ui();
        self.state.transition(AppState::Initializing);

        let input_manager = InputManager::new(
            self.config.controls.clone(),
            self.config.preferred_gamepad,
            self.config.dead_zone,
        )
        .shared();

        let splash = SplashScreen::new(
            &self.host,
            Rc::clone(&self.gamepads),
            Rc::clone(&input_manager),
            self.config.debounce,
        );
        let menu = MenuScreen::new(
            &self.host,
            Rc::clone(&self.gamepads),
            Rc::clone(&input_manager),
            self.config.debounce,
        );
        let running = RunningScreen::new(&self.host, Rc::clone(&self.gamepads));

        self.wire(&splash.on_ready, AppCommand::StartCutscene);
        self.wire(&menu.on_play, AppCommand::Play);
        self.wire(&menu.on_exit, AppCommand::Exit);

        self.input_manager = Some(input_manager);
        self.screens = Some(Screens { splash, menu, running });
    }

    fn wire(&self, observable: &Observable<()>, command: AppCommand) {
        let tx = self.commands_tx.clone();
        observable.add(move |_| {
            let _ = tx.send(command);
        });
    }

    //--- Execution --------------------------------------------------------

    /// Initializes, then hands [`Application::frame`] to `render_loop` and
    /// blocks until it returns.
    pub fn run<L: RenderLoop>(&mut self, render_loop: L) -> Result<RunOutcome, L::Error> {
        self.initialize();
        info!("Starting render loop");

        render_loop.run(|frame| self.frame(frame))?;

        let outcome = if self.reload_requested {
            RunOutcome::Reload
        } else {
            RunOutcome::Closed
        };
        info!("Render loop exited ({:?})", outcome);
        Ok(outcome)
    }

    /// Per-frame callback.
    pub fn frame(&mut self, frame: Frame) -> LoopControl {
        if self.state.is_terminated() {
            return LoopControl::Exit;
        }

        for event in &frame.events {
            self.route_event(event);
        }

        if let Some(screens) = self.screens.as_mut() {
            screens.splash.check_ready();
        }
        let commands: Vec<AppCommand> = self.commands_rx.try_iter().collect();
        for command in commands {
            self.apply(command);
        }

        let delta = Some(frame.delta);
        match self.state.current() {
            AppState::Cutscene => {
                let skip = self.screens.as_ref().is_some_and(|s| s.splash.skip_requested());
                if skip {
                    self.go_to_main_menu();
                } else if let Some(screens) = self.screens.as_mut() {
                    screens.splash.update(delta);
                }
            }
            AppState::Menu => {
                if let Some(screens) = self.screens.as_mut() {
                    screens.menu.update(delta);
                }
            }
            AppState::Created | AppState::Initializing | AppState::Running | AppState::Exiting => {}
        }

        if let Some(screen) = self.active_screen() {
            screen.scene().render(frame.delta);
        }

        if self.state.is_terminated() {
            LoopControl::Exit
        } else {
            LoopControl::Continue
        }
    }

    fn route_event(&self, event: &DeviceEvent) {
        if self.gamepads.handle(event) {
            return;
        }
        if let Some(screen) = self.active_screen() {
            screen.scene().dispatch(event);
        }
    }

    fn apply(&mut self, command: AppCommand) {
        debug!("Applying {:?}", command);
        match command {
            AppCommand::StartCutscene => self.go_to_opening_cutscene(),
            AppCommand::Play => self.go_to_running_state(),
            AppCommand::Exit => self.exit(),
        }
    }

    //--- Transitions ------------------------------------------------------

    pub fn go_to_opening_cutscene(&mut self) {
        if self.state.is_terminated() {
            return;
        }
        self.state.transition(AppState::Cutscene);
        self.host.hide_loading_ui();

        let Some(screens) = self.screens.as_mut() else {
            return;
        };
        screens.splash.attach_controls();
        self.active = Some(ActiveScreen::Splash);
        screens.splash.run();
    }

    pub fn go_to_main_menu(&mut self) {
        if self.state.is_terminated() {
            return;
        }
        let Some(screens) = self.screens.as_mut() else {
            return;
        };
        screens.splash.detach_controls();
        self.active = Some(ActiveScreen::Menu);
        self.state.transition(AppState::Menu);
        screens.menu.attach_controls();
    }

    pub fn go_to_running_state(&mut self) {
        if self.state.is_terminated() {
            return;
        }
        if let Some(screens) = self.screens.as_mut() {
            screens.menu.detach_controls();
            screens.running.attach_controls();
        }
        self.active = Some(ActiveScreen::Running);
        self.state.transition(AppState::Running);
    }

    pub fn exit(&mut self) {
        info!("Exiting application");
        if let Some(screen) = self.active_screen_mut() {
            screen.detach_controls();
        }
        self.active = None;
        if let Some(screens) = &self.screens {
            screens.splash.scene().dispose();
            screens.menu.scene().dispose();
            screens.running.scene().dispose();
        }

        self.host.exit_fullscreen();
        self.state.transition(AppState::Exiting);
        self.host.dispose();
        self.host.request_reload();
        self.reload_requested = true;
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> AppState {
        self.state.current()
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn gamepads(&self) -> &Rc<GamepadManager> {
        &self.gamepads
    }

    pub fn input_manager(&self) -> Option<&SharedInputManager> {
        self.input_manager.as_ref()
    }

    fn active_screen(&self) -> Option<&dyn Screen> {
        let screens = self.screens.as_ref()?;
        let screen: &dyn Screen = match self.active? {
            ActiveScreen::Splash => &screens.splash,
            ActiveScreen::Menu => &screens.menu,
            ActiveScreen::Running => &screens.running,
        };
        Some(screen)
    }

    fn active_screen_mut(&mut self) -> Option<&mut dyn Screen> {
        let screens = self.screens.as_mut()?;
        let screen: &mut dyn Screen = match self.active? {
            ActiveScreen::Splash => &mut screens.splash,
            ActiveScreen::Menu => &mut screens.menu,
            ActiveScreen::Running => &mut screens.running,
        };
        Some(screen)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
