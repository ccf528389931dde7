//=========================================================================
// Platform Subsystem
//
// Desktop host for the client: winit window, on-demand event loop,
// gilrs gamepads and per-frame input batching.
//
// Architecture:
// ```text
//  Main Thread
//  ┌──────────────────────────────────────────────┐
//  │  Winit Event Loop (run_app_on_demand)         │
//  │   ↓                                          │
//  │  EventMapper   Winit → DeviceEvent           │
//  │  GamepadSource gilrs → DeviceEvent           │
//  │   ↓                                          │
//  │  InputBuffer                                 │
//  │   ├─ discrete: arrival order                 │
//  │   └─ continuous: latest per source           │
//  │   ↓                                          │
//  │  RedrawRequested                             │
//  │   ↓ (drain)                                  │
//  │  Frame { delta, events } → frame callback    │
//  │   ↓                                          │
//  │  SurfaceState → window title / fullscreen    │
//  └──────────────────────────────────────────────┘
// ```
//
// The event loop can only be created once per process, so one `Platform`
// serves every application instance: after a reload the same platform
// runs the next application.
//
// Responsibilities:
// - Create the OS window and keep it redrawing
// - Convert window and gamepad input into device events
// - Flush buffered input at the frame boundary
// - Apply host requests (fullscreen, loading title) to the window
//
//=========================================================================

//=== Submodules ==========================================================

mod event_mapper;
mod gamepad_source;
mod host;
mod input_buffer;

pub use host::WinitHost;

//=== External Crates =====================================================

use std::rc::Rc;
use std::time::Instant;

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::run_on_demand::EventLoopExtRunOnDemand,
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::host::{Frame, LoopControl, RenderLoop};
use event_mapper::EventMapper;
use gamepad_source::GamepadSource;
use host::SurfaceState;
use input_buffer::InputBuffer;

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are fatal: without an event loop or a window the client cannot
/// run.
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to create the event loop.
    EventLoopCreation(winit::error::EventLoopError),

    /// The event loop stopped with an error.
    EventLoopExecution(winit::error::EventLoopError),

    /// The OS refused to create the window.
    WindowCreation(winit::error::OsError),
}

//--- Trait Implementations -----------------------------------------------

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
            Self::WindowCreation(e) => write!(f, "Window creation failed: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {}

//=== Platform ============================================================

/// Owner of the event loop and of the state shared with [`WinitHost`].
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new()` creates the event loop
/// 2. **Host**: `platform.host()` hands a host handle to the application
/// 3. **Execution**: `app.run(&mut platform)` drives frames until the
///    application exits or the window closes
/// 4. **Reload**: steps 2-3 repeat with a fresh application
///
/// # Thread Safety
///
/// Not Send/Sync: winit requires the main thread on macOS/iOS.
pub struct Platform {
    event_loop: EventLoop<()>,
    gamepads: GamepadSource,
    surface: Rc<SurfaceState>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Result<Self, PlatformError> {
        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        let gamepads = GamepadSource::new();
        info!(target: "platform", "Platform subsystem initialized");
        Ok(Self {
            event_loop,
            gamepads,
            surface: Rc::new(SurfaceState::new()),
        })
    }

    /// Returns a host handle for a new application instance.
    pub fn host(&self) -> WinitHost {
        self.surface.reset();
        WinitHost::new(Rc::clone(&self.surface))
    }
}

//--- RenderLoop ----------------------------------------------------------

impl RenderLoop for &mut Platform {
    type Error = PlatformError;

    fn run<F>(self, frame: F) -> Result<(), PlatformError>
    where
        F: FnMut(Frame) -> LoopControl,
    {
        debug!(target: "platform", "Starting Winit event loop");

        let mut driver = FrameDriver::new(Rc::clone(&self.surface), &mut self.gamepads, frame);
        self.event_loop
            .run_app_on_demand(&mut driver)
            .map_err(PlatformError::EventLoopExecution)?;

        debug!(
            target: "platform",
            "Event loop returned (disposed: {}, reload requested: {})",
            self.surface.is_disposed(),
            self.surface.reload_requested()
        );

        match driver.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

//=== FrameDriver =========================================================

/// Winit handler for one application run.
struct FrameDriver<'a, F> {
    /// OS window handle (None until `resumed()`).
    window: Option<Window>,
    title: String,

    buffer: InputBuffer,
    mapper: EventMapper,
    gamepads: &'a mut GamepadSource,
    surface: Rc<SurfaceState>,

    frame: F,
    last_frame: Option<Instant>,
    error: Option<PlatformError>,
}

impl<'a, F> FrameDriver<'a, F>
where
    F: FnMut(Frame) -> LoopControl,
{
    fn new(surface: Rc<SurfaceState>, gamepads: &'a mut GamepadSource, frame: F) -> Self {
        let mut buffer = InputBuffer::new();
        gamepads.announce_connected(&mut buffer);

        Self {
            window: None,
            title: String::new(),
            buffer,
            mapper: EventMapper::new(),
            gamepads,
            surface,
            frame,
            last_frame: None,
            error: None,
        }
    }

    //--- tick() -----------------------------------------------------------
    //
    // Frame boundary: polls gamepads, drains buffered input and runs the
    // frame callback. The first frame of a run reports a zero delta.
    //
    fn tick(&mut self, now: Instant) -> LoopControl {
        self.gamepads.poll(&mut self.buffer);

        let delta = self
            .last_frame
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_frame = Some(now);

        if !self.buffer.is_empty() {
            trace!(target: "platform::input", "Flushing {} events", self.buffer.len());
        }
        let events = self.buffer.drain();

        (self.frame)(Frame { delta, events })
    }

    /// Applies host requests recorded during the frame to the window.
    fn apply_surface(&mut self) {
        let Some(window) = &self.window else {
            return;
        };

        let title = self.surface.title();
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }

        let wants_fullscreen = self.surface.wants_fullscreen();
        if wants_fullscreen != window.fullscreen().is_some() {
            debug!(target: "platform", "Fullscreen: {}", wants_fullscreen);
            window.set_fullscreen(wants_fullscreen.then_some(Fullscreen::Borderless(None)));
        }
    }
}

//=== Winit Integration ===================================================

impl<F> ApplicationHandler for FrameDriver<'_, F>
where
    F: FnMut(Frame) -> LoopControl,
{
    /// Creates the window on startup (and on mobile resume).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.surface.title())
            .with_inner_size(LogicalSize::new(1280, 720));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.surface.resize(size.width, size.height);
                window.request_redraw();
                self.window = Some(window);
                self.apply_surface();
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.error = Some(PlatformError::WindowCreation(e));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                let (width, height) = self.surface.size();
                debug!(
                    target: "platform",
                    "Window resized from {}x{} to {}x{}",
                    width,
                    height,
                    size.width,
                    size.height
                );
                self.surface.resize(size.width, size.height);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self.mapper.cursor_moved(position.x, position.y);
                self.buffer.push(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => match self.mapper.key(&key_event) {
                Some(event) => self.buffer.push(event),
                None => trace!(target: "platform::input", "Unmapped key ignored"),
            },

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.mapper.mouse_button(button, state);
                self.buffer.push(event);
            }

            WindowEvent::RedrawRequested => {
                if self.tick(Instant::now()) == LoopControl::Exit {
                    info!(target: "platform", "Application requested exit");
                    event_loop.exit();
                    return;
                }

                self.apply_surface();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    /// Drops the window so the next run starts with a fresh one.
    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        debug!(target: "platform", "Event loop exiting");
        self.window = None;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
