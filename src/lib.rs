//=========================================================================
// Space Trucker: Library Root
//
// Game client core: application state machine, screen flow and an
// action-based input pipeline over a pluggable render host.
//
// Responsibilities:
// - Expose the application controller (`Application`, `ApplicationBuilder`)
// - Expose host-independent building blocks (`core`) and screens
//   (`screens`) for embedding and testing against other hosts
// - Provide the desktop host (`platform`) used by the binary
//
// Typical usage:
// ```no_run
// use space_trucker::{platform::Platform, ApplicationBuilder, RunOutcome};
//
// fn main() -> Result<(), space_trucker::platform::PlatformError> {
//     let mut platform = Platform::new()?;
//     while ApplicationBuilder::new().build(platform.host()).run(&mut platform)?
//         == RunOutcome::Reload
//     {}
//     Ok(())
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the state machine, scenes, timers and the input system.
// `screens` holds the splash, menu and running screens.
// `platform` is the winit desktop host.
//
pub mod core;
pub mod platform;
pub mod prelude;
pub mod screens;

//--- Internal Modules ----------------------------------------------------
//
// `application` defines the controller and its builder, re-exported below.
//
mod application;

//--- Public Exports ------------------------------------------------------
pub use application::{Application, ApplicationBuilder, ApplicationConfig, RunOutcome};
