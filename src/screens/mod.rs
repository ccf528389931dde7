//=========================================================================
// Screens
//
// One module per application state that owns a scene.
//
// Responsibilities:
// - Splash cut-scene with skip-on-activate (`splash`, `cutscene`)
// - Main menu with selection, fades and Play / Exit (`menu`)
// - In-game placeholder (`running`)
//
// Notes:
// Screens never change the application state themselves. They raise
// observables that the `Application` turns into transitions on its next
// frame.
//
//=========================================================================

//=== Submodules ==========================================================
pub mod cutscene;
pub mod menu;
pub mod running;
pub mod splash;

//=== Public API ==========================================================
pub use cutscene::CutSceneSegment;
pub use menu::{MenuItem, MenuScreen};
pub use running::RunningScreen;
pub use splash::SplashScreen;

use std::rc::Rc;
use std::time::Duration;

use crate::core::scene::Scene;

//=========================================================================
// Screen Trait
//=========================================================================

/// A scene-owning application state.
///
/// Lifecycle:
/// - `attach_controls()` when the screen becomes active
/// - `update()` once per frame while active, before its scene renders
/// - `detach_controls()` when another screen takes over
pub trait Screen {
    fn scene(&self) -> &Rc<Scene>;

    /// Per-frame logic. `delta` is `None` when the host did not report
    /// frame timing.
    fn update(&mut self, delta: Option<Duration>);

    fn attach_controls(&mut self);

    fn detach_controls(&mut self);
}
