//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use space_trucker::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Application
pub use crate::application::{Application, ApplicationBuilder, RunOutcome};

// State machine
pub use crate::core::state::{AppState, AppStateMachine};

// Host traits
pub use crate::core::host::{Frame, HostEngine, LoopControl, RenderLoop};

// Input system
pub use crate::core::input::{
    ActionContext, ActionListItem, ActionTarget, ControlsMap, GamepadKind, InputAction, InputProcessor, KeyCode,
};

// Scenes and screens
pub use crate::core::scene::Scene;
pub use crate::screens::Screen;
