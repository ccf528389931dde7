//=========================================================================
// Client Core
//
// Host-independent building blocks of the game client.
//
// Responsibilities:
// - Application lifecycle state machine (`state`)
// - Per-scene handle, timers and listener registry (`scene`, `timeline`,
//   `observable`)
// - Action-based input pipeline (`input`)
// - Collaborator traits for the render host (`host`)
//
// Notes:
// Everything here runs on the single frame-loop thread. Shared state uses
// `Rc`/`RefCell`/`Cell`, and host callbacks are forwarded through channels
// or cells so they are applied at the owner's next poll.
//
//=========================================================================

pub mod host;
pub mod input;
pub mod observable;
pub mod scene;
pub mod state;
pub mod timeline;
