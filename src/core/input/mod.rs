//=========================================================================
// Input System
//
// Action-based input pipeline shared by every screen.
//
// Responsibilities:
// - Model raw device input in a host-agnostic way (`event`, `gamepad`)
// - Translate pressed inputs into semantic actions (`controls`, `input_map`)
// - Keep per-scene device subscriptions (`devices`, `input_manager`)
// - Dispatch actions to screen handlers with debounce and prior state
//   (`debounce`, `input_processor`)
//
// Flow:
//   DeviceEvent → Scene observables → DeviceAdapter → InputMap
//     → InputManager::get_inputs → InputBatch → InputProcessor::update
//     → ActionHandler on the screen state
//
//=========================================================================

//=== Submodules ==========================================================
pub mod action;
pub mod controls;
pub mod debounce;
pub mod devices;
pub mod event;
pub mod gamepad;
pub mod input_manager;
pub mod input_map;
pub mod input_processor;

//=== Public API ==========================================================
pub use action::{ActionListItem, InputAction};
pub use controls::ControlsMap;
pub use debounce::{Debounce, DEFAULT_DEBOUNCE};
pub use event::{ButtonPhase, DeviceEvent, InputKey, KeyCode, KeyboardInfo, MouseButton, PointerInfo, RawInputEvent};
pub use gamepad::{GamepadButton, GamepadDescriptor, GamepadId, GamepadKind, GamepadManager, StickValues};
pub use input_manager::{InputBatch, InputCommand, InputManager, SharedInputManager};
pub use input_map::InputMap;
pub use input_processor::{ActionContext, ActionHandler, ActionTarget, InputProcessor};
