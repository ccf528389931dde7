//=========================================================================
// Input Processor
//=========================================================================
//
// Per-screen dispatcher from action batches to the screen's handlers.
//
// Architecture:
//   InputManager::on_input_available ──► queue (crossbeam channel)
//   update(target):
//     get_inputs() → snapshot prior state → drain queue (newest first)
//       → Binding { handler, debounce } → handler(target, {prior}, event)
//       → action_state[action] = return value
//
// Bindings are resolved once at construction from the screen's action
// list through `ActionTarget::action_handler`. Listed actions without a
// handler are skipped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, trace};

//=== Internal Dependencies ===============================================

use super::{
    action::{ActionListItem, InputAction},
    debounce::Debounce,
    event::RawInputEvent,
    input_manager::{InputBatch, SharedInputManager},
};
use crate::core::{observable::ObserverToken, scene::Scene};

//=== Handler Types =======================================================

/// State handed to a handler alongside the raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionContext {
    /// The handler's return value for the same action on the previous tick.
    pub prior_state: bool,
}

/// Action handler: returns `true` while the action should be considered
/// held, `false` when there is nothing to carry forward.
pub type ActionHandler<T> = fn(&mut T, ActionContext, &RawInputEvent) -> bool;

/// Screen state that exposes handlers for some actions.
pub trait ActionTarget: Sized {
    /// Handler bound to `action`, or `None` if the screen ignores it.
    fn action_handler(action: InputAction) -> Option<ActionHandler<Self>>;
}

struct Binding<T> {
    action: InputAction,
    handler: ActionHandler<T>,
    debounce: Option<Debounce>,
}

//=== InputProcessor ======================================================

pub struct InputProcessor<T: ActionTarget> {
    scene: Rc<Scene>,
    input_manager: SharedInputManager,
    bindings: Vec<Binding<T>>,
    action_state: HashMap<InputAction, bool>,

    queue_tx: Sender<InputBatch>,
    queue_rx: Receiver<InputBatch>,
    subscription: Option<ObserverToken>,
}

impl<T: ActionTarget> InputProcessor<T> {
    /// Binds `actions` to `T`'s handlers, debouncing the bounced ones by
    /// `debounce_window`.
    pub fn new(
        scene: Rc<Scene>,
        input_manager: SharedInputManager,
        actions: &[ActionListItem],
        debounce_window: Duration,
    ) -> Self {
        let bindings = actions
            .iter()
            .filter_map(|item| {
                let Some(handler) = T::action_handler(item.action) else {
                    debug!("No handler for {} on scene '{}', skipping", item.action, scene.name());
                    return None;
                };
                Some(Binding {
                    action: item.action,
                    handler,
                    debounce: item.should_bounce.then(|| Debounce::new(debounce_window)),
                })
            })
            .collect();

        let (queue_tx, queue_rx) = unbounded();

        Self {
            scene,
            input_manager,
            bindings,
            action_state: HashMap::new(),
            queue_tx,
            queue_rx,
            subscription: None,
        }
    }

    //--- Control Attachment -----------------------------------------------

    /// Registers the scene's input and starts queueing batches.
    pub fn attach_control(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        info!("Input processor attaching control for scene '{}'", self.scene.name());

        let mut manager = self.input_manager.borrow_mut();
        manager.register_input_for_scene(&self.scene);

        let tx = self.queue_tx.clone();
        let token = manager.on_input_available().add(move |batch: &InputBatch| {
            let _ = tx.send(batch.clone());
        });
        self.subscription = Some(token);
    }

    /// Stops queueing, unregisters the scene's input and drops queued batches.
    pub fn detach_control(&mut self) {
        let Some(token) = self.subscription.take() else {
            return;
        };
        info!("Input processor detaching control for scene '{}'", self.scene.name());

        let mut manager = self.input_manager.borrow_mut();
        manager.on_input_available().remove(token);
        manager.unregister_input_for_scene(&self.scene);
        drop(manager);

        self.queue_rx.try_iter().for_each(drop);
        self.action_state.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    //--- Dispatch ---------------------------------------------------------

    /// Polls the Input Manager once and dispatches every queued batch,
    /// most recent first. Actions missing from this tick's batches lose
    /// their stored state, so the next press sees `prior_state == false`.
    pub fn update(&mut self, target: &mut T) {
        if !self.is_attached() {
            return;
        }

        self.input_manager.borrow_mut().get_inputs(self.scene.id());

        let prior = self.action_state.clone();
        let batches: Vec<InputBatch> = self.queue_rx.try_iter().collect();
        let mut dispatched = HashSet::new();

        for batch in batches.iter().rev() {
            for command in batch {
                let Some(binding) = self.bindings.iter().find(|b| b.action == command.action) else {
                    trace!("No action mapped for {}", command.action);
                    continue;
                };

                let context = ActionContext {
                    prior_state: prior.get(&command.action).copied().unwrap_or(false),
                };
                let handler = binding.handler;
                let event = &command.last_event;

                let result = match &binding.debounce {
                    Some(debounce) => debounce.call(self.scene.timeline(), || handler(target, context, event)),
                    None => handler(target, context, event),
                };

                self.action_state.insert(command.action, result);
                dispatched.insert(command.action);
            }
        }

        self.action_state.retain(|action, _| dispatched.contains(action));
    }

    //--- Queries ----------------------------------------------------------

    /// Number of batches waiting for the next `update`.
    pub fn queued_batches(&self) -> usize {
        self.queue_rx.len()
    }

    /// Last stored handler result for `action`.
    pub fn action_state(&self, action: InputAction) -> Option<bool> {
        self.action_state.get(&action).copied()
    }

    /// Returns `true` if `action` has a bound handler.
    pub fn is_bound(&self, action: InputAction) -> bool {
        self.bindings.iter().any(|b| b.action == action)
    }

    pub fn scene(&self) -> &Rc<Scene> {
        &self.scene
    }
}

impl<T: ActionTarget> Drop for InputProcessor<T> {
    fn drop(&mut self) {
        if let Ok(mut manager) = self.input_manager.try_borrow_mut() {
            if let Some(token) = self.subscription.take() {
                manager.on_input_available().remove(token);
                manager.unregister_input_for_scene(&self.scene);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
