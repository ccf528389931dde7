//=========================================================================
// Application State Machine
//=========================================================================
//
// Holds the single current application state and the previous one.
//
// Architecture:
//   advance(Some(next)) → step(current, next) → Step → logged transition
//   advance(None)       → current state
//
// The model is permissive: any state may follow any other. The only rule
// is that `Exiting` is terminal.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::{debug, info};

//=== AppState ============================================================

/// Coarse application lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppState {
    Created,
    Initializing,
    Cutscene,
    Menu,
    Running,
    Exiting,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "CREATED",
            Self::Initializing => "INITIALIZING",
            Self::Cutscene => "CUTSCENE",
            Self::Menu => "MENU",
            Self::Running => "RUNNING",
            Self::Exiting => "EXITING",
        };
        f.write_str(name)
    }
}

//=== Step ================================================================

/// Result of applying a transition request to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The request is accepted and becomes the new current state.
    Transition { from: AppState, to: AppState },

    /// No request was made; the state is unchanged.
    Stay(AppState),

    /// The machine already exited; the request is discarded.
    Terminated,
}

//=== AppStateMachine =====================================================

/// Sequencer for [`AppState`] with previous-state tracking.
#[derive(Debug)]
pub struct AppStateMachine {
    current: AppState,
    previous: Option<AppState>,
}

impl AppStateMachine {
    /// Creates a machine in [`AppState::Created`].
    pub fn new() -> Self {
        info!(
            "App state changed. Previous state: none - New state: {}",
            AppState::Created
        );
        Self {
            current: AppState::Created,
            previous: None,
        }
    }

    //--- Transition Function ----------------------------------------------

    /// Pure transition function.
    pub fn step(current: AppState, requested: Option<AppState>) -> Step {
        if current == AppState::Exiting {
            return Step::Terminated;
        }
        match requested {
            Some(to) => Step::Transition { from: current, to },
            None => Step::Stay(current),
        }
    }

    /// Applies an optional transition request and returns the current state.
    pub fn advance(&mut self, requested: Option<AppState>) -> AppState {
        match Self::step(self.current, requested) {
            Step::Transition { from, to } => {
                self.previous = Some(from);
                self.current = to;
                info!("App state changed. Previous state: {} - New state: {}", from, to);
            }
            Step::Stay(_) => {}
            Step::Terminated => {
                if let Some(requested) = requested {
                    debug!("Ignoring transition to {} after exit", requested);
                }
            }
        }
        self.current
    }

    /// Requests a transition to `state`.
    pub fn transition(&mut self, state: AppState) -> AppState {
        self.advance(Some(state))
    }

    //--- Queries ----------------------------------------------------------

    pub fn current(&self) -> AppState {
        self.current
    }

    pub fn previous(&self) -> Option<AppState> {
        self.previous
    }

    /// Returns `true` once the machine reached [`AppState::Exiting`].
    pub fn is_terminated(&self) -> bool {
        self.current == AppState::Exiting
    }
}

impl Default for AppStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_created_without_previous() {
        let machine = AppStateMachine::new();
        assert_eq!(machine.current(), AppState::Created);
        assert_eq!(machine.previous(), None);
        assert!(!machine.is_terminated());
    }

    #[test]
    fn current_tracks_last_requested_state() {
        let mut machine = AppStateMachine::new();
        let requests = [
            AppState::Initializing,
            AppState::Cutscene,
            AppState::Menu,
            AppState::Cutscene,
            AppState::Running,
            AppState::Menu,
        ];

        for state in requests {
            assert_eq!(machine.transition(state), state);
            assert_eq!(machine.current(), state);
        }
        assert_eq!(machine.previous(), Some(AppState::Running));
    }

    #[test]
    fn reading_does_not_transition() {
        let mut machine = AppStateMachine::new();
        machine.transition(AppState::Menu);

        assert_eq!(machine.advance(None), AppState::Menu);
        assert_eq!(machine.previous(), Some(AppState::Created));
    }

    #[test]
    fn permissive_model_allows_any_order() {
        let mut machine = AppStateMachine::new();
        machine.transition(AppState::Running);
        machine.transition(AppState::Created);
        assert_eq!(machine.current(), AppState::Created);
    }

    #[test]
    fn exiting_is_terminal() {
        let mut machine = AppStateMachine::new();
        machine.transition(AppState::Menu);
        machine.transition(AppState::Exiting);

        for state in [AppState::Menu, AppState::Running, AppState::Created] {
            assert_eq!(machine.transition(state), AppState::Exiting);
        }

        assert_eq!(machine.current(), AppState::Exiting);
        assert_eq!(machine.previous(), Some(AppState::Menu));
        assert!(machine.is_terminated());
    }

    #[test]
    fn step_is_pure() {
        assert_eq!(
            AppStateMachine::step(AppState::Menu, Some(AppState::Running)),
            Step::Transition {
                from: AppState::Menu,
                to: AppState::Running
            }
        );
        assert_eq!(AppStateMachine::step(AppState::Menu, None), Step::Stay(AppState::Menu));
        assert_eq!(
            AppStateMachine::step(AppState::Exiting, Some(AppState::Menu)),
            Step::Terminated
        );
    }

    #[test]
    fn display_uses_upper_case_names() {
        assert_eq!(AppState::Cutscene.to_string(), "CUTSCENE");
        assert_eq!(AppState::Exiting.to_string(), "EXITING");
    }
}
