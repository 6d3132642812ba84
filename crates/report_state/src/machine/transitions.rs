//! State transitions - FSM transition logic

use super::events::LoadEvent;
use super::states::LoadState;

const MAX_HISTORY: usize = 50;

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: LoadState,
    /// The state after the transition.
    pub to: LoadState,
    /// The event that triggered the transition.
    pub event: LoadEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine for the load lifecycle of one report view.
#[derive(Debug, Clone)]
pub struct StateMachine {
    current_state: LoadState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self::with_state(LoadState::Idle)
    }

    pub fn with_state(state: LoadState) -> Self {
        Self {
            current_state: state,
            history: Vec::new(),
            max_history: MAX_HISTORY,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.current_state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Handle an event and transition to a new state.
    pub fn handle_event(&mut self, event: LoadEvent) -> StateTransition {
        let old_state = self.current_state.clone();
        let new_state = Self::compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        if changed {
            tracing::debug!(from = ?old_state, to = ?new_state, "load state changed");
        }
        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Compute the next state given current state and event.
    fn compute_next_state(state: &LoadState, event: &LoadEvent) -> LoadState {
        use LoadEvent::*;
        use LoadState::*;

        match (state, event) {
            (LoadState::TornDown, _) => LoadState::TornDown,
            (_, LoadEvent::TornDown) => LoadState::TornDown,

            (_, RequestIssued { seq }) => Loading { seq: *seq },

            // Dropped results never move the view.
            (_, RequestSuperseded { .. }) => state.clone(),

            // An older request of the same selection finished while a newer
            // one is still running.
            (Loading { seq: latest }, RequestSucceeded { seq }) if seq < latest => state.clone(),
            (Loading { seq: latest }, RequestFailed { seq, .. }) if seq < latest => state.clone(),

            (Loading { .. }, RequestSucceeded { seq }) => Ready { seq: *seq },
            (Loading { .. }, RequestFailed { seq, error }) => Errored {
                seq: *seq,
                error: error.clone(),
            },

            _ => state.clone(),
        }
    }

    /// Check if an event would change the state without applying it.
    pub fn can_transition(&self, event: &LoadEvent) -> bool {
        Self::compute_next_state(&self.current_state, event) != self.current_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_flow() {
        let mut sm = StateMachine::new();
        assert_eq!(sm.state(), &LoadState::Idle);

        let t1 = sm.handle_event(LoadEvent::RequestIssued { seq: 1 });
        assert!(t1.changed);
        assert_eq!(sm.state(), &LoadState::Loading { seq: 1 });

        let t2 = sm.handle_event(LoadEvent::RequestSucceeded { seq: 1 });
        assert!(t2.changed);
        assert_eq!(sm.state(), &LoadState::Ready { seq: 1 });

        sm.handle_event(LoadEvent::RequestIssued { seq: 2 });
        sm.handle_event(LoadEvent::RequestFailed {
            seq: 2,
            error: "offline".to_string(),
        });
        assert_eq!(
            sm.state(),
            &LoadState::Errored {
                seq: 2,
                error: "offline".to_string()
            }
        );
    }

    #[test]
    fn test_superseded_results_do_not_change_state() {
        let mut sm = StateMachine::with_state(LoadState::Loading { seq: 4 });
        let transition = sm.handle_event(LoadEvent::RequestSuperseded { seq: 3 });
        assert!(!transition.changed);
        assert_eq!(sm.state(), &LoadState::Loading { seq: 4 });
    }

    #[test]
    fn test_older_completion_keeps_loading() {
        let mut sm = StateMachine::with_state(LoadState::Loading { seq: 5 });
        assert!(!sm.can_transition(&LoadEvent::RequestSucceeded { seq: 4 }));
        sm.handle_event(LoadEvent::RequestSucceeded { seq: 4 });
        assert!(sm.state().is_loading());

        sm.handle_event(LoadEvent::RequestSucceeded { seq: 5 });
        assert_eq!(sm.state(), &LoadState::Ready { seq: 5 });
    }

    #[test]
    fn test_teardown_is_terminal() {
        let mut sm = StateMachine::with_state(LoadState::Loading { seq: 1 });
        sm.handle_event(LoadEvent::TornDown);
        sm.handle_event(LoadEvent::RequestIssued { seq: 2 });
        sm.handle_event(LoadEvent::RequestSucceeded { seq: 1 });
        assert_eq!(sm.state(), &LoadState::TornDown);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut sm = StateMachine::new();
        for seq in 0..(MAX_HISTORY as u64 + 10) {
            sm.handle_event(LoadEvent::RequestIssued { seq });
        }
        assert_eq!(sm.history().len(), MAX_HISTORY);
        assert_eq!(sm.history()[0].event.seq(), Some(10));
    }
}
