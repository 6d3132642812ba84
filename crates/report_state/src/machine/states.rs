//! Load states - Defines all possible states of a report view

use serde::{Deserialize, Serialize};

/// Lifecycle of the data behind one report view.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,

    /// A load is in flight; `seq` is the newest request issued.
    Loading { seq: u64 },

    /// The output of request `seq` is on screen.
    Ready { seq: u64 },

    /// Request `seq` failed. Any earlier output stays on screen.
    Errored { seq: u64, error: String },

    /// The view is gone; nothing is applied any more.
    TornDown,
}

impl Default for LoadState {
    fn default() -> Self {
        Self::Idle
    }
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TornDown)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Human-readable description of the state.
    pub fn description(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Loading { .. } => "Loading",
            Self::Ready { .. } => "Ready",
            Self::Errored { .. } => "Failed to load",
            Self::TornDown => "Closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(LoadState::default(), LoadState::Idle);
    }

    #[test]
    fn test_only_teardown_is_terminal() {
        assert!(LoadState::TornDown.is_terminal());
        assert!(!LoadState::Errored { seq: 1, error: "boom".into() }.is_terminal());
        assert!(LoadState::Loading { seq: 2 }.is_loading());
    }
}
