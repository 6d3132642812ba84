//! Load events - Defines events that trigger state transitions

use serde::{Deserialize, Serialize};

/// Events fed to the load state machine by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadEvent {
    /// A request was tagged and handed to a loader.
    RequestIssued { seq: u64 },

    /// The result of request `seq` was applied.
    RequestSucceeded { seq: u64 },

    /// Request `seq` failed while still current.
    RequestFailed { seq: u64, error: String },

    /// Request `seq` finished after the selection moved on; its result was
    /// dropped.
    RequestSuperseded { seq: u64 },

    /// The selection publisher went away.
    TornDown,
}

impl LoadEvent {
    pub fn seq(&self) -> Option<u64> {
        match self {
            Self::RequestIssued { seq }
            | Self::RequestSucceeded { seq }
            | Self::RequestFailed { seq, .. }
            | Self::RequestSuperseded { seq } => Some(*seq),
            Self::TornDown => None,
        }
    }
}
