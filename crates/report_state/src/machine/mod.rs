//! State machine module
//!
//! Tracks the lifecycle of report loads for one view.

mod events;
mod states;
mod transitions;

pub use events::LoadEvent;
pub use states::LoadState;
pub use transitions::{StateMachine, StateTransition};
