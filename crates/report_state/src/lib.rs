//! report_state - Fetch orchestration for the repair console reports
//!
//! Resolves the selected range into a window, runs the loaders and keeps
//! only the results that still match what the user is looking at.

pub mod loaders;
pub mod machine;
pub mod notice;
pub mod orchestrator;

pub use loaders::{CallLogReportLoader, DashboardLoader, LoadError, ReportLoader};
pub use machine::{LoadEvent, LoadState, StateMachine, StateTransition};
pub use notice::{Notice, NoticeBus, NoticeLevel};
pub use orchestrator::{
    Clock, FixedClock, LoadOutcome, LoadRequest, Orchestrator, Selection, SystemClock,
};
