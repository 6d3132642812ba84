//! Orchestrator - Issues loads for the current selection and applies only
//! the results that still match it.
//!
//! The presentation layer owns the selection and publishes it through a
//! `watch` channel. Every load is tagged with a sequence number and the
//! selection it was issued for. A finished load is applied only while that
//! selection is still the current one and no newer load has settled. A
//! failure is reported only for the newest load issued; anything else is
//! dropped silently. Once the selection sender is gone the
//! view is considered torn down and completions are ignored.

use std::future::Future;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use futures::stream::{FuturesUnordered, StreamExt};
use report_core::{RangePreset, TimeWindow};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::loaders::{LoadError, ReportLoader};
use crate::machine::{LoadEvent, LoadState, StateMachine};
use crate::notice::{Notice, NoticeBus};

/// What the user is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub preset: RangePreset,
    /// Call-log filter; the dashboard ignores it.
    pub service_id: Option<u64>,
}

impl Selection {
    pub fn new(preset: RangePreset) -> Self {
        Self {
            preset,
            service_id: None,
        }
    }

    pub fn with_service_id(mut self, service_id: u64) -> Self {
        self.service_id = Some(service_id);
        self
    }
}

/// Source of "now" for window resolution.
pub trait Clock: Send + Sync {
    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A load tagged with everything needed to judge its result later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub seq: u64,
    pub selection: Selection,
    pub window: TimeWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result replaced the current output.
    Applied,
    /// The load failed while current; a notice was published and the
    /// previous output kept.
    Failed,
    /// The selection moved on or a newer load superseded this one.
    Superseded,
    /// The view is gone.
    TornDown,
}

pub struct Orchestrator<L: ReportLoader> {
    loader: Arc<L>,
    clock: Arc<dyn Clock>,
    selection: watch::Receiver<Selection>,
    notices: NoticeBus,
    machine: StateMachine,
    next_seq: u64,
    last_applied: Option<u64>,
    /// Newest request whose current result was applied or reported.
    last_settled: Option<u64>,
    output: watch::Sender<Option<Arc<L::Output>>>,
}

impl<L: ReportLoader> Orchestrator<L> {
    pub fn new(
        loader: L,
        clock: Arc<dyn Clock>,
        selection: watch::Receiver<Selection>,
        notices: NoticeBus,
    ) -> Self {
        let (output, _) = watch::channel(None);
        Self {
            loader: Arc::new(loader),
            clock,
            selection,
            notices,
            machine: StateMachine::new(),
            next_seq: 0,
            last_applied: None,
            last_settled: None,
            output,
        }
    }

    pub fn state(&self) -> &LoadState {
        self.machine.state()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// The last applied output, if any load has succeeded yet.
    pub fn output(&self) -> Option<Arc<L::Output>> {
        self.output.borrow().clone()
    }

    /// Receiver that observes every applied output.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<L::Output>>> {
        self.output.subscribe()
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    /// Tag a new load for the current selection.
    ///
    /// Returns `None` once the view has been torn down.
    pub fn begin(&mut self) -> Option<LoadRequest> {
        if self.check_torn_down() {
            return None;
        }

        let selection = *self.selection.borrow();
        self.next_seq += 1;
        let request = LoadRequest {
            seq: self.next_seq,
            selection,
            window: selection.preset.resolve(self.clock.now()),
        };

        tracing::debug!(
            seq = request.seq,
            preset = %selection.preset,
            start = %request.window.start,
            end = %request.window.end,
            "load issued"
        );
        self.machine
            .handle_event(LoadEvent::RequestIssued { seq: request.seq });
        Some(request)
    }

    /// Judge a finished load against the current selection.
    pub fn complete(
        &mut self,
        request: LoadRequest,
        result: Result<L::Output, LoadError>,
    ) -> LoadOutcome {
        if self.check_torn_down() {
            tracing::debug!(seq = request.seq, "view torn down, result ignored");
            return LoadOutcome::TornDown;
        }

        if !self.is_current(&request) {
            tracing::debug!(seq = request.seq, "stale result discarded");
            self.machine
                .handle_event(LoadEvent::RequestSuperseded { seq: request.seq });
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(output) => {
                self.output.send_replace(Some(Arc::new(output)));
                self.last_applied = Some(request.seq);
                self.last_settled = Some(request.seq);
                self.machine
                    .handle_event(LoadEvent::RequestSucceeded { seq: request.seq });
                tracing::info!(seq = request.seq, "report updated");
                LoadOutcome::Applied
            }
            // A newer load for the same selection is running or already
            // done; it decides what the user sees.
            Err(error) if request.seq < self.next_seq => {
                tracing::debug!(seq = request.seq, error = %error, "failure of older load ignored");
                self.machine
                    .handle_event(LoadEvent::RequestSuperseded { seq: request.seq });
                LoadOutcome::Superseded
            }
            Err(error) => {
                tracing::warn!(seq = request.seq, error = %error, "load failed");
                self.last_settled = Some(request.seq);
                self.notices.publish(Notice::error(
                    request.seq,
                    error.user_message(self.loader.failure_message()),
                ));
                self.machine.handle_event(LoadEvent::RequestFailed {
                    seq: request.seq,
                    error: error.to_string(),
                });
                LoadOutcome::Failed
            }
        }
    }

    /// Whether a result for `request` may still be applied: its selection
    /// is the current one and no newer load has settled, successfully or not.
    pub fn is_current(&self, request: &LoadRequest) -> bool {
        let selected = *self.selection.borrow();
        let newer_settled = self
            .last_settled
            .map_or(false, |settled| request.seq < settled);
        request.selection == selected && !newer_settled
    }

    /// Load the current selection once and apply the result.
    pub async fn refresh(&mut self) -> LoadOutcome {
        let Some(request) = self.begin() else {
            return LoadOutcome::TornDown;
        };
        let result = self.loader.load(&request).await;
        self.complete(request, result)
    }

    /// Load on every selection change until the view is torn down.
    ///
    /// Loads for earlier selections keep running; their results are judged
    /// by [`Orchestrator::complete`] as they arrive.
    pub async fn run(&mut self) {
        let mut changes = self.selection.clone();
        let mut in_flight = FuturesUnordered::new();

        if let Some(request) = self.begin() {
            in_flight.push(Self::dispatch(Arc::clone(&self.loader), request));
        }

        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        self.check_torn_down();
                        break;
                    }
                    if let Some(request) = self.begin() {
                        in_flight.push(Self::dispatch(Arc::clone(&self.loader), request));
                    }
                }
                Some((request, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.complete(request, result);
                }
            }
        }

        tracing::debug!(pending = in_flight.len(), "orchestrator stopped");
    }

    fn dispatch(
        loader: Arc<L>,
        request: LoadRequest,
    ) -> impl Future<Output = (LoadRequest, Result<L::Output, LoadError>)> {
        async move {
            let result = loader.load(&request).await;
            (request, result)
        }
    }

    fn check_torn_down(&mut self) -> bool {
        if self.machine.state().is_terminal() {
            return true;
        }
        if self.selection.has_changed().is_err() {
            tracing::info!("selection closed, tearing down");
            self.machine.handle_event(LoadEvent::TornDown);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct EchoLoader;

    #[async_trait]
    impl ReportLoader for EchoLoader {
        type Output = TimeWindow;

        fn failure_message(&self) -> &str {
            "Failed to load"
        }

        async fn load(&self, request: &LoadRequest) -> Result<TimeWindow, LoadError> {
            Ok(request.window)
        }
    }

    fn clock() -> Arc<dyn Clock> {
        let now = NaiveDate::from_ymd_opt(2024, 1, 10)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp");
        Arc::new(FixedClock(now))
    }

    #[test]
    fn begin_resolves_the_window_from_the_clock() {
        let (_tx, rx) = watch::channel(Selection::new(RangePreset::LastSevenDays));
        let (bus, _notices) = NoticeBus::new(4);
        let mut orchestrator = Orchestrator::new(EchoLoader, clock(), rx, bus);

        let first = orchestrator.begin().expect("view is open");
        let second = orchestrator.begin().expect("view is open");

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(first.window.start_day().to_string(), "2024-01-04");
        assert_eq!(first.window.end_day().to_string(), "2024-01-10");
        assert_eq!(orchestrator.state(), &LoadState::Loading { seq: 2 });
    }

    #[test]
    fn refresh_applies_the_loaded_output() {
        let (_tx, rx) = watch::channel(Selection::new(RangePreset::LastThirtyDays));
        let (bus, _notices) = NoticeBus::new(4);
        let mut orchestrator = Orchestrator::new(EchoLoader, clock(), rx, bus);

        let outcome = tokio_test::block_on(orchestrator.refresh());

        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(orchestrator.state(), &LoadState::Ready { seq: 1 });
        let window = orchestrator.output().expect("output applied");
        assert_eq!(window.day_count(), 30);
    }

    #[test]
    fn begin_after_teardown_issues_nothing() {
        let (tx, rx) = watch::channel(Selection::default());
        let (bus, _notices) = NoticeBus::new(4);
        let mut orchestrator = Orchestrator::new(EchoLoader, clock(), rx, bus);
        drop(tx);

        assert!(orchestrator.begin().is_none());
        assert_eq!(
            tokio_test::block_on(orchestrator.refresh()),
            LoadOutcome::TornDown
        );
        assert!(orchestrator.state().is_terminal());
    }
}
