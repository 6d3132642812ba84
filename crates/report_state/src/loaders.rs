//! Loaders turn a tagged request into a finished report.
//!
//! A loader performs every request its report needs and aggregates only once
//! all of them have succeeded; a single failing request fails the whole load.

use std::sync::Arc;

use admin_client::{AdminApi, ClientError, EntitySource};
use async_trait::async_trait;
use chrono::TimeZone;
use report_core::{
    build_dashboard, call_log_series, into_records, CallLogSeries, DashboardReport,
    DashboardSources,
};
use serde_json::Value;
use thiserror::Error;

use crate::orchestrator::LoadRequest;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load {what}: {error}")]
    Fetch {
        what: &'static str,
        #[source]
        error: ClientError,
    },
}

impl LoadError {
    /// The server's own message when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Fetch { error, .. } => error
                .server_message()
                .unwrap_or(fallback)
                .to_string(),
        }
    }
}

#[async_trait]
pub trait ReportLoader: Send + Sync {
    type Output: Send + Sync + 'static;

    /// Notice text for a failed load when the server gave no message.
    fn failure_message(&self) -> &str;

    async fn load(&self, request: &LoadRequest) -> Result<Self::Output, LoadError>;
}

/// Loads the five entity lists behind the dashboard.
pub struct DashboardLoader<Tz> {
    api: Arc<dyn AdminApi>,
    tz: Tz,
}

impl<Tz: TimeZone> DashboardLoader<Tz> {
    pub fn new(api: Arc<dyn AdminApi>, tz: Tz) -> Self {
        Self { api, tz }
    }
}

#[async_trait]
impl<Tz> ReportLoader for DashboardLoader<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    type Output = DashboardReport;

    fn failure_message(&self) -> &str {
        "Failed to load dashboard data"
    }

    async fn load(&self, request: &LoadRequest) -> Result<DashboardReport, LoadError> {
        let api = self.api.as_ref();
        let fetch = |source: EntitySource| async move {
            let payload = api
                .fetch_entities(source)
                .await
                .map_err(|error| LoadError::Fetch {
                    what: source.plural(),
                    error,
                })?;
            Ok::<Vec<Value>, LoadError>(into_records(payload, source.envelope_keys()))
        };

        let (orders, users, brands, models, problems) = tokio::try_join!(
            fetch(EntitySource::Orders),
            fetch(EntitySource::Users),
            fetch(EntitySource::Brands),
            fetch(EntitySource::Models),
            fetch(EntitySource::Problems),
        )?;

        tracing::debug!(
            seq = request.seq,
            orders = orders.len(),
            users = users.len(),
            "dashboard sources joined"
        );

        let sources = DashboardSources {
            orders,
            users,
            brands,
            models,
            problems,
        };
        Ok(build_dashboard(&sources, &request.window, &self.tz))
    }
}

/// Loads the server-side daily call-log report.
pub struct CallLogReportLoader<Tz> {
    api: Arc<dyn AdminApi>,
    tz: Tz,
}

impl<Tz: TimeZone> CallLogReportLoader<Tz> {
    pub fn new(api: Arc<dyn AdminApi>, tz: Tz) -> Self {
        Self { api, tz }
    }
}

#[async_trait]
impl<Tz> ReportLoader for CallLogReportLoader<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    type Output = CallLogSeries;

    fn failure_message(&self) -> &str {
        "Failed to load call log report"
    }

    async fn load(&self, request: &LoadRequest) -> Result<CallLogSeries, LoadError> {
        let selection = request.selection;
        let report = self
            .api
            .fetch_daily_report(selection.preset, selection.service_id)
            .await
            .map_err(|error| LoadError::Fetch {
                what: "call log report",
                error,
            })?;

        tracing::debug!(seq = request.seq, items = report.items.len(), "call log report received");
        Ok(call_log_series(&report, &request.window, &self.tz))
    }
}
