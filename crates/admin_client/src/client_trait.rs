use async_trait::async_trait;
use report_core::{DailyReport, RangePreset};
use serde_json::Value;

use crate::error::ClientResult;
use crate::sources::EntitySource;

#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Raw payload of an entity list, in whatever envelope the server uses.
    async fn fetch_entities(&self, source: EntitySource) -> ClientResult<Value>;

    async fn fetch_daily_report(
        &self,
        preset: RangePreset,
        service_id: Option<u64>,
    ) -> ClientResult<DailyReport>;
}
