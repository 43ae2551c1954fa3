//! Database layer (Supabase PostgREST, plus an in-memory store for tests
//! and local runs).

pub mod memory;
pub mod postgrest;

pub use memory::InMemoryStore;
pub use postgrest::PostgrestStore;

use crate::error::StoreError;
use crate::models::{DailyMetricRecord, UserId};
use async_trait::async_trait;

/// Table names as constants.
pub mod tables {
    /// Daily metrics, unique on `(user_id, date)`
    pub const HEALTH_METRICS: &str = "health_metrics";
}

/// Remote storage for daily metric records.
///
/// Implementations keep no cache: every call is a fresh round trip.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Up to seven most-recent records for `user_id`, newest first.
    async fn fetch_recent(&self, user_id: &UserId) -> Result<Vec<DailyMetricRecord>, StoreError>;

    /// Insert or replace the record keyed on `(user_id, date)`.
    async fn upsert(&self, record: &DailyMetricRecord) -> Result<(), StoreError>;
}
