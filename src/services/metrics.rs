// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Metrics repository: store access plus change notification.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::db::MetricsStore;
use crate::error::StoreError;
use crate::models::{DailyMetricRecord, MetricSeries, RepositoryChanged, UserId};

const CHANGE_CAPACITY: usize = 64;

/// Reads and writes daily metrics, announcing every successful write.
///
/// No cache: each read is a fresh round trip to the store. Concurrent
/// writes for the same `(user, date)` are not serialized here; the store
/// applies last-write-wins.
pub struct MetricsRepository {
    store: Arc<dyn MetricsStore>,
    changes: broadcast::Sender<RepositoryChanged>,
}

impl MetricsRepository {
    pub fn new(store: Arc<dyn MetricsStore>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self { store, changes }
    }

    /// The seven most recent records for `user_id`, newest first.
    pub async fn fetch_recent(&self, user_id: &UserId) -> Result<MetricSeries, StoreError> {
        let rows = self.store.fetch_recent(user_id).await?;
        Ok(MetricSeries::from_recent(rows))
    }

    /// Insert or replace one day's record, then publish [`RepositoryChanged`].
    pub async fn upsert(&self, record: &DailyMetricRecord) -> Result<(), StoreError> {
        self.store.upsert(record).await?;

        let _ = self.changes.send(RepositoryChanged {
            user_id: record.user_id.clone(),
            date: record.date,
        });
        Ok(())
    }

    /// Listen for successful writes (all users).
    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryChanged> {
        self.changes.subscribe()
    }
}
