// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory metrics store.
//!
//! Mirrors the hosted table's contract: one row per `(user_id, date)`,
//! last upsert wins, reads scoped to the owning user.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::MetricsStore;
use crate::error::StoreError;
use crate::models::metrics::SERIES_WINDOW;
use crate::models::{DailyMetricRecord, UserId};

#[derive(Default)]
pub struct InMemoryStore {
    rows: DashMap<(UserId, NaiveDate), DailyMetricRecord>,
    offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored rows across all users.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsStore for InMemoryStore {
    async fn fetch_recent(&self, user_id: &UserId) -> Result<Vec<DailyMetricRecord>, StoreError> {
        self.check_online()?;

        let mut records: Vec<DailyMetricRecord> = self
            .rows
            .iter()
            .filter(|entry| &entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(SERIES_WINDOW);
        Ok(records)
    }

    async fn upsert(&self, record: &DailyMetricRecord) -> Result<(), StoreError> {
        self.check_online()?;

        self.rows
            .insert((record.user_id.clone(), record.date), record.clone());
        Ok(())
    }
}
