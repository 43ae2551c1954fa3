// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily health metric records and the seven-day series built from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of most-recent days shown on the dashboard.
pub const SERIES_WINDOW: usize = 7;

/// Opaque user identifier issued by the auth provider (the JWT `sub`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The measured part of a daily record. Absent values stay absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricFields {
    pub calories: Option<i64>,
    pub sleep_hours: Option<f64>,
    pub steps: Option<i64>,
}

impl MetricFields {
    pub fn is_empty(&self) -> bool {
        self.calories.is_none() && self.sleep_hours.is_none() && self.steps.is_none()
    }
}

/// One user's metrics for one calendar date.
///
/// Stored in the `health_metrics` table; unique on `(user_id, date)`.
/// Absent measurements serialize as `null` so an upsert overwrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyMetricRecord {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub user_id: UserId,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub calories: Option<i64>,
    pub sleep_hours: Option<f64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub steps: Option<i64>,
}

impl DailyMetricRecord {
    pub fn new(user_id: UserId, date: NaiveDate, fields: MetricFields) -> Self {
        Self {
            user_id,
            date,
            calories: fields.calories,
            sleep_hours: fields.sleep_hours,
            steps: fields.steps,
        }
    }

    pub fn fields(&self) -> MetricFields {
        MetricFields {
            calories: self.calories,
            sleep_hours: self.sleep_hours,
            steps: self.steps,
        }
    }
}

/// Up to [`SERIES_WINDOW`] records for one user, newest first.
///
/// Rebuilt from scratch on every fetch; never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricSeries {
    records: Vec<DailyMetricRecord>,
}

impl MetricSeries {
    /// Build a series from fetched rows, enforcing date-descending order
    /// and the window size regardless of what the store returned.
    pub fn from_recent(mut records: Vec<DailyMetricRecord>) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(SERIES_WINDOW);
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Records newest first, as fetched.
    pub fn records(&self) -> &[DailyMetricRecord] {
        &self.records
    }

    /// Records oldest first, for charting.
    pub fn chronological(&self) -> impl Iterator<Item = &DailyMetricRecord> {
        self.records.iter().rev()
    }

    /// The record whose date exactly matches `today`, if any.
    pub fn today(&self, today: NaiveDate) -> Option<&DailyMetricRecord> {
        self.records.iter().find(|r| r.date == today)
    }
}

/// Published by the repository after a successful upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryChanged {
    pub user_id: UserId,
    pub date: NaiveDate,
}
