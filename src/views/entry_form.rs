// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Metric entry form parsing.
//!
//! The form submits raw strings exactly as typed. Empty fields mean "not
//! measured" and are stored as null, never as zero. There is no range
//! validation: a negative step count goes to the store as-is.

use chrono::NaiveDate;
use serde::Deserialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::AppError;
use crate::models::{DailyMetricRecord, MetricFields, UserId};
use crate::time_utils::parse_iso_date;

/// Raw form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MetricEntryForm {
    /// `YYYY-MM-DD`; defaults to today when missing or empty.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub sleep_hours: String,
    #[serde(default)]
    pub steps: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Date {0} is in the future")]
    FutureDate(NaiveDate),
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl MetricEntryForm {
    /// Parse the submission into a record for `user_id`.
    ///
    /// `today` bounds the date from above.
    pub fn parse(&self, user_id: UserId, today: NaiveDate) -> Result<DailyMetricRecord, FormError> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(raw) => parse_iso_date(raw).ok_or_else(|| FormError::InvalidDate(raw.to_string()))?,
        };

        if date > today {
            return Err(FormError::FutureDate(date));
        }

        let fields = MetricFields {
            calories: parse_integer("calories", &self.calories)?,
            sleep_hours: parse_fractional("sleep_hours", &self.sleep_hours)?,
            steps: parse_integer("steps", &self.steps)?,
        };

        Ok(DailyMetricRecord::new(user_id, date, fields))
    }
}

/// Whole-number field. The whole text must be a finite decimal number,
/// exponent forms included (`1e3` is 1000); it is then truncated toward
/// zero. Trailing text such as `12abc` is rejected, not cut off.
fn parse_integer(field: &'static str, raw: &str) -> Result<Option<i64>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(value) = raw.parse::<i64>() {
        return Ok(Some(value));
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value.trunc() as i64)),
        _ => Err(FormError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}

fn parse_fractional(field: &'static str, raw: &str) -> Result<Option<f64>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(FormError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}
