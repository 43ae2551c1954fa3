// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates.

use chrono::{NaiveDate, Utc};

/// Today's calendar date in UTC.
///
/// The browser shell derives "today" from an ISO timestamp, so the server
/// uses the UTC date as well to keep both sides matching the same row.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Short axis label for a chart point, e.g. `Oct 19`.
pub fn chart_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Parse a `YYYY-MM-DD` date as submitted by a date input.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
