// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Today's summary tiles.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::DailyMetricRecord;

/// Daily calorie goal (kcal).
pub const CALORIE_GOAL: f64 = 2000.0;
/// Daily sleep goal (hours).
pub const SLEEP_GOAL_HOURS: f64 = 8.0;
/// Daily step goal.
pub const STEP_GOAL: f64 = 10000.0;

/// Progress toward `goal` as a percentage in `[0, 100]`.
pub fn percent_of_goal(value: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    let percent = value / goal * 100.0;
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// One read-only summary tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Tile {
    pub title: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub goal: f64,
    /// Width of the progress bar, `0..=100`.
    pub percent: f64,
    /// Rounded for display, e.g. `"63%"`.
    pub percent_label: String,
}

impl Tile {
    fn new(title: &'static str, value: f64, unit: &'static str, goal: f64) -> Self {
        let percent = percent_of_goal(value, goal);
        Self {
            title,
            value,
            unit,
            goal,
            percent,
            percent_label: format!("{:.0}%", percent),
        }
    }
}

/// Calories, sleep and steps tiles for today. Missing values show as 0.
pub fn summary_tiles(today: Option<&DailyMetricRecord>) -> Vec<Tile> {
    let calories = today.and_then(|r| r.calories).unwrap_or(0) as f64;
    let sleep = today.and_then(|r| r.sleep_hours).unwrap_or(0.0);
    let steps = today.and_then(|r| r.steps).unwrap_or(0) as f64;

    vec![
        Tile::new("Calories", calories, "kcal", CALORIE_GOAL),
        Tile::new("Sleep", sleep, "hrs", SLEEP_GOAL_HOURS),
        Tile::new("Steps", steps, "", STEP_GOAL),
    ]
}
