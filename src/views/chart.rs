// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly trend chart.
//!
//! Three lines (steps, calories, sleep) over one shared category axis of
//! dates and one shared value axis. Days without a value leave a gap; there
//! is no smoothing, aggregation or gap filling.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{DailyMetricRecord, MetricSeries};
use crate::time_utils::chart_label;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 48.0;
const Y_TICKS: usize = 4;

/// One plotted metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum ChartMetric {
    Steps,
    Calories,
    SleepHours,
}

impl ChartMetric {
    pub const ALL: [ChartMetric; 3] = [
        ChartMetric::Steps,
        ChartMetric::Calories,
        ChartMetric::SleepHours,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartMetric::Steps => "Steps",
            ChartMetric::Calories => "Calories",
            ChartMetric::SleepHours => "Sleep (hrs)",
        }
    }

    fn color(self) -> &'static str {
        match self {
            ChartMetric::Steps => "#10b981",
            ChartMetric::Calories => "#f59e0b",
            ChartMetric::SleepHours => "#3b82f6",
        }
    }

    fn value(self, point: &ChartPoint) -> Option<f64> {
        match self {
            ChartMetric::Steps => point.steps.map(|v| v as f64),
            ChartMetric::Calories => point.calories.map(|v| v as f64),
            ChartMetric::SleepHours => point.sleep_hours,
        }
    }
}

/// One day on the time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChartPoint {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    /// Axis label, e.g. `Oct 19`.
    pub label: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub steps: Option<i64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub calories: Option<i64>,
    pub sleep_hours: Option<f64>,
}

impl From<&DailyMetricRecord> for ChartPoint {
    fn from(record: &DailyMetricRecord) -> Self {
        Self {
            date: record.date,
            label: chart_label(record.date),
            steps: record.steps,
            calories: record.calories,
            sleep_hours: record.sleep_hours,
        }
    }
}

/// Chart data in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrendChart {
    pub points: Vec<ChartPoint>,
}

impl TrendChart {
    /// Build the chart, or `None` for an empty series (the chart is omitted).
    pub fn from_series(series: &MetricSeries) -> Option<Self> {
        if series.is_empty() {
            return None;
        }

        Some(Self {
            points: series.chronological().map(ChartPoint::from).collect(),
        })
    }

    /// Values of `metric` in point order, `None` where the day has no value.
    pub fn values(&self, metric: ChartMetric) -> Vec<Option<f64>> {
        self.points.iter().map(|p| metric.value(p)).collect()
    }

    /// Shared value-axis bounds. Always includes zero.
    fn value_bounds(&self) -> (f64, f64) {
        let values = ChartMetric::ALL
            .iter()
            .flat_map(|m| self.values(*m))
            .flatten();

        let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if max > min {
            (min, max)
        } else {
            (min, min + 1.0)
        }
    }

    fn x(&self, index: usize) -> f64 {
        let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        if self.points.len() <= 1 {
            return MARGIN_LEFT + plot_width / 2.0;
        }
        MARGIN_LEFT + plot_width * index as f64 / (self.points.len() - 1) as f64
    }

    fn y(value: f64, (min, max): (f64, f64)) -> f64 {
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        MARGIN_TOP + plot_height * (1.0 - (value - min) / (max - min))
    }

    /// Render as a standalone SVG document.
    ///
    /// Each data point carries a `<title>`, which browsers show as a hover
    /// tooltip.
    pub fn to_svg(&self) -> String {
        let bounds = self.value_bounds();
        let mut svg = String::with_capacity(4096);

        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" width="{WIDTH}" height="{HEIGHT}" font-family="sans-serif" font-size="11">"#
        );
        svg.push_str("<title>Weekly Trends</title>");

        // Grid and value axis
        for tick in 0..=Y_TICKS {
            let value = bounds.0 + (bounds.1 - bounds.0) * tick as f64 / Y_TICKS as f64;
            let y = Self::y(value, bounds);
            let _ = write!(
                svg,
                r##"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#e5e7eb" stroke-dasharray="3 3"/><text x="{:.1}" y="{:.1}" text-anchor="end" fill="#6b7280">{}</text>"##,
                WIDTH - MARGIN_RIGHT,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                format_value(value)
            );
        }

        // Shared time axis
        for (i, point) in self.points.iter().enumerate() {
            let _ = write!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="#6b7280">{}</text>"##,
                self.x(i),
                HEIGHT - MARGIN_BOTTOM + 16.0,
                point.label
            );
        }

        for metric in ChartMetric::ALL {
            self.render_line(&mut svg, metric, bounds);
        }

        // Legend
        for (i, metric) in ChartMetric::ALL.iter().enumerate() {
            let x = MARGIN_LEFT + i as f64 * 120.0;
            let y = HEIGHT - 12.0;
            let _ = write!(
                svg,
                r#"<rect x="{x:.1}" y="{:.1}" width="10" height="10" fill="{}"/><text x="{:.1}" y="{y:.1}">{}</text>"#,
                y - 9.0,
                metric.color(),
                x + 14.0,
                metric.name()
            );
        }

        svg.push_str("</svg>");
        svg
    }

    fn render_line(&self, svg: &mut String, metric: ChartMetric, bounds: (f64, f64)) {
        let color = metric.color();
        let values = self.values(metric);

        // Split into contiguous runs; a missing day breaks the line.
        let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut current = Vec::new();
        for (i, value) in values.iter().enumerate() {
            match value {
                Some(v) => current.push((self.x(i), Self::y(*v, bounds))),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }

        for run in runs.iter().filter(|r| r.len() > 1) {
            let points: Vec<String> = run.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="2" points="{}"/>"#,
                points.join(" ")
            );
        }

        for (i, value) in values.iter().enumerate() {
            let Some(v) = value else { continue };
            let _ = write!(
                svg,
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{color}"><title>{}: {} {}</title></circle>"#,
                self.x(i),
                Self::y(*v, bounds),
                self.points[i].label,
                format_value(*v),
                metric.name()
            );
        }
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
