// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side view models: dashboard, tiles, chart, entry form, tip panel.

pub mod chart;
pub mod dashboard;
pub mod entry_form;
pub mod tiles;
pub mod tip_panel;

pub use chart::TrendChart;
pub use dashboard::{DashboardResponse, DashboardSnapshot, DashboardView, ViewState};
pub use entry_form::{FormError, MetricEntryForm};
pub use tiles::{percent_of_goal, Tile};
pub use tip_panel::{request_tip, TipQuestion};
