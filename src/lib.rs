// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HealthTrack: a personal health-metrics dashboard API.
//!
//! This crate serves the dashboard's browser shell. Users log daily
//! calories, sleep and steps, view a seven-day trend, and ask for AI
//! generated health tips. Identity, storage and text generation are
//! delegated to a hosted Supabase project.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod views;

use config::Config;
use services::{AuthProvider, MetricsRepository, SessionHub, TipsEndpoint};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: Arc<dyn AuthProvider>,
    pub sessions: SessionHub,
    pub repository: Arc<MetricsRepository>,
    pub tips: Arc<dyn TipsEndpoint>,
}
