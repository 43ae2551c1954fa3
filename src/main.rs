// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HealthTrack API Server
//!
//! Serves the personal health dashboard: daily metric entry, today's goal
//! tiles, a seven-day trend chart and AI health tips, backed by Supabase.

use healthtrack::{
    config::Config,
    db::PostgrestStore,
    services::{EdgeFunctionTips, MetricsRepository, SessionHub, SupabaseAuth},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        supabase_url = %config.supabase_url,
        "Starting HealthTrack API"
    );

    let auth = Arc::new(SupabaseAuth::new(
        &config.supabase_url,
        config.supabase_service_key.clone(),
        config.supabase_jwt_secret.clone(),
    ));

    let store = Arc::new(PostgrestStore::new(
        &config.supabase_url,
        config.supabase_service_key.clone(),
    ));
    let repository = Arc::new(MetricsRepository::new(store));
    tracing::info!("Metrics repository initialized");

    let tips = Arc::new(EdgeFunctionTips::new(
        &config.supabase_url,
        config.supabase_service_key.clone(),
    ));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        auth,
        sessions: SessionHub::new(),
        repository,
        tips,
    });

    // Build router
    let app = healthtrack::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("healthtrack=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
