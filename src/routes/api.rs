// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for signed-in users.

use crate::error::{AppError, Result};
use crate::models::{DailyMetricRecord, Session, TipExchange};
use crate::time_utils::today_utc;
use crate::views::{request_tip, DashboardResponse, DashboardView, MetricEntryForm, TipQuestion};
use super::extract::ApiJson;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use validator::Validate;

/// API routes (require a session).
/// The session guard is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/dashboard/chart.svg", get(get_chart_svg))
        .route(
            "/api/dashboard/events",
            get(super::events::dashboard_events),
        )
        .route("/api/metrics", post(submit_metrics))
        .route("/api/tips", post(get_health_tip))
}

// ─── Dashboard ───────────────────────────────────────────────

/// Current dashboard: today's tiles, the seven-day series and the chart.
///
/// A failed fetch still answers 200 with an empty dashboard and an error
/// notification.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Json<DashboardResponse> {
    let mut view = DashboardView::mount(session, state.repository.clone());
    view.load(today_utc()).await;
    Json(view.respond())
}

/// The trend chart as SVG, or 204 when there is nothing to plot.
async fn get_chart_svg(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    let mut view = DashboardView::mount(session, state.repository.clone());
    view.load(today_utc()).await;

    match view.snapshot().and_then(|s| s.chart.as_ref()) {
        Some(chart) => (
            [(header::CONTENT_TYPE, "image/svg+xml")],
            chart.to_svg(),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

// ─── Metric Entry ────────────────────────────────────────────

/// Save one day's metrics and return the refreshed dashboard.
async fn submit_metrics(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiJson(form): ApiJson<MetricEntryForm>,
) -> Result<Json<DashboardResponse>> {
    let today = today_utc();
    let mut view = DashboardView::mount(session, state.repository.clone());
    view.open_entry_form();
    view.submit_entry(&form, today).await?;
    Ok(Json(view.respond()))
}

// ─── Health Tips ─────────────────────────────────────────────

/// Today's record for the tip context. A store failure only costs the
/// context, not the tip.
async fn todays_record(state: &AppState, session: &Session) -> Option<DailyMetricRecord> {
    match state.repository.fetch_recent(session.user_id()).await {
        Ok(series) => series.today(today_utc()).cloned(),
        Err(e) => {
            tracing::warn!(
                user_id = %session.user_id(),
                error = %e,
                "Failed to load today's metrics for tip context"
            );
            None
        }
    }
}

/// Ask for an AI health tip.
///
/// Answers 204 when there is nothing to ask.
async fn get_health_tip(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<TipQuestion>,
) -> Result<Response> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let today = todays_record(&state, &session).await;
    let exchange: Option<TipExchange> =
        request_tip(state.tips.as_ref(), &body.question, today.as_ref()).await?;

    Ok(match exchange {
        Some(exchange) => Json(exchange).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
