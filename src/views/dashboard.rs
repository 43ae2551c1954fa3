// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard view orchestration.
//!
//! `Loading` until the first fetch resolves, then `Ready` whether or not the
//! fetch succeeded. Signing out (or losing the session) moves to `Left`,
//! which is terminal. After a successful write the view re-fetches in
//! reaction to the repository's change event rather than patching its
//! snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::chart::TrendChart;
use super::entry_form::MetricEntryForm;
use super::tiles::{summary_tiles, Tile};
use crate::error::{AppError, AUTH_ROUTE};
use crate::models::{
    AuthEvent, AuthEventKind, DailyMetricRecord, MetricSeries, Notification, RepositoryChanged,
    Session, User,
};
use crate::services::MetricsRepository;

/// Everything the dashboard renders once data is in.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Record for today's date, if one exists in the series.
    pub today: Option<DailyMetricRecord>,
    pub tiles: Vec<Tile>,
    /// Newest first, as fetched.
    pub series: MetricSeries,
    /// Omitted when the series is empty.
    pub chart: Option<TrendChart>,
}

impl DashboardSnapshot {
    pub fn build(series: MetricSeries, today: NaiveDate) -> Self {
        let today = series.today(today).cloned();
        Self {
            tiles: summary_tiles(today.as_ref()),
            chart: TrendChart::from_series(&series),
            today,
            series,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewState {
    Loading,
    Ready(DashboardSnapshot),
    Left,
}

/// Serialized dashboard, as returned by the API.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: User,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<DashboardSnapshot>,
    pub entry_form_open: bool,
    pub notifications: Vec<Notification>,
}

/// One mounted dashboard for one signed-in user.
pub struct DashboardView {
    session: Session,
    repository: Arc<MetricsRepository>,
    changes: broadcast::Receiver<RepositoryChanged>,
    state: ViewState,
    entry_form_open: bool,
    notifications: Vec<Notification>,
}

impl DashboardView {
    /// Mount the view. Starts in `Loading`; call [`DashboardView::load`].
    pub fn mount(session: Session, repository: Arc<MetricsRepository>) -> Self {
        let changes = repository.subscribe();
        Self {
            session,
            repository,
            changes,
            state: ViewState::Loading,
            entry_form_open: false,
            notifications: Vec::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        match &self.state {
            ViewState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn is_entry_form_open(&self) -> bool {
        self.entry_form_open
    }

    pub fn open_entry_form(&mut self) {
        self.entry_form_open = true;
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// The session the view is currently running under.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch the series and move to `Ready`.
    ///
    /// A failed fetch still lands in `Ready`, with an empty series and one
    /// error notification.
    pub async fn load(&mut self, today: NaiveDate) {
        if matches!(self.state, ViewState::Left) {
            return;
        }

        let user_id = self.session.user_id();
        let snapshot = match self.repository.fetch_recent(user_id).await {
            Ok(series) => DashboardSnapshot::build(series, today),
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "Failed to load metrics");
                self.notifications
                    .push(AppError::LoadMetrics(err).notification());
                DashboardSnapshot::build(MetricSeries::empty(), today)
            }
        };

        self.state = ViewState::Ready(snapshot);
    }

    /// Submit the entry form.
    ///
    /// On success the form closes and the view re-fetches. On failure the
    /// previous snapshot stays and an error notification is added.
    pub async fn submit_entry(
        &mut self,
        form: &MetricEntryForm,
        today: NaiveDate,
    ) -> Result<(), AppError> {
        let record = match form.parse(self.session.user_id().clone(), today) {
            Ok(record) => record,
            Err(err) => {
                let err = AppError::from(err);
                self.notifications.push(err.notification());
                return Err(err);
            }
        };

        if let Err(err) = self.repository.upsert(&record).await {
            tracing::warn!(
                user_id = %record.user_id,
                date = %record.date,
                error = %err,
                "Failed to save metrics"
            );
            let err = AppError::SaveMetrics(err);
            self.notifications.push(err.notification());
            return Err(err);
        }

        self.notifications
            .push(Notification::success("Health metrics saved successfully"));
        self.entry_form_open = false;
        self.apply_pending_changes(today).await;
        Ok(())
    }

    /// Re-fetch if the repository changed for this user since the last
    /// check. Returns whether a re-fetch happened.
    pub async fn apply_pending_changes(&mut self, today: NaiveDate) -> bool {
        let mut changed = false;
        loop {
            match self.changes.try_recv() {
                Ok(change) if &change.user_id == self.session.user_id() => changed = true,
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(_)) => changed = true,
                Err(_) => break,
            }
        }

        if changed {
            self.load(today).await;
        }
        changed
    }

    /// Wait until the repository changes for this user.
    ///
    /// Returns `false` once the repository is gone.
    pub async fn changed(&mut self) -> bool {
        loop {
            match self.changes.recv().await {
                Ok(change) if &change.user_id == self.session.user_id() => return true,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => return true,
                Err(broadcast::error::RecvError::Closed) => return false,
            }
        }
    }

    /// React to a session change. Returns the route to navigate to when the
    /// session is gone.
    pub fn on_auth_event(&mut self, event: &AuthEvent) -> Option<&'static str> {
        if &event.user_id != self.session.user_id() {
            return None;
        }

        match (&event.session, event.kind) {
            (Some(session), AuthEventKind::TokenRefreshed | AuthEventKind::SignedIn) => {
                self.session = session.clone();
                None
            }
            _ => Some(self.leave()),
        }
    }

    /// Leave if the held session has expired by `now`.
    pub fn check_expiry(&mut self, now: DateTime<Utc>) -> Option<&'static str> {
        if self.session.expires_at > now {
            return None;
        }
        tracing::info!(user_id = %self.session.user_id(), "Session expired");
        Some(self.leave())
    }

    /// Explicit sign-out from this view.
    pub fn sign_out(&mut self) -> &'static str {
        self.leave()
    }

    fn leave(&mut self) -> &'static str {
        tracing::debug!(user_id = %self.session.user_id(), "Dashboard left");
        self.state = ViewState::Left;
        AUTH_ROUTE
    }

    /// Serialize the current state, draining pending notifications.
    pub fn respond(&mut self) -> DashboardResponse {
        let (state, dashboard) = match &self.state {
            ViewState::Loading => ("loading", None),
            ViewState::Ready(snapshot) => ("ready", Some(snapshot.clone())),
            ViewState::Left => ("left", None),
        };

        DashboardResponse {
            user: self.session.user.clone(),
            state,
            dashboard,
            entry_form_open: self.entry_form_open,
            notifications: std::mem::take(&mut self.notifications),
        }
    }
}
