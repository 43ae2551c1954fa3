// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live dashboard over server-sent events.
//!
//! One stream is one mounted dashboard. It sends a `dashboard` event on
//! connect and again after every write for the user, and a final `redirect`
//! event when the session ends: signed out, or simply expired. The auth
//! listener lives exactly as long as the stream, so a closed tab releases it.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use chrono::Utc;
use futures_util::stream::{self, Stream};
use std::sync::Arc;
use tokio::time::{sleep_until, Instant};

use crate::models::Session;
use crate::services::{AuthChange, AuthProvider, AuthSubscription};
use crate::time_utils::today_utc;
use crate::views::DashboardView;
use crate::AppState;

struct LiveDashboard {
    view: DashboardView,
    auth: AuthSubscription,
    provider: Arc<dyn AuthProvider>,
    started: bool,
    finished: bool,
}

enum Wake {
    Auth(Option<AuthChange>),
    Changed(bool),
    Expired,
}

fn dashboard_event(view: &mut DashboardView) -> Result<Event, axum::Error> {
    Event::default().event("dashboard").json_data(view.respond())
}

fn redirect_event(route: &'static str) -> Result<Event, axum::Error> {
    Ok(Event::default().event("redirect").data(route))
}

/// Monotonic deadline for the held session's expiry.
fn expiry_deadline(session: &Session) -> Instant {
    let remaining = (session.expires_at - Utc::now()).to_std().unwrap_or_default();
    Instant::now() + remaining
}

impl LiveDashboard {
    fn redirect(mut self, route: &'static str) -> Option<(Result<Event, axum::Error>, Self)> {
        self.finished = true;
        Some((redirect_event(route), self))
    }

    async fn step(mut self) -> Option<(Result<Event, axum::Error>, Self)> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            self.view.load(today_utc()).await;
            let event = dashboard_event(&mut self.view);
            return Some((event, self));
        }

        loop {
            // Re-derived each pass so a refreshed session moves the deadline.
            let deadline = expiry_deadline(self.view.session());

            // Session changes first, then expiry, then data: a refresh must
            // land before the old deadline is judged, and no data goes out
            // after the deadline.
            let wake = tokio::select! {
                biased;
                change = self.auth.next() => Wake::Auth(change),
                _ = sleep_until(deadline) => Wake::Expired,
                changed = self.view.changed() => Wake::Changed(changed),
            };

            match wake {
                Wake::Auth(Some(AuthChange::Event(event))) => {
                    if let Some(route) = self.view.on_auth_event(&event) {
                        return self.redirect(route);
                    }
                }
                Wake::Auth(Some(AuthChange::Missed(_))) => {
                    // Missed events may have included a sign-out; ask the
                    // provider whether the held session still stands.
                    let token = self.view.session().access_token.clone();
                    if self.provider.get_session(&token).await.is_none() {
                        let route = self.view.sign_out();
                        return self.redirect(route);
                    }
                }
                Wake::Expired => {
                    if let Some(route) = self.view.check_expiry(Utc::now()) {
                        return self.redirect(route);
                    }
                }
                Wake::Auth(None) | Wake::Changed(false) => return None,
                Wake::Changed(true) => {
                    if let Some(route) = self.view.check_expiry(Utc::now()) {
                        return self.redirect(route);
                    }
                    self.view.load(today_utc()).await;
                    let event = dashboard_event(&mut self.view);
                    return Some((event, self));
                }
            }
        }
    }
}

/// Stream dashboard updates for the signed-in user.
pub async fn dashboard_events(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    tracing::debug!(user_id = %session.user_id(), "Dashboard stream opened");

    let live = LiveDashboard {
        auth: state.sessions.subscribe(session.user_id().clone()),
        view: DashboardView::mount(session, state.repository.clone()),
        provider: state.auth.clone(),
        started: false,
        finished: false,
    };

    Sse::new(stream::unfold(live, LiveDashboard::step)).keep_alive(KeepAlive::default())
}
