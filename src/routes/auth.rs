// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes.
//!
//! The browser signs in against Supabase Auth directly and hands the access
//! token over here. These routes only turn that token into a session cookie,
//! announce session changes to live dashboards, and sign out.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Redirect,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result, AUTH_ROUTE};
use crate::middleware::auth::{extract_access_token, SESSION_COOKIE};
use crate::models::{AuthEvent, Session, User};
use super::extract::ApiJson;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", post(create_session))
        .route("/auth/refresh", post(refresh_session))
        .route("/auth/logout", post(logout))
}

/// Token handed over by the browser after a provider sign-in or refresh.
#[derive(Deserialize)]
pub struct SessionRequest {
    access_token: String,
}

/// Session cookie carrying `session`'s token until it expires.
fn session_cookie(session: &Session, secure: bool) -> Cookie<'static> {
    let remaining = (session.expires_at - Utc::now()).num_seconds().max(0);

    Cookie::build((SESSION_COOKIE, session.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(remaining))
        .build()
}

/// Removal cookie; attributes must match the ones the cookie was set with.
fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

async fn resolve(state: &AppState, access_token: &str) -> Result<Session> {
    state
        .auth
        .get_session(access_token)
        .await
        .ok_or(AppError::Unauthorized)
}

/// Sign-in: verify the token and set the session cookie.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(body): ApiJson<SessionRequest>,
) -> Result<(CookieJar, Json<User>)> {
    let session = resolve(&state, &body.access_token).await?;
    tracing::info!(user_id = %session.user_id(), "Session established");

    let jar = jar.add(session_cookie(&session, state.config.secure_cookies()));
    let user = session.user.clone();
    state.sessions.publish(AuthEvent::signed_in(session));

    Ok((jar, Json(user)))
}

/// Token refresh: replace the cookie and tell live views about the new
/// session.
async fn refresh_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(body): ApiJson<SessionRequest>,
) -> Result<(CookieJar, Json<User>)> {
    let session = resolve(&state, &body.access_token).await?;
    tracing::debug!(user_id = %session.user_id(), "Session refreshed");

    let jar = jar.add(session_cookie(&session, state.config.secure_cookies()));
    let user = session.user.clone();
    state.sessions.publish(AuthEvent::token_refreshed(session));

    Ok((jar, Json(user)))
}

/// Sign-out: revoke at the provider, clear the cookie and send the browser
/// to the auth view.
///
/// Provider failures are logged; the local sign-out still happens.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Redirect) {
    if let Some(token) = extract_access_token(&jar, &headers) {
        if let Some(session) = state.auth.get_session(&token).await {
            if let Err(e) = state.auth.sign_out(&session).await {
                tracing::warn!(
                    user_id = %session.user_id(),
                    error = %e,
                    "Provider sign-out failed"
                );
            }
            tracing::info!(user_id = %session.user_id(), "Signed out");
            state
                .sessions
                .publish(AuthEvent::signed_out(session.user.id.clone()));
        }
    }

    let jar = jar.remove(removal_cookie(state.config.secure_cookies()));
    let target = format!("{}{}", state.config.frontend_url, AUTH_ROUTE);

    (jar, Redirect::to(&target))
}
