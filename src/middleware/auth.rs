// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session guard middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie holding the Supabase access token.
pub const SESSION_COOKIE: &str = "healthtrack_session";

/// Access token from the session cookie, falling back to a bearer header.
pub fn extract_access_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Middleware that requires a live session.
///
/// The resolved [`crate::models::Session`] is placed in request extensions.
/// Without one the request is answered with 401 and a redirect hint to the
/// auth view.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_access_token(&jar, request.headers()).ok_or(AppError::Unauthorized)?;

    let session = state
        .auth
        .get_session(&token)
        .await
        .ok_or(AppError::Unauthorized)?;

    tracing::debug!(user_id = %session.user_id(), "Session resolved");
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
