// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase auth integration.
//!
//! Sessions are issued and refreshed by Supabase Auth directly to the
//! browser. This service only answers "is there a session for this access
//! token?" and asks the provider to revoke a session on sign-out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::models::{Session, User, UserId};

/// Audience Supabase stamps on user access tokens.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Errors from provider calls that can fail (sign-out only).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Auth provider request failed: {0}")]
    Transport(String),

    #[error("Auth provider rejected sign-out: HTTP {0}")]
    Rejected(u16),
}

/// The external auth provider as seen by this application.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the session behind `access_token`.
    ///
    /// Absence is a normal outcome, not a failure: invalid, expired or
    /// unverifiable tokens all yield `None`.
    async fn get_session(&self, access_token: &str) -> Option<Session>;

    /// Revoke `session` at the provider.
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
}

/// Claims carried by a Supabase access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (Supabase user UUID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Supabase Auth: local HS256 verification plus the `/auth/v1` REST API.
#[derive(Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    jwt_secret: Vec<u8>,
}

impl SupabaseAuth {
    pub fn new(supabase_url: &str, api_key: String, jwt_secret: Vec<u8>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            api_key,
            jwt_secret,
        }
    }

    fn verify(&self, access_token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(&self.jwt_secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

        decode::<Claims>(access_token, &key, &validation).map(|data| data.claims)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn get_session(&self, access_token: &str) -> Option<Session> {
        let claims = match self.verify(access_token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Access token rejected");
                return None;
            }
        };

        if claims.sub.is_empty() {
            return None;
        }

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)?;

        Some(Session {
            user: User {
                id: UserId::new(claims.sub),
                email: claims.email,
            },
            access_token: access_token.to_string(),
            expires_at,
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected(response.status().as_u16()));
        }

        tracing::info!(user_id = %session.user_id(), "Signed out at provider");
        Ok(())
    }
}
