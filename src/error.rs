// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure that reaches a handler is converted into one user-visible
//! notification. Nothing here is retried and nothing is fatal.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::Notification;

/// Route the browser shell shows when there is no session.
pub const AUTH_ROUTE: &str = "/auth";

/// Failure talking to the hosted relational store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Transport(String),

    #[error("Store rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected store response: {0}")]
    Decode(String),
}

/// Failure invoking the hosted text-generation function.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Edge function request failed: {0}")]
    Transport(String),

    #[error("Edge function returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected edge function response: {0}")]
    Decode(String),
}

impl EndpointError {
    pub const DEFAULT_MESSAGE: &'static str = "Failed to get health tip. Please try again.";

    /// Message suitable for a toast: the function's own error text when it
    /// sent one, otherwise a generic retry hint.
    pub fn user_message(&self) -> String {
        match self {
            EndpointError::Status { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => Self::DEFAULT_MESSAGE.to_string(),
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Failed to load metrics: {0}")]
    LoadMetrics(#[source] StoreError),

    #[error("Failed to save metrics: {0}")]
    SaveMetrics(#[source] StoreError),

    #[error("Health tip failed: {0}")]
    HealthTip(#[from] EndpointError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The toast shown for this error.
    pub fn notification(&self) -> Notification {
        match self {
            AppError::Unauthorized => Notification::error("Please sign in to continue"),
            AppError::BadRequest(msg) => Notification::error(msg.clone()),
            AppError::LoadMetrics(_) => Notification::error("Failed to load health metrics"),
            AppError::SaveMetrics(_) => {
                Notification::error("Failed to save metrics. Please try again.")
            }
            AppError::HealthTip(err) => Notification::error(err.user_message()),
            AppError::Internal(_) => Notification::error("Something went wrong. Please try again."),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
    notification: Notification,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::LoadMetrics(err) | AppError::SaveMetrics(err) => {
                tracing::error!(error = %err, "Store error");
                (StatusCode::BAD_GATEWAY, "store_error", None)
            }
            AppError::HealthTip(err) => {
                tracing::error!(error = %err, "Health tip endpoint error");
                (StatusCode::BAD_GATEWAY, "endpoint_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let redirect = matches!(self, AppError::Unauthorized).then_some(AUTH_ROUTE);

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            redirect,
            notification: self.notification(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
