// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use healthtrack::error::{AppError, EndpointError, StoreError};
use healthtrack::models::Severity;

async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_every_error_maps_to_one_destructive_notification() {
    let errors = [
        AppError::Unauthorized,
        AppError::BadRequest("steps must be a number".to_string()),
        AppError::LoadMetrics(StoreError::Transport("down".to_string())),
        AppError::SaveMetrics(StoreError::Decode("bad".to_string())),
        AppError::HealthTip(EndpointError::Transport("down".to_string())),
        AppError::Internal(anyhow::anyhow!("boom")),
    ];

    for err in errors {
        let notification = err.notification();
        assert_eq!(notification.title, "Error");
        assert_eq!(notification.severity, Severity::Destructive);
        assert!(!notification.description.is_empty());
    }
}

#[test]
fn test_store_details_are_not_shown_to_users() {
    let err = AppError::SaveMetrics(StoreError::Rejected {
        status: 500,
        message: "duplicate key value violates unique constraint".to_string(),
    });
    assert_eq!(
        err.notification().description,
        "Failed to save metrics. Please try again."
    );
}

#[tokio::test]
async fn test_unauthorized_response_points_at_auth_view() {
    let (status, body) = body_json(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/auth");
}

#[tokio::test]
async fn test_upstream_failures_are_bad_gateway() {
    let (status, body) = body_json(AppError::LoadMetrics(StoreError::Transport(
        "connection refused".to_string(),
    )))
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "store_error");
    assert!(body.get("redirect").is_none());
    assert!(!body.to_string().contains("connection refused"));

    let (status, body) = body_json(AppError::HealthTip(EndpointError::Status {
        status: 429,
        message: "Rate limited, try later".to_string(),
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["notification"]["description"], "Rate limited, try later");
}

#[tokio::test]
async fn test_internal_error_hides_cause() {
    let (status, body) = body_json(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("secret detail"));
}
