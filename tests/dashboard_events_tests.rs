// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live dashboard stream tests.
//!
//! These tests verify that an open dashboard re-fetches after a write,
//! leaves on sign-out, and releases its auth listener when closed.

use axum::body::BodyDataStream;
use axum::http::StatusCode;
use futures_util::StreamExt;
use healthtrack::models::{AuthEvent, UserId};
use healthtrack::services::AuthProvider;
use serde_json::json;
use std::time::Duration;

mod common;

/// Read the next complete SSE frame (`event:`/`data:` block).
async fn next_frame(stream: &mut BodyDataStream, buffer: &mut String) -> Option<String> {
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let frame = buffer[..end].to_string();
            buffer.drain(..end + 2);
            if frame.starts_with(':') {
                continue; // keep-alive comment
            }
            return Some(frame);
        }

        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for event")?
            .ok()?;
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

fn frame_data(frame: &str) -> serde_json::Value {
    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("frame has data");
    serde_json::from_str(data).unwrap()
}

async fn open_stream(app: &common::TestApp, token: &str) -> BodyDataStream {
    let response = common::send(
        &app.router,
        common::authed_request("GET", "/api/dashboard/events", token, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    response.into_body().into_data_stream()
}

#[tokio::test]
async fn test_stream_starts_with_dashboard_and_refreshes_after_write() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("user-1");
    let mut stream = open_stream(&app, &token).await;
    let mut buffer = String::new();

    let first = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert!(first.starts_with("event: dashboard"));
    assert!(frame_data(&first)["dashboard"]["today"].is_null());

    common::send_json(
        &app.router,
        common::authed_request("POST", "/api/metrics", &token, Some(json!({ "steps": "4321" }))),
    )
    .await;

    let refreshed = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert!(refreshed.starts_with("event: dashboard"));
    assert_eq!(frame_data(&refreshed)["dashboard"]["today"]["steps"], 4321);
}

#[tokio::test]
async fn test_other_users_writes_are_not_streamed() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("user-1");
    let other = common::create_test_jwt("user-2");
    let mut stream = open_stream(&app, &token).await;
    let mut buffer = String::new();
    next_frame(&mut stream, &mut buffer).await.unwrap();

    common::send_json(
        &app.router,
        common::authed_request("POST", "/api/metrics", &other, Some(json!({ "steps": "1" }))),
    )
    .await;
    app.state
        .sessions
        .publish(AuthEvent::signed_out(UserId::from("user-1")));

    // The next thing seen is the sign-out, not a refresh for user-2's write.
    let frame = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert!(frame.starts_with("event: redirect"), "{frame}");
}

#[tokio::test]
async fn test_sign_out_redirects_and_ends_stream() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("user-1");
    let mut stream = open_stream(&app, &token).await;
    let mut buffer = String::new();
    next_frame(&mut stream, &mut buffer).await.unwrap();

    app.state
        .sessions
        .publish(AuthEvent::signed_out(UserId::from("user-1")));

    let frame = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert_eq!(frame, "event: redirect\ndata: /auth");
    assert!(next_frame(&mut stream, &mut buffer).await.is_none());
}

#[tokio::test]
async fn test_expired_session_redirects_even_without_activity() {
    let app = common::create_test_app();
    let token = common::create_test_jwt_with("user-1", 2, "authenticated");
    let mut stream = open_stream(&app, &token).await;
    let mut buffer = String::new();

    let first = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert!(first.starts_with("event: dashboard"));

    let frame = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert_eq!(frame, "event: redirect\ndata: /auth");
    assert!(next_frame(&mut stream, &mut buffer).await.is_none());
}

#[tokio::test]
async fn test_writes_after_expiry_are_not_streamed() {
    let app = common::create_test_app();
    let short = common::create_test_jwt_with("user-1", 2, "authenticated");
    let long = common::create_test_jwt("user-1");
    let mut stream = open_stream(&app, &short).await;
    let mut buffer = String::new();
    next_frame(&mut stream, &mut buffer).await.unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    common::send_json(
        &app.router,
        common::authed_request("POST", "/api/metrics", &long, Some(json!({ "steps": "777" }))),
    )
    .await;

    let frame = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert!(frame.starts_with("event: redirect"), "{frame}");
}

#[tokio::test]
async fn test_refresh_keeps_stream_alive_past_old_expiry() {
    let app = common::create_test_app();
    let short = common::create_test_jwt_with("user-1", 2, "authenticated");
    let mut stream = open_stream(&app, &short).await;
    let mut buffer = String::new();
    next_frame(&mut stream, &mut buffer).await.unwrap();

    let refreshed = app
        .state
        .auth
        .get_session(&common::create_test_jwt("user-1"))
        .await
        .unwrap();
    app.state.sessions.publish(AuthEvent::token_refreshed(refreshed));

    tokio::time::sleep(Duration::from_secs(3)).await;
    common::send_json(
        &app.router,
        common::authed_request(
            "POST",
            "/api/metrics",
            &common::create_test_jwt("user-1"),
            Some(json!({ "steps": "55" })),
        ),
    )
    .await;

    let frame = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert!(frame.starts_with("event: dashboard"), "{frame}");
    assert_eq!(frame_data(&frame)["dashboard"]["today"]["steps"], 55);
}

#[tokio::test]
async fn test_other_users_sign_in_storm_does_not_redirect() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("alice");
    let mut stream = open_stream(&app, &token).await;
    let mut buffer = String::new();
    next_frame(&mut stream, &mut buffer).await.unwrap();

    let _bob_view = app.state.sessions.subscribe(UserId::from("bob"));
    for _ in 0..100 {
        app.state
            .sessions
            .publish(AuthEvent::signed_out(UserId::from("bob")));
    }

    common::send_json(
        &app.router,
        common::authed_request("POST", "/api/metrics", &token, Some(json!({ "steps": "10" }))),
    )
    .await;

    let frame = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert!(frame.starts_with("event: dashboard"), "{frame}");
}

#[tokio::test]
async fn test_missed_events_recheck_session_before_redirecting() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("alice");
    let mut stream = open_stream(&app, &token).await;
    let mut buffer = String::new();
    next_frame(&mut stream, &mut buffer).await.unwrap();

    // Overflow alice's own channel with refreshes of a still-valid session.
    let session = app.state.auth.get_session(&token).await.unwrap();
    for _ in 0..100 {
        app.state
            .sessions
            .publish(AuthEvent::token_refreshed(session.clone()));
    }

    common::send_json(
        &app.router,
        common::authed_request("POST", "/api/metrics", &token, Some(json!({ "steps": "10" }))),
    )
    .await;

    let frame = next_frame(&mut stream, &mut buffer).await.unwrap();
    assert!(frame.starts_with("event: dashboard"), "{frame}");
}

#[tokio::test]
async fn test_closing_stream_releases_auth_listener() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("user-1");
    assert_eq!(app.state.sessions.listener_count(), 0);

    let mut stream = open_stream(&app, &token).await;
    let mut buffer = String::new();
    next_frame(&mut stream, &mut buffer).await.unwrap();
    assert_eq!(app.state.sessions.listener_count(), 1);

    drop(stream);
    assert_eq!(app.state.sessions.listener_count(), 0);
}
