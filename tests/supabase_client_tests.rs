// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase HTTP client tests against a mock server.
//!
//! These tests pin down the wire contract with PostgREST, Supabase Auth and
//! the `health-tips` edge function.

use chrono::{NaiveDate, Utc};
use healthtrack::db::{MetricsStore, PostgrestStore};
use healthtrack::error::{EndpointError, StoreError};
use healthtrack::models::{DailyMetricRecord, MetricFields, Session, TipPrompt, User, UserId};
use healthtrack::services::{AuthError, AuthProvider, EdgeFunctionTips, SupabaseAuth, TipsEndpoint};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE_KEY: &str = "service-role-key";

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

#[tokio::test]
async fn test_fetch_recent_queries_owned_rows_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/health_metrics"))
        .and(query_param("user_id", "eq.user-1"))
        .and(query_param("order", "date.desc"))
        .and(query_param("limit", "7"))
        .and(header("apikey", SERVICE_KEY))
        .and(header("authorization", format!("Bearer {SERVICE_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "user_id": "user-1", "date": "2026-10-18", "calories": 1900, "sleep_hours": null, "steps": 7000 },
            { "user_id": "user-1", "date": "2026-10-19", "calories": null, "sleep_hours": 7.5, "steps": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = PostgrestStore::new(&server.uri(), SERVICE_KEY.to_string());
    let rows = store.fetch_recent(&UserId::from("user-1")).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, date(19));
    assert_eq!(rows[0].sleep_hours, Some(7.5));
    assert_eq!(rows[0].calories, None);
    assert_eq!(rows[1].steps, Some(7000));
}

#[tokio::test]
async fn test_upsert_merges_on_user_and_date() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/health_metrics"))
        .and(query_param("on_conflict", "user_id,date"))
        .and(header("prefer", "resolution=merge-duplicates,return=minimal"))
        .and(body_json(json!({
            "user_id": "user-1",
            "date": "2026-10-19",
            "calories": 2500,
            "sleep_hours": null,
            "steps": 12000
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = PostgrestStore::new(&server.uri(), SERVICE_KEY.to_string());
    let record = DailyMetricRecord::new(
        UserId::from("user-1"),
        date(19),
        MetricFields {
            calories: Some(2500),
            sleep_hours: None,
            steps: Some(12000),
        },
    );

    store.upsert(&record).await.unwrap();
}

#[tokio::test]
async fn test_store_rejection_carries_postgrest_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/health_metrics"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "42501",
            "message": "new row violates row-level security policy"
        })))
        .mount(&server)
        .await;

    let store = PostgrestStore::new(&server.uri(), SERVICE_KEY.to_string());
    let record = DailyMetricRecord::new(UserId::from("user-1"), date(19), MetricFields::default());

    match store.upsert(&record).await {
        Err(StoreError::Rejected { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "new row violates row-level security policy");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_store_is_transport_error() {
    let store = PostgrestStore::new("http://127.0.0.1:9", SERVICE_KEY.to_string());
    let err = store.fetch_recent(&UserId::from("user-1")).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}

#[tokio::test]
async fn test_edge_function_returns_tip_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/health-tips"))
        .and(body_json(json!({
            "question": "How can I sleep better?",
            "context": ""
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "tip": "Keep a regular bedtime.\nAvoid screens late." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tips = EdgeFunctionTips::new(&server.uri(), SERVICE_KEY.to_string());
    let prompt = TipPrompt {
        question: "How can I sleep better?".to_string(),
        context: String::new(),
    };

    let text = tips.invoke("health-tips", &prompt).await.unwrap();
    assert_eq!(text, "Keep a regular bedtime.\nAvoid screens late.");
}

#[tokio::test]
async fn test_edge_function_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/health-tips"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Upstream model timeout" })))
        .mount(&server)
        .await;

    let tips = EdgeFunctionTips::new(&server.uri(), SERVICE_KEY.to_string());
    let prompt = TipPrompt {
        question: "Any tip?".to_string(),
        context: String::new(),
    };

    let err = tips.invoke("health-tips", &prompt).await.unwrap_err();
    assert_eq!(err.user_message(), "Upstream model timeout");
    assert!(matches!(err, EndpointError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_edge_function_unexpected_reply_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/health-tips"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let tips = EdgeFunctionTips::new(&server.uri(), SERVICE_KEY.to_string());
    let prompt = TipPrompt {
        question: "Any tip?".to_string(),
        context: String::new(),
    };

    let err = tips.invoke("health-tips", &prompt).await.unwrap_err();
    assert!(matches!(err, EndpointError::Decode(_)));
    assert_eq!(err.user_message(), EndpointError::DEFAULT_MESSAGE);
}

fn session() -> Session {
    Session {
        user: User {
            id: UserId::from("user-1"),
            email: None,
        },
        access_token: "user-access-token".to_string(),
        expires_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_sign_out_revokes_with_user_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer user-access-token"))
        .and(header("apikey", SERVICE_KEY))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let auth = SupabaseAuth::new(&server.uri(), SERVICE_KEY.to_string(), b"secret".to_vec());
    auth.sign_out(&session()).await.unwrap();
}

#[tokio::test]
async fn test_sign_out_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let auth = SupabaseAuth::new(&server.uri(), SERVICE_KEY.to_string(), b"secret".to_vec());
    let err = auth.sign_out(&session()).await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected(401)));
}
