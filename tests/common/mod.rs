// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use healthtrack::config::Config;
use healthtrack::db::InMemoryStore;
use healthtrack::error::EndpointError;
use healthtrack::models::TipPrompt;
use healthtrack::routes::create_router;
use healthtrack::services::{MetricsRepository, SessionHub, SupabaseAuth, TipsEndpoint};
use healthtrack::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

/// Tip endpoint double: records prompts and answers with a canned tip or a
/// configured failure.
#[derive(Default)]
pub struct StubTips {
    pub prompts: Mutex<Vec<(String, TipPrompt)>>,
    pub failure: Mutex<Option<(u16, String)>>,
}

#[allow(dead_code)]
impl StubTips {
    pub fn fail_with(&self, status: u16, message: &str) {
        *self.failure.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, TipPrompt)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TipsEndpoint for StubTips {
    async fn invoke(&self, function: &str, prompt: &TipPrompt) -> Result<String, EndpointError> {
        self.prompts
            .lock()
            .unwrap()
            .push((function.to_string(), prompt.clone()));

        if let Some((status, message)) = self.failure.lock().unwrap().clone() {
            return Err(EndpointError::Status { status, message });
        }
        Ok("Drink more water.\nWalk after meals.".to_string())
    }
}

/// A router over in-memory collaborators, plus handles to drive them.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<InMemoryStore>,
    pub tips: Arc<StubTips>,
}

/// Create a test app with offline dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let tips = Arc::new(StubTips::default());
    let auth = Arc::new(SupabaseAuth::new(
        &config.supabase_url,
        config.supabase_service_key.clone(),
        config.supabase_jwt_secret.clone(),
    ));

    let state = Arc::new(AppState {
        config,
        auth,
        sessions: SessionHub::new(),
        repository: Arc::new(MetricsRepository::new(store.clone())),
        tips: tips.clone(),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        tips,
    }
}

/// Create a Supabase-style access token signed with the test secret.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    create_test_jwt_with(user_id, 3600, "authenticated")
}

#[allow(dead_code)]
pub fn create_test_jwt_with(user_id: &str, expires_in: i64, audience: &str) -> String {
    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: i64,
        iat: i64,
        aud: &'a str,
        email: String,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        exp: now + expires_in,
        iat: now,
        aud: audience,
        email: format!("{user_id}@example.com"),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&Config::test_default().supabase_jwt_secret),
    )
    .unwrap()
}

/// Authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and return the response.
#[allow(dead_code)]
pub async fn send(router: &axum::Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

/// Send a request and decode the JSON body.
#[allow(dead_code)]
pub async fn send_json(router: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = send(router, request).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
