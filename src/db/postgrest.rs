// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase PostgREST client with typed operations on `health_metrics`.
//!
//! Requests use the service-role key, so row ownership is enforced here:
//! every read filters on the caller's `user_id`, and every write carries
//! the `user_id` taken from the verified session.

use async_trait::async_trait;
use serde::Deserialize;

use super::{tables, MetricsStore};
use crate::error::StoreError;
use crate::models::metrics::SERIES_WINDOW;
use crate::models::{DailyMetricRecord, UserId};

const SELECT_COLUMNS: &str = "user_id,date,calories,sleep_hours,steps";
const UPSERT_CONFLICT_TARGET: &str = "user_id,date";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// PostgREST error body (`{"code", "message", "details", "hint"}`).
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
}

/// Supabase REST client.
#[derive(Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl PostgrestStore {
    /// Create a client for the project at `supabase_url`.
    pub fn new(supabase_url: &str, service_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/rest/v1", supabase_url.trim_end_matches('/')),
            service_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base_url, tables::HEALTH_METRICS)
    }

    /// Check response status and return error if not successful.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgrestErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);

        Err(StoreError::Rejected { status, message })
    }
}

#[async_trait]
impl MetricsStore for PostgrestStore {
    async fn fetch_recent(&self, user_id: &UserId) -> Result<Vec<DailyMetricRecord>, StoreError> {
        let response = self
            .http
            .get(self.table_url())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(&[
                ("select", SELECT_COLUMNS.to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "date.desc".to_string()),
                ("limit", SERIES_WINDOW.to_string()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let mut rows: Vec<DailyMetricRecord> = Self::check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        // Never hand back more than the window, or rows out of order,
        // even if the server ignores a query parameter.
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(SERIES_WINDOW);

        tracing::debug!(user_id = %user_id, rows = rows.len(), "Fetched recent metrics");
        Ok(rows)
    }

    async fn upsert(&self, record: &DailyMetricRecord) -> Result<(), StoreError> {
        let response = self
            .http
            .post(self.table_url())
            .header("apikey", &self.service_key)
            .header("Prefer", UPSERT_PREFER)
            .bearer_auth(&self.service_key)
            .query(&[("on_conflict", UPSERT_CONFLICT_TARGET)])
            .json(record)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Self::check_response(response).await?;

        tracing::info!(
            user_id = %record.user_id,
            date = %record.date,
            "Upserted daily metrics"
        );
        Ok(())
    }
}
