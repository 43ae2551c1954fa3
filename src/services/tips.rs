// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the `health-tips` Supabase edge function.
//!
//! Prompt handling and model inference live in the function; this side
//! only builds the request and passes the generated text through.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::EndpointError;
use crate::models::{DailyMetricRecord, TipPrompt, TipReply};

/// Edge function name.
pub const HEALTH_TIPS_FUNCTION: &str = "health-tips";

/// Question sent when the user leaves the box empty.
pub const DEFAULT_QUESTION: &str = "Give me a general health tip for today.";

/// Remote text generation.
#[async_trait]
pub trait TipsEndpoint: Send + Sync {
    /// Invoke edge function `function` and return the generated text.
    async fn invoke(&self, function: &str, prompt: &TipPrompt) -> Result<String, EndpointError>;
}

/// Summarize today's record for the prompt. Absent values read as 0 here
/// only; nothing is written back.
pub fn build_context(today: Option<&DailyMetricRecord>) -> String {
    let Some(record) = today else {
        return String::new();
    };

    format!(
        "Based on my recent health data: {} calories, {} hours of sleep, {} steps.",
        record.calories.unwrap_or(0),
        record.sleep_hours.unwrap_or(0.0),
        record.steps.unwrap_or(0)
    )
}

/// Build the prompt, or `None` when there is nothing to ask: a blank
/// (empty or whitespace) question and no record for today.
///
/// Only an empty question is replaced by [`DEFAULT_QUESTION`]; any other
/// text, whitespace included, is sent as typed.
pub fn build_prompt(question: &str, today: Option<&DailyMetricRecord>) -> Option<TipPrompt> {
    if question.trim().is_empty() && today.is_none() {
        return None;
    }

    let question = if question.is_empty() {
        DEFAULT_QUESTION.to_string()
    } else {
        question.to_string()
    };

    Some(TipPrompt {
        question,
        context: build_context(today),
    })
}

/// Error body returned by the edge function.
#[derive(Debug, Deserialize)]
struct FunctionErrorBody {
    error: Option<String>,
}

/// Supabase edge function client (`/functions/v1/{name}`).
#[derive(Clone)]
pub struct EdgeFunctionTips {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EdgeFunctionTips {
    pub fn new(supabase_url: &str, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/functions/v1", supabase_url.trim_end_matches('/')),
            api_key,
        }
    }
}

#[async_trait]
impl TipsEndpoint for EdgeFunctionTips {
    async fn invoke(&self, function: &str, prompt: &TipPrompt) -> Result<String, EndpointError> {
        let url = format!("{}/{}", self.base_url, function);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(prompt)
            .send()
            .await
            .map_err(|e| EndpointError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FunctionErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_default();

            tracing::warn!(status, function, "Edge function returned error");
            return Err(EndpointError::Status { status, message });
        }

        let reply: TipReply = response
            .json()
            .await
            .map_err(|e| EndpointError::Decode(e.to_string()))?;

        Ok(reply.tip)
    }
}
