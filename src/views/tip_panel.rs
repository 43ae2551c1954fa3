// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI health tip panel.

use serde::Deserialize;
use validator::Validate;

use crate::error::EndpointError;
use crate::models::{DailyMetricRecord, TipExchange};
use crate::services::tips::{build_prompt, HEALTH_TIPS_FUNCTION};
use crate::services::TipsEndpoint;

/// Longest question accepted from the text box.
pub const MAX_QUESTION_CHARS: u64 = 2000;

/// Body of a tip request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TipQuestion {
    #[serde(default)]
    #[validate(length(max = MAX_QUESTION_CHARS))]
    pub question: String,
}

/// Ask the edge function for a tip.
///
/// Returns `Ok(None)` without calling out when the question is blank and
/// there is no record for today. There is no retry and no cancellation: two
/// overlapping requests both run, and whichever resolves last is what the
/// user ends up seeing.
pub async fn request_tip(
    endpoint: &dyn TipsEndpoint,
    question: &str,
    today: Option<&DailyMetricRecord>,
) -> Result<Option<TipExchange>, EndpointError> {
    let Some(prompt) = build_prompt(question, today) else {
        return Ok(None);
    };

    tracing::debug!(
        has_context = !prompt.context.is_empty(),
        question_len = prompt.question.len(),
        "Requesting health tip"
    );

    let response = endpoint.invoke(HEALTH_TIPS_FUNCTION, &prompt).await?;

    Ok(Some(TipExchange {
        question: prompt.question,
        response,
    }))
}
