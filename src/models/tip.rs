// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI health tip request/response shapes.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Body sent to the `health-tips` edge function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TipPrompt {
    pub question: String,
    pub context: String,
}

/// Successful edge function reply.
#[derive(Debug, Deserialize)]
pub struct TipReply {
    pub tip: String,
}

/// One question and its answer. Held only for the response; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TipExchange {
    pub question: String,
    /// Raw generated text, line breaks intact.
    pub response: String,
}
