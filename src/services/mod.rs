// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - integrations and business logic.

pub mod auth;
pub mod metrics;
pub mod session;
pub mod tips;

pub use auth::{AuthError, AuthProvider, SupabaseAuth};
pub use metrics::MetricsRepository;
pub use session::{AuthChange, AuthSubscription, SessionHub};
pub use tips::{EdgeFunctionTips, TipsEndpoint};
