// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod metrics;
pub mod notification;
pub mod session;
pub mod tip;

pub use metrics::{DailyMetricRecord, MetricFields, MetricSeries, RepositoryChanged, UserId};
pub use notification::{Notification, Severity};
pub use session::{AuthEvent, AuthEventKind, Session, User};
pub use tip::{TipExchange, TipPrompt, TipReply};
