// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-state holder.
//!
//! Fans out session-change events (sign-in, sign-out, token refresh) to
//! every live view. Each user has their own channel, so one user's traffic
//! never crowds out another's. A view subscribes for its own user and holds
//! the returned [`AuthSubscription`]; dropping it releases the listener.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::models::{AuthEvent, UserId};

const AUTH_EVENT_CAPACITY: usize = 64;

type Channels = DashMap<UserId, broadcast::Sender<AuthEvent>>;

/// Broadcasts [`AuthEvent`]s to subscribed views.
#[derive(Clone, Default)]
pub struct SessionHub {
    channels: Arc<Channels>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a session change. Having no listeners is fine.
    pub fn publish(&self, event: AuthEvent) {
        tracing::debug!(
            user_id = %event.user_id,
            kind = ?event.kind,
            "Publishing auth event"
        );
        if let Some(tx) = self.channels.get(&event.user_id) {
            let _ = tx.send(event);
        }
    }

    /// Listen for session changes affecting `user_id`.
    pub fn subscribe(&self, user_id: UserId) -> AuthSubscription {
        let rx = self
            .channels
            .entry(user_id.clone())
            .or_insert_with(|| broadcast::channel(AUTH_EVENT_CAPACITY).0)
            .subscribe();

        AuthSubscription {
            user_id,
            rx,
            channels: self.channels.clone(),
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.channels
            .iter()
            .map(|entry| entry.value().receiver_count())
            .sum()
    }
}

/// What a subscription observed.
#[derive(Debug, Clone)]
pub enum AuthChange {
    /// A session change for the subscribed user.
    Event(AuthEvent),
    /// The listener fell behind and `skipped` events were lost. The holder
    /// must re-check its session; nothing is known about the missed events.
    Missed(u64),
}

/// A live session-change listener for one user.
pub struct AuthSubscription {
    user_id: UserId,
    rx: broadcast::Receiver<AuthEvent>,
    channels: Arc<Channels>,
}

impl AuthSubscription {
    /// Wait for the next change for this user.
    ///
    /// Returns `None` once the channel is gone.
    pub async fn next(&mut self) -> Option<AuthChange> {
        match self.rx.recv().await {
            Ok(event) => Some(AuthChange::Event(event)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    skipped,
                    "Auth listener lagged"
                );
                Some(AuthChange::Missed(skipped))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Release the listener now rather than at end of scope.
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        // This receiver is still alive here, hence `<= 1`.
        self.channels
            .remove_if(&self.user_id, |_, tx| tx.receiver_count() <= 1);
        tracing::debug!(user_id = %self.user_id, "Auth listener released");
    }
}
