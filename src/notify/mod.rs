// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Notification Module
//!
//! Best-effort push notifications, dispatched after a ledger write has
//! committed. The concrete provider sits behind [`PushSender`] so it can
//! be swapped (FCM in production, a no-op when unconfigured, fakes in
//! tests). Delivery is at-most-once per call; there is no retry queue.

pub mod fcm;

use async_trait::async_trait;

pub use fcm::FcmSender;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("push request failed: {0}")]
    Request(String),

    #[error("push provider rejected the message: {0}")]
    Rejected(String),
}

/// A push-notification destination and message, delivered best-effort.
///
/// Implementations must not panic on delivery failure; callers treat any
/// `Err` as a logged non-event.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sender used when no push provider is configured. Logs and succeeds.
pub struct NoopSender;

#[async_trait]
impl PushSender for NoopSender {
    async fn send(&self, device_token: &str, title: &str, _body: &str) -> Result<(), NotifyError> {
        tracing::debug!(
            device_token_len = device_token.len(),
            title,
            "push provider not configured, dropping notification"
        );
        Ok(())
    }
}
