// SPDX-License-Identifier: AGPL-3.0-or-later

//! Firebase Cloud Messaging push provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{NotifyError, PushSender};

const DEFAULT_API_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Push sender backed by the FCM HTTP API.
#[derive(Debug, Clone)]
pub struct FcmSender {
    api_url: String,
    server_key: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    failure: u32,
}

impl FcmSender {
    /// Build a sender for the given server key.
    ///
    /// `api_url` overrides the FCM endpoint (used by tests); pass `None`
    /// for production.
    pub fn new(server_key: String, api_url: Option<String>) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            server_key,
            http,
        })
    }
}

#[async_trait]
impl PushSender for FcmSender {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "to": device_token,
            "notification": {
                "title": title,
                "body": body,
            },
        });

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(format!("HTTP {status}")));
        }

        let parsed: FcmResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Request(format!("invalid provider response: {e}")))?;

        if parsed.failure > 0 {
            return Err(NotifyError::Rejected(format!(
                "{} delivery failure(s)",
                parsed.failure
            )));
        }

        Ok(())
    }
}
