// --- File: crates/clinicflow_gmail/src/service.rs ---
use std::sync::Arc;

use clinicflow_common::models::SentMessage;
use clinicflow_common::services::{BoxFuture, MailBackend};
use clinicflow_config::DEFAULT_GMAIL_API_BASE_URL;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::auth::TokenSource;
use crate::error::GmailError;

#[derive(Serialize)]
struct SendRequest<'a> {
    raw: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    id: Option<String>,
    thread_id: Option<String>,
}

/// Gmail REST client for `users.messages.send`.
pub struct GmailBackend {
    client: Client,
    api_base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl GmailBackend {
    pub fn new(tokens: Arc<dyn TokenSource>, api_base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Client pointed at the public Gmail endpoint.
    pub fn with_default_endpoint(tokens: Arc<dyn TokenSource>) -> Self {
        Self::new(tokens, DEFAULT_GMAIL_API_BASE_URL)
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn send_url(&self, user_id: &str) -> String {
        format!(
            "{}/gmail/v1/users/{}/messages/send",
            self.api_base_url, user_id
        )
    }

    async fn send(&self, user_id: &str, raw: &str) -> Result<SentMessage, GmailError> {
        let token = self.tokens.bearer_token().await?;
        let url = self.send_url(user_id);
        debug!("Sending Gmail message via {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&SendRequest { raw })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!("Gmail API error ({}): {}", status, message);
            return Err(GmailError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body: SendResponse = response.json().await?;
        let id = body
            .id
            .filter(|id| !id.is_empty())
            .ok_or(GmailError::MissingMessageId)?;
        info!("Gmail accepted message {}", id);
        Ok(SentMessage {
            id,
            thread_id: body.thread_id,
        })
    }
}

impl MailBackend for GmailBackend {
    type Error = GmailError;

    fn send_raw_message(&self, user_id: &str, raw: &str) -> BoxFuture<'_, SentMessage, Self::Error> {
        let user_id = user_id.to_string();
        let raw = raw.to_string();
        Box::pin(async move { self.send(&user_id, &raw).await })
    }
}
