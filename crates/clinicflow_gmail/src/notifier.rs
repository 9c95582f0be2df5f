//! Patient notification emails.

use std::sync::Arc;

use clinicflow_common::error::{backend_error, invalid_argument, ClinicError};
use clinicflow_common::models::{EmailMessage, SendEmailResult};
use clinicflow_common::services::MailBackend;
use lettre::message::Mailbox;
use tracing::{info, warn};

use crate::message::encode_raw;

/// Mailbox the API acts on: the account that granted consent.
pub const DEFAULT_USER_ID: &str = "me";

const SERVICE_NAME: &str = "mail";

/// Sends plain-text emails from the clinic's address.
pub struct Notifier<B: MailBackend> {
    backend: Arc<B>,
    from_email: String,
}

impl<B: MailBackend> Notifier<B> {
    pub fn new(backend: Arc<B>, from_email: impl Into<String>) -> Result<Self, ClinicError> {
        let from_email = from_email.into().trim().to_string();
        if from_email.is_empty() {
            return Err(invalid_argument("sender address must not be empty"));
        }
        if let Err(e) = from_email.parse::<Mailbox>() {
            return Err(invalid_argument(format!("invalid sender address {:?}: {}", from_email, e)));
        }
        Ok(Self {
            backend,
            from_email,
        })
    }

    pub fn from_email(&self) -> &str {
        &self.from_email
    }

    /// Sends one message. A success result always carries the id the API assigned.
    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body_text: &str,
    ) -> Result<SendEmailResult, ClinicError> {
        let message = EmailMessage::new(to.trim(), self.from_email.as_str(), subject, body_text);
        let raw = encode_raw(&message)?;

        let sent = self
            .backend
            .send_raw_message(DEFAULT_USER_ID, &raw)
            .await
            .map_err(|e| {
                warn!("Email to {} was not sent: {}", message.to, e);
                backend_error(SERVICE_NAME, e)
            })?;

        info!("Email to {} sent (message id {})", message.to, sent.id);
        Ok(SendEmailResult {
            ok: true,
            message_id: sent.id,
        })
    }
}
