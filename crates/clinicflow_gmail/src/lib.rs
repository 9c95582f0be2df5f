// --- File: crates/clinicflow_gmail/src/lib.rs ---
pub mod auth;
pub mod error;
pub mod message;
pub mod notifier;
#[cfg(test)]
mod notifier_test;
pub mod service;

use std::sync::Arc;

use clinicflow_common::error::{auth_error, config_error, ClinicError};
use clinicflow_config::AppConfig;
use tracing::info;

pub use auth::{CachedToken, GmailAuthSession, StaticTokenSource, TokenSource, GMAIL_SEND_SCOPE};
pub use error::GmailError;
pub use message::{build_message, encode_raw, render_mime};
pub use notifier::{Notifier, DEFAULT_USER_ID};
pub use service::GmailBackend;

/// Wires a notifier for the configured Gmail account.
pub async fn notifier_from_config(config: &AppConfig) -> Result<Notifier<GmailBackend>, ClinicError> {
    if !config.use_mail {
        return Err(config_error("mail integration is disabled (use_mail = false)"));
    }
    let mail_config = config
        .mail
        .as_ref()
        .ok_or_else(|| config_error("Missing [mail] section"))?;
    let from_email = mail_config
        .from_email
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| config_error("Missing from_email in mail config"))?;

    let session = GmailAuthSession::from_config(mail_config)
        .await
        .map_err(|e| match e {
            GmailError::ConfigError(msg) => config_error(msg),
            other => auth_error(other),
        })?;
    info!("Gmail notifier ready for {}", from_email);

    let backend = GmailBackend::new(Arc::new(session), mail_config.api_base_url.clone());
    Notifier::new(Arc::new(backend), from_email)
}
