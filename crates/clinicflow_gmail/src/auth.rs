//! OAuth tokens for the Gmail API.
//!
//! [`GmailAuthSession`] runs the installed-app consent flow once, persists the
//! resulting tokens to the configured cache file, and refreshes them when they
//! are about to expire. [`GmailBackend`](crate::service::GmailBackend) only
//! needs a [`TokenSource`], so tests can hand it a [`StaticTokenSource`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use clinicflow_common::services::BoxFuture;
use clinicflow_config::MailConfig;
use tracing::{debug, info, warn};
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{
    read_application_secret, AccessToken, InstalledFlowAuthenticator, InstalledFlowReturnMethod,
};

use crate::error::GmailError;

/// Scope needed to send mail on the user's behalf.
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// A token is treated as expired this long before its real expiry.
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Anything that can hand out a bearer token for the Gmail API.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> BoxFuture<'_, String, GmailError>;
}

/// A fixed bearer token. Never refreshes.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenSource for StaticTokenSource {
    fn bearer_token(&self) -> BoxFuture<'_, String, GmailError> {
        Box::pin(async move { Ok(self.token.clone()) })
    }
}

/// Access token plus its expiry, as last handed out by the authenticator.
#[derive(Clone)]
pub struct CachedToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Tokens without a known expiry never expire locally; the API will reject them if stale.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(EXPIRY_SKEW_SECONDS) >= expires_at,
            None => false,
        }
    }

    fn from_access_token(token: &AccessToken) -> Option<Self> {
        let value = token.token()?.to_string();
        let expires_at = token
            .expiration_time()
            .and_then(|t| DateTime::from_timestamp(t.unix_timestamp(), 0));
        Some(Self { value, expires_at })
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Installed-app OAuth session with an on-disk token cache.
pub struct GmailAuthSession {
    authenticator: DefaultAuthenticator,
    scopes: Vec<String>,
    current: Mutex<Option<CachedToken>>,
}

impl GmailAuthSession {
    /// Loads the OAuth client secret and prepares the consent flow.
    ///
    /// The first token request opens a local redirect listener and waits for the user
    /// to grant consent. Later runs reuse the tokens stored in `token_file`.
    pub async fn installed_flow(
        oauth_client_file: &Path,
        token_file: &Path,
    ) -> Result<Self, GmailError> {
        let secret = read_application_secret(oauth_client_file).await.map_err(|e| {
            GmailError::ConfigError(format!(
                "cannot read OAuth client file {}: {}",
                oauth_client_file.display(),
                e
            ))
        })?;

        discard_unreadable_token_cache(token_file).await;

        let authenticator =
            InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                .persist_tokens_to_disk(token_file.to_path_buf())
                .build()
                .await
                .map_err(|e| {
                    GmailError::AuthError(format!("cannot build installed-app authenticator: {}", e))
                })?;

        info!("Gmail OAuth session ready (token cache: {})", token_file.display());
        Ok(Self {
            authenticator,
            scopes: vec![GMAIL_SEND_SCOPE.to_string()],
            current: Mutex::new(None),
        })
    }

    pub async fn from_config(config: &MailConfig) -> Result<Self, GmailError> {
        let oauth_client_file = non_blank(config.oauth_client_file.as_deref())
            .ok_or_else(|| GmailError::ConfigError("Missing oauth_client_file in mail config".into()))?;
        let token_file = non_blank(config.token_file.as_deref())
            .ok_or_else(|| GmailError::ConfigError("Missing token_file in mail config".into()))?;
        Self::installed_flow(Path::new(oauth_client_file), Path::new(token_file)).await
    }

    /// True when no token has been fetched yet or the current one is within the skew of expiring.
    pub fn is_expired(&self) -> bool {
        match &*self.lock_current() {
            Some(token) => token.is_expired_at(Utc::now()),
            None => true,
        }
    }

    /// Forces a refresh against the token endpoint, bypassing the cache.
    pub async fn refresh(&self) -> Result<(), GmailError> {
        let token = self
            .authenticator
            .force_refreshed_token(self.scopes.as_slice())
            .await
            .map_err(|e| GmailError::AuthError(format!("token refresh failed: {}", e)))?;
        self.store(&token)?;
        debug!("Gmail access token refreshed");
        Ok(())
    }

    /// Returns a valid access token, fetching a new one when the current one is stale.
    pub async fn access_token(&self) -> Result<String, GmailError> {
        let cached = self.lock_current().clone();
        if let Some(token) = cached {
            if !token.is_expired_at(Utc::now()) {
                return Ok(token.value);
            }
        }

        let token = self
            .authenticator
            .token(self.scopes.as_slice())
            .await
            .map_err(|e| GmailError::AuthError(format!("cannot obtain access token: {}", e)))?;
        self.store(&token)
    }

    fn store(&self, token: &AccessToken) -> Result<String, GmailError> {
        let cached = CachedToken::from_access_token(token).ok_or_else(|| {
            GmailError::AuthError("authenticator returned an empty access token".into())
        })?;
        let value = cached.value.clone();
        *self.lock_current() = Some(cached);
        Ok(value)
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<CachedToken>> {
        // A panic while holding the lock cannot leave the Option half-written.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenSource for GmailAuthSession {
    fn bearer_token(&self) -> BoxFuture<'_, String, GmailError> {
        Box::pin(self.access_token())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Path an unreadable token cache is moved to.
pub fn invalid_cache_path(token_file: &Path) -> PathBuf {
    let mut name = token_file.as_os_str().to_os_string();
    name.push(".invalid");
    PathBuf::from(name)
}

/// Moves a token cache that is not valid JSON out of the way so the consent flow can start fresh.
pub(crate) async fn discard_unreadable_token_cache(token_file: &Path) {
    let contents = match tokio::fs::read_to_string(token_file).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            warn!("Cannot read token cache {}: {}", token_file.display(), e);
            return;
        }
    };

    if serde_json::from_str::<serde_json::Value>(&contents).is_ok() {
        return;
    }

    let target = invalid_cache_path(token_file);
    match tokio::fs::rename(token_file, &target).await {
        Ok(()) => warn!(
            "Token cache {} is not valid JSON; moved it to {}",
            token_file.display(),
            target.display()
        ),
        Err(e) => warn!(
            "Token cache {} is not valid JSON and could not be moved aside: {}",
            token_file.display(),
            e
        ),
    }
}
