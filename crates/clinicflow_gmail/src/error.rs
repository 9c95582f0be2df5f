use thiserror::Error;

/// Errors that can occur when interacting with the Gmail API.
#[derive(Error, Debug)]
pub enum GmailError {
    /// Error occurred during a Gmail API request
    #[error("Gmail API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Gmail API
    #[error("Gmail API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Token acquisition or refresh failed
    #[error("Gmail authentication failed: {0}")]
    AuthError(String),

    /// Missing or unreadable OAuth client configuration
    #[error("Gmail configuration missing or incomplete: {0}")]
    ConfigError(String),

    /// The API accepted the request but did not return a message id
    #[error("Gmail API response did not contain a message id")]
    MissingMessageId,
}
