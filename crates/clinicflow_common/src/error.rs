use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// The base error type for all clinicflow operations.
///
/// Local precondition failures surface as [`ClinicError::InvalidArgument`] and are
/// raised before any backend is contacted. Anything a remote backend reports is
/// wrapped in [`ClinicError::Backend`] with the original error kept as its source.
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Malformed input rejected locally
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure returned by a remote calendar or mail service
    #[error("{service} backend error: {source}")]
    Backend {
        service: &'static str,
        #[source]
        source: BoxedError,
    },

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Credential loading or token acquisition failed
    #[error("Authentication error: {0}")]
    AuthError(String),
}

impl ClinicError {
    /// Returns true for errors raised before any backend call.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ClinicError::InvalidArgument(_))
    }

    /// Returns the backend error if this is a [`ClinicError::Backend`] holding an `E`.
    pub fn backend_source<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            ClinicError::Backend { source, .. } => source.0.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

// Utility functions for error handling
pub fn invalid_argument<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::InvalidArgument(message.to_string())
}

pub fn backend_error<E>(service: &'static str, err: E) -> ClinicError
where
    E: StdError + Send + Sync + 'static,
{
    ClinicError::Backend {
        service,
        source: BoxedError(Box::new(err)),
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::ConfigError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::AuthError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug)]
    #[error("quota exceeded")]
    struct QuotaError;

    #[test]
    fn test_backend_error_keeps_source() {
        let err = backend_error("calendar", QuotaError);
        assert_eq!(err.to_string(), "calendar backend error: quota exceeded");
        assert!(err.backend_source::<QuotaError>().is_some());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = invalid_argument("event_id is required");
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "Invalid argument: event_id is required");
        assert!(err.backend_source::<QuotaError>().is_none());
    }
}
