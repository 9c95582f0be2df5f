//! Environment variable handling for clinicflow.
//!
//! This module provides utilities for working with environment variables in a
//! standardized way: the `CLINICFLOW__SECTION__KEY` pattern read by the config
//! loader, the `SECTION_KEY` names used for `secret_from_env` markers, and the
//! variable names the first deployment of the clinic tooling used.

use std::env;

use crate::models::AppConfig;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "CLINICFLOW";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value replaced by the environment variable named after the value's path
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"mail.from_email"` becomes `"CLINICFLOW__MAIL__FROM_EMAIL"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `"mail.from_email"` becomes `"MAIL_FROM_EMAIL"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Legacy variable names and the configuration path each one feeds.
pub const LEGACY_ENV_VARS: &[(&str, &str)] = &[
    ("GOOGLE_SERVICE_ACCOUNT_FILE", "calendar.key_path"),
    ("GOOGLE_CALENDAR_ID", "calendar.calendar_id"),
    ("GMAIL_OAUTH_CLIENT_FILE", "mail.oauth_client_file"),
    ("GMAIL_TOKEN_FILE", "mail.token_file"),
    ("CLINIC_EMAIL_FROM", "mail.from_email"),
];

/// The `CLINICFLOW__` variable that supersedes a legacy name.
pub fn legacy_env_replacement(var: &str) -> Option<String> {
    LEGACY_ENV_VARS
        .iter()
        .find(|(name, _)| *name == var)
        .map(|(_, path)| config_path_to_env_var(path))
}

/// Fill configuration values that are still unset from the legacy variables.
///
/// Values already provided by a config file or a `CLINICFLOW__` variable win.
pub fn apply_legacy_env<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (var, path) in LEGACY_ENV_VARS {
        let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let slot = match *path {
            "calendar.key_path" => &mut config.calendar.get_or_insert_with(Default::default).key_path,
            "calendar.calendar_id" => {
                &mut config.calendar.get_or_insert_with(Default::default).calendar_id
            }
            "mail.oauth_client_file" => {
                &mut config.mail.get_or_insert_with(Default::default).oauth_client_file
            }
            "mail.token_file" => &mut config.mail.get_or_insert_with(Default::default).token_file,
            "mail.from_email" => &mut config.mail.get_or_insert_with(Default::default).from_email,
            _ => continue,
        };
        if slot.is_none() {
            tracing::debug!(
                "Using legacy variable {} for {} (prefer {})",
                var,
                path,
                legacy_env_replacement(var).unwrap_or_default()
            );
            *slot = Some(value);
        }
    }
}
