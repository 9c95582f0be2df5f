// --- File: crates/clinicflow_config/src/models.rs ---

use serde::{Deserialize, Serialize};

pub const DEFAULT_GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";

// --- Google Calendar Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct CalendarConfig {
    pub key_path: Option<String>, // service-account JSON; legacy env GOOGLE_SERVICE_ACCOUNT_FILE
    pub calendar_id: Option<String>, // legacy env GOOGLE_CALENDAR_ID
}

// --- Gmail Config ---
// OAuth client + token cache files. The token file is written by the installed-app flow.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub oauth_client_file: Option<String>, // legacy env GMAIL_OAUTH_CLIENT_FILE
    pub token_file: Option<String>,        // legacy env GMAIL_TOKEN_FILE
    pub from_email: Option<String>,        // legacy env CLINIC_EMAIL_FROM
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            oauth_client_file: None,
            token_file: None,
            from_email: None,
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_GMAIL_API_BASE_URL.to_string()
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_calendar: bool,
    #[serde(default)]
    pub use_mail: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub calendar: Option<CalendarConfig>,
    #[serde(default)]
    pub mail: Option<MailConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}
