// File: crates/clinicflow_gcal/src/auth.rs
use clinicflow_common::{auth_error, config_error, ClinicError};
use clinicflow_config::{AppConfig, CalendarConfig};
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use std::{path::Path, sync::Arc};
use tracing::info;

use crate::scheduler::AppointmentScheduler;
use crate::service::GoogleCalendarBackend;

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Builds a Calendar hub authenticated with the service-account key in `config.key_path`.
///
/// The authenticator refreshes its token on its own; nothing here persists state.
pub async fn create_calendar_hub(config: &CalendarConfig) -> Result<HubType, ClinicError> {
    let key_path = config
        .key_path
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| config_error("Missing key_path in calendar config"))?;

    let sa_key = read_service_account_key(Path::new(key_path))
        .await
        .map_err(|e| auth_error(format!("cannot read service account key {}: {}", key_path, e)))?;

    let auth = ServiceAccountAuthenticator::builder(sa_key)
        .build()
        .await
        .map_err(|e| auth_error(format!("cannot build service account authenticator: {}", e)))?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| config_error(format!("cannot load native TLS roots: {}", e)))?
        .https_or_http()
        .enable_http1()
        .build();

    // Create client without specifying body type
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    Ok(CalendarHub::new(client, auth))
}

/// Wires a scheduler for the configured calendar.
pub async fn scheduler_from_config(
    config: &AppConfig,
) -> Result<AppointmentScheduler<GoogleCalendarBackend>, ClinicError> {
    if !config.use_calendar {
        return Err(config_error("calendar integration is disabled (use_calendar = false)"));
    }
    let calendar_config = config
        .calendar
        .as_ref()
        .ok_or_else(|| config_error("Missing [calendar] section"))?;
    let calendar_id = calendar_config
        .calendar_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| config_error("Missing calendar_id in calendar config"))?;

    let hub = create_calendar_hub(calendar_config).await?;
    info!("Calendar hub ready for calendar {}", calendar_id);

    let backend = GoogleCalendarBackend::new(Arc::new(hub));
    Ok(AppointmentScheduler::new(Arc::new(backend), calendar_id))
}
