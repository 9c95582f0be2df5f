// --- File: crates/clinicflow_gcal/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
#[cfg(test)]
mod mock;
pub mod scheduler;
#[cfg(test)]
mod scheduler_proptest;
pub mod service;

pub use auth::{create_calendar_hub, scheduler_from_config, HubType};
pub use scheduler::{appointment_summary, AppointmentScheduler, DEFAULT_MAX_RESULTS};
pub use service::{GcalServiceError, GoogleCalendarBackend};
