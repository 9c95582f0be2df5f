// --- File: crates/clinicflow_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod models; // Data structures shared by the scheduler and the notifier
pub mod services; // Backend abstractions


// Re-export error types and utilities for easier access
pub use error::{
    auth_error, backend_error, config_error, invalid_argument, BoxedError, ClinicError,
};

// Re-export logging utilities for easier access
pub use logging::{
    init, init_from_config, init_with_file, init_with_level, log_error, log_result, parse_level,
};

pub use models::{
    AppointmentRequest, Attendee, CalendarEvent, CreateEventRequest, EmailMessage, EventListQuery,
    EventTime, PatchEventRequest, SendEmailResult, SendUpdates, SentMessage, TimeWindow,
};
pub use services::{BoxFuture, CalendarBackend, MailBackend};

// This crate holds what both the calendar and the mail side agree on.
// It has no knowledge of Google specifics.
