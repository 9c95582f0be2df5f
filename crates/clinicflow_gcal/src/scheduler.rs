//! Appointment scheduling on top of a [`CalendarBackend`].
//!
//! Availability is the absence of any overlapping event in a single calendar.
//! There is no padding between appointments and no locking: `is_available`
//! followed by `create_appointment` is not atomic, and callers that need
//! double-booking protection have to sequence the two themselves.

use std::sync::Arc;

use clinicflow_common::error::{backend_error, invalid_argument, ClinicError};
use clinicflow_common::models::{
    AppointmentRequest, Attendee, CalendarEvent, CreateEventRequest, EventListQuery,
    PatchEventRequest, SendUpdates, TimeWindow,
};
use clinicflow_common::services::CalendarBackend;
use serde_json::Value;
use tracing::{debug, info};

/// Result cap for [`AppointmentScheduler::list_events_in_range`] when none is given.
pub const DEFAULT_MAX_RESULTS: usize = 250;

const SERVICE_NAME: &str = "calendar";

/// Summary written on every appointment created through the scheduler.
pub fn appointment_summary(patient_name: &str) -> String {
    format!("Dental Appointment - {}", patient_name)
}

/// Books and manages appointment events in one calendar.
pub struct AppointmentScheduler<B: CalendarBackend> {
    backend: Arc<B>,
    calendar_id: String,
}

impl<B: CalendarBackend> AppointmentScheduler<B> {
    pub fn new(backend: Arc<B>, calendar_id: impl Into<String>) -> Self {
        Self {
            backend,
            calendar_id: calendar_id.into(),
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Events intersecting `window`, ordered by start time.
    ///
    /// An invalid window (`end <= start`) yields an empty list without a backend call.
    pub async fn list_overlapping(&self, window: TimeWindow) -> Result<Vec<CalendarEvent>, ClinicError> {
        if !window.is_valid() {
            debug!(
                "Skipping overlap query for invalid window {} - {}",
                window.start_rfc3339(),
                window.end_rfc3339()
            );
            return Ok(Vec::new());
        }

        self.backend
            .list_events(&self.calendar_id, EventListQuery::new(window))
            .await
            .map_err(|e| backend_error(SERVICE_NAME, e))
    }

    /// True iff nothing overlaps `window`.
    pub async fn is_available(&self, window: TimeWindow) -> Result<bool, ClinicError> {
        let overlapping = self.list_overlapping(window).await?;
        debug!(
            "{} overlapping event(s) between {} and {}",
            overlapping.len(),
            window.start_rfc3339(),
            window.end_rfc3339()
        );
        Ok(overlapping.is_empty())
    }

    /// Creates the appointment event. Does not check availability.
    pub async fn create_appointment(&self, req: AppointmentRequest) -> Result<CalendarEvent, ClinicError> {
        if req.duration_minutes <= 0 {
            return Err(invalid_argument(format!(
                "duration_minutes must be > 0, got {}",
                req.duration_minutes
            )));
        }

        let patient_name = req.normalized_patient_name();
        let mut event = CreateEventRequest::new(
            appointment_summary(&patient_name),
            req.start,
            req.end()?,
        )?;

        // Only an invited patient gets notified
        let send_updates = match req.normalized_email() {
            Some(email) => {
                event = event.with_attendee(Attendee::new(email));
                SendUpdates::All
            }
            None => SendUpdates::None,
        };

        let created = self
            .backend
            .insert_event(&self.calendar_id, event, send_updates)
            .await
            .map_err(|e| backend_error(SERVICE_NAME, e))?;

        info!(
            "Created appointment {} for {} at {} (sendUpdates={})",
            created.id,
            patient_name,
            req.start.to_rfc3339(),
            send_updates.as_str()
        );
        Ok(created)
    }

    /// Events intersecting `window`, optionally filtered by free text matched
    /// against title and description, capped at `max_results` (default 250).
    pub async fn list_events_in_range(
        &self,
        window: TimeWindow,
        query: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<CalendarEvent>, ClinicError> {
        if !window.is_valid() {
            return Ok(Vec::new());
        }
        let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if max_results == 0 {
            return Err(invalid_argument("max_results must be > 0"));
        }

        let list_query = EventListQuery {
            window,
            query: query
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            max_results: Some(max_results),
        };

        self.backend
            .list_events(&self.calendar_id, list_query)
            .await
            .map_err(|e| backend_error(SERVICE_NAME, e))
    }

    pub async fn get_event(&self, event_id: &str) -> Result<CalendarEvent, ClinicError> {
        let event_id = require_event_id(event_id)?;
        self.backend
            .get_event(&self.calendar_id, event_id)
            .await
            .map_err(|e| backend_error(SERVICE_NAME, e))
    }

    /// Deletes the event without notifying attendees.
    pub async fn delete_event(&self, event_id: &str) -> Result<(), ClinicError> {
        let event_id = require_event_id(event_id)?;
        self.backend
            .delete_event(&self.calendar_id, event_id, SendUpdates::None)
            .await
            .map_err(|e| backend_error(SERVICE_NAME, e))?;

        info!("Deleted event {} from {}", event_id, self.calendar_id);
        Ok(())
    }

    /// Applies a partial update without notifying attendees.
    pub async fn patch_event(
        &self,
        event_id: &str,
        patch: PatchEventRequest,
    ) -> Result<CalendarEvent, ClinicError> {
        let event_id = require_event_id(event_id)?;
        patch.validate()?;

        let updated = self
            .backend
            .patch_event(&self.calendar_id, event_id, patch, SendUpdates::None)
            .await
            .map_err(|e| backend_error(SERVICE_NAME, e))?;

        info!("Patched event {} in {}", event_id, self.calendar_id);
        Ok(updated)
    }

    /// [`Self::patch_event`] for a JSON mapping such as `{"description": "..."}`.
    pub async fn patch_event_json(&self, event_id: &str, body: Value) -> Result<CalendarEvent, ClinicError> {
        let event_id = require_event_id(event_id)?;
        let patch = PatchEventRequest::from_json(body)?;
        self.patch_event(event_id, patch).await
    }
}

fn require_event_id(event_id: &str) -> Result<&str, ClinicError> {
    let trimmed = event_id.trim();
    if trimmed.is_empty() {
        return Err(invalid_argument("event_id is required"));
    }
    Ok(trimmed)
}
