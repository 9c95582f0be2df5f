//! Google Calendar backend implementation.
//!
//! This module provides an implementation of the [`CalendarBackend`] trait on top
//! of `google_calendar3`. It only translates between the shared models and the
//! Google API types; validation lives in the scheduler.

use std::sync::Arc;

use chrono::Utc;
use clinicflow_common::models::{
    Attendee, CalendarEvent, CreateEventRequest, EventListQuery, EventTime, PatchEventRequest,
    SendUpdates,
};
use clinicflow_common::services::{BoxFuture, CalendarBackend};
use google_calendar3::api::{Event, EventAttendee, EventDateTime, Scope};
use thiserror::Error;
use tracing::debug;

use crate::auth::HubType;

/// Largest page the events.list endpoint hands out.
const MAX_PAGE_SIZE: usize = 2500;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Malformed event in API response: {0}")]
    MalformedEvent(String),
}

/// Google Calendar backend.
pub struct GoogleCalendarBackend {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarBackend {
    /// Create a new Google Calendar backend.
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarBackend for GoogleCalendarBackend {
    type Error = GcalServiceError;

    /// Lists single events intersecting the window, following result pages until
    /// `max_results` is reached or the calendar has no more pages.
    fn list_events(
        &self,
        calendar_id: &str,
        query: EventListQuery,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut events = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let mut request = calendar_hub
                    .events()
                    .list(&calendar_id)
                    .time_min(query.window.start.with_timezone(&Utc))
                    .time_max(query.window.end.with_timezone(&Utc))
                    .single_events(true) // Expand recurring events
                    .order_by("startTime")
                    .add_scope(Scope::Full);

                if let Some(q) = query.query.as_deref() {
                    request = request.q(q);
                }
                if let Some(max) = query.max_results {
                    let remaining = max.saturating_sub(events.len()).min(MAX_PAGE_SIZE);
                    request = request.max_results(remaining as i32);
                }
                if let Some(token) = page_token.as_deref() {
                    request = request.page_token(token);
                }

                let (_response, page) = request.doit().await?;

                for item in page.items.unwrap_or_default() {
                    events.push(event_from_api(item)?);
                }

                if let Some(max) = query.max_results {
                    if events.len() >= max {
                        events.truncate(max);
                        break;
                    }
                }
                match page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }

            debug!(
                "Listed {} events in {} between {} and {}",
                events.len(),
                calendar_id,
                query.window.start_rfc3339(),
                query.window.end_rfc3339()
            );
            Ok(events)
        })
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        event: CreateEventRequest,
        send_updates: SendUpdates,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let attendees: Vec<EventAttendee> =
                event.attendees().iter().map(attendee_to_api).collect();

            let new_event = Event {
                summary: Some(event.summary().to_string()),
                description: event.description().map(str::to_string),
                start: Some(event_date_time(event.start())),
                end: Some(event_date_time(event.end())),
                attendees: (!attendees.is_empty()).then_some(attendees),
                ..Default::default()
            };

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .send_updates(send_updates.as_str())
                .add_scope(Scope::Full)
                .doit()
                .await?;

            event_from_api(created_event)
        })
    }

    fn get_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let (_response, event) = calendar_hub
                .events()
                .get(&calendar_id, &event_id)
                .add_scope(Scope::Full)
                .doit()
                .await?;
            event_from_api(event)
        })
    }

    fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        send_updates: SendUpdates,
    ) -> BoxFuture<'_, (), Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            calendar_hub
                .events()
                .delete(&calendar_id, &event_id)
                .send_updates(send_updates.as_str())
                .add_scope(Scope::Full)
                .doit()
                .await?;
            Ok(())
        })
    }

    fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: PatchEventRequest,
        send_updates: SendUpdates,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let (_response, updated) = calendar_hub
                .events()
                .patch(patch_to_api(patch), &calendar_id, &event_id)
                .send_updates(send_updates.as_str())
                .add_scope(Scope::Full)
                .doit()
                .await?;
            event_from_api(updated)
        })
    }
}

// --- Conversions ---

fn event_date_time(dt: chrono::DateTime<chrono::FixedOffset>) -> EventDateTime {
    EventDateTime {
        date_time: Some(dt.with_timezone(&Utc)),
        ..Default::default()
    }
}

fn attendee_to_api(attendee: &Attendee) -> EventAttendee {
    EventAttendee {
        email: Some(attendee.email.clone()),
        display_name: attendee.display_name.clone(),
        ..Default::default()
    }
}

fn attendee_from_api(attendee: EventAttendee) -> Option<Attendee> {
    Some(Attendee {
        email: attendee.email?,
        display_name: attendee.display_name,
        response_status: attendee.response_status,
    })
}

fn event_time_from_api(value: Option<EventDateTime>) -> Option<EventTime> {
    let value = value?;
    match (value.date_time, value.date) {
        (Some(dt), _) => Some(EventTime::At(dt.fixed_offset())),
        (None, Some(date)) => Some(EventTime::AllDay(date)),
        (None, None) => None,
    }
}

/// Only the fields set on the patch are serialized; Google leaves the rest untouched.
pub(crate) fn patch_to_api(patch: PatchEventRequest) -> Event {
    Event {
        summary: patch.summary,
        description: patch.description,
        location: patch.location,
        status: patch.status,
        start: patch.start.map(event_date_time),
        end: patch.end.map(event_date_time),
        attendees: patch
            .attendees
            .map(|list| list.iter().map(attendee_to_api).collect()),
        ..Default::default()
    }
}

pub(crate) fn event_from_api(event: Event) -> Result<CalendarEvent, GcalServiceError> {
    let id = event
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GcalServiceError::MalformedEvent("event without id".to_string()))?;

    Ok(CalendarEvent {
        id,
        summary: event.summary,
        description: event.description,
        location: event.location,
        status: event.status,
        html_link: event.html_link,
        start: event_time_from_api(event.start),
        end: event_time_from_api(event.end),
        attendees: event
            .attendees
            .unwrap_or_default()
            .into_iter()
            .filter_map(attendee_from_api)
            .collect(),
    })
}
