//! In-memory calendar backend for tests.
//!
//! Stores events per calendar and records every call it receives, so tests can
//! assert both on results and on whether the backend was contacted at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use clinicflow_common::models::{
    CalendarEvent, CreateEventRequest, EventListQuery, EventTime, PatchEventRequest, SendUpdates,
};
use clinicflow_common::services::{BoxFuture, CalendarBackend};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MockBackendError {
    #[error("event not found: {0}")]
    NotFound(String),
    #[error("backend unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    List {
        calendar_id: String,
        query: EventListQuery,
    },
    Insert {
        calendar_id: String,
        event: CreateEventRequest,
        send_updates: SendUpdates,
    },
    Get {
        calendar_id: String,
        event_id: String,
    },
    Delete {
        calendar_id: String,
        event_id: String,
        send_updates: SendUpdates,
    },
    Patch {
        calendar_id: String,
        event_id: String,
        patch: PatchEventRequest,
        send_updates: SendUpdates,
    },
}

#[derive(Default)]
pub struct InMemoryCalendarBackend {
    events: Mutex<HashMap<String, Vec<CalendarEvent>>>,
    calls: Mutex<Vec<BackendCall>>,
    unavailable: AtomicBool,
}

impl InMemoryCalendarBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts an event straight into the store without recording a call.
    pub fn seed(&self, calendar_id: &str, event: CalendarEvent) {
        self.events
            .lock()
            .unwrap()
            .entry(calendar_id.to_string())
            .or_default()
            .push(event);
    }

    /// Makes every following call fail with [`MockBackendError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: BackendCall) -> Result<(), MockBackendError> {
        self.calls.lock().unwrap().push(call);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MockBackendError::Unavailable);
        }
        Ok(())
    }
}

fn matches_text(event: &CalendarEvent, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [event.summary.as_deref(), event.description.as_deref()]
        .into_iter()
        .flatten()
        .any(|text| text.to_lowercase().contains(&needle))
}

fn start_key(event: &CalendarEvent) -> Option<chrono::DateTime<chrono::Utc>> {
    event.start.and_then(|t| t.sort_key())
}

impl CalendarBackend for InMemoryCalendarBackend {
    type Error = MockBackendError;

    fn list_events(
        &self,
        calendar_id: &str,
        query: EventListQuery,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, Self::Error> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            self.record(BackendCall::List {
                calendar_id: calendar_id.clone(),
                query: query.clone(),
            })?;

            let events = self.events.lock().unwrap();
            let mut found: Vec<CalendarEvent> = events
                .get(&calendar_id)
                .into_iter()
                .flatten()
                .filter(|event| {
                    match (
                        event.start.and_then(|t| t.date_time()),
                        event.end.and_then(|t| t.date_time()),
                    ) {
                        (Some(start), Some(end)) => query.window.intersects(start, end),
                        _ => false,
                    }
                })
                .filter(|event| query.query.as_deref().map_or(true, |q| matches_text(event, q)))
                .cloned()
                .collect();

            found.sort_by_key(start_key);
            if let Some(max) = query.max_results {
                found.truncate(max);
            }
            Ok(found)
        })
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        event: CreateEventRequest,
        send_updates: SendUpdates,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            self.record(BackendCall::Insert {
                calendar_id: calendar_id.clone(),
                event: event.clone(),
                send_updates,
            })?;

            let created = CalendarEvent {
                id: format!("mock-event-{}", uuid::Uuid::new_v4()),
                summary: Some(event.summary().to_string()),
                description: event.description().map(str::to_string),
                location: None,
                status: Some("confirmed".to_string()),
                html_link: None,
                start: Some(EventTime::At(event.start())),
                end: Some(EventTime::At(event.end())),
                attendees: event.attendees().to_vec(),
            };

            self.events
                .lock()
                .unwrap()
                .entry(calendar_id)
                .or_default()
                .push(created.clone());
            Ok(created)
        })
    }

    fn get_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();

        Box::pin(async move {
            self.record(BackendCall::Get {
                calendar_id: calendar_id.clone(),
                event_id: event_id.clone(),
            })?;

            self.events
                .lock()
                .unwrap()
                .get(&calendar_id)
                .and_then(|list| list.iter().find(|e| e.id == event_id))
                .cloned()
                .ok_or(MockBackendError::NotFound(event_id))
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

        Box::pin(async move {
            self.record(BackendCall::Delete {
                calendar_id: calendar_id.clone(),
                event_id: event_id.clone(),
                send_updates,
            })?;

            let mut events = self.events.lock().unwrap();
            let list = events.entry(calendar_id).or_default();
            let before = list.len();
            list.retain(|e| e.id != event_id);
            if list.len() == before {
                return Err(MockBackendError::NotFound(event_id));
            }
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

        Box::pin(async move {
            self.record(BackendCall::Patch {
                calendar_id: calendar_id.clone(),
                event_id: event_id.clone(),
                patch: patch.clone(),
                send_updates,
            })?;

            let mut events = self.events.lock().unwrap();
            let event = events
                .get_mut(&calendar_id)
                .and_then(|list| list.iter_mut().find(|e| e.id == event_id))
                .ok_or_else(|| MockBackendError::NotFound(event_id.clone()))?;

            if let Some(summary) = patch.summary {
                event.summary = Some(summary);
            }
            if let Some(description) = patch.description {
                event.description = Some(description);
            }
            if let Some(location) = patch.location {
                event.location = Some(location);
            }
            if let Some(status) = patch.status {
                event.status = Some(status);
            }
            if let Some(start) = patch.start {
                event.start = Some(EventTime::At(start));
            }
            if let Some(end) = patch.end {
                event.end = Some(EventTime::At(end));
            }
            if let Some(attendees) = patch.attendees {
                event.attendees = attendees;
            }
            Ok(event.clone())
        })
    }
}
