//! Backend abstractions for the remote calendar and mail services.
//!
//! The scheduler and the notifier only ever talk to these traits. Concrete
//! Google implementations live in `clinicflow-gcal` and `clinicflow-gmail`;
//! tests plug in in-memory doubles.

use std::future::Future;
use std::pin::Pin;

use crate::models::{
    CalendarEvent, CreateEventRequest, EventListQuery, PatchEventRequest, SendUpdates, SentMessage,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Operations the appointment scheduler needs from a calendar service.
///
/// Every call is a single request/response round trip. Implementations must not
/// retry; failures are reported as `Self::Error`.
pub trait CalendarBackend: Send + Sync {
    /// Error type returned by calendar backend operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List single (expanded) events intersecting the query window, ordered by start time.
    fn list_events(
        &self,
        calendar_id: &str,
        query: EventListQuery,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, Self::Error>;

    /// Insert a new event.
    fn insert_event(
        &self,
        calendar_id: &str,
        event: CreateEventRequest,
        send_updates: SendUpdates,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error>;

    /// Fetch one event by id.
    fn get_event(&self, calendar_id: &str, event_id: &str)
        -> BoxFuture<'_, CalendarEvent, Self::Error>;

    /// Delete an event by id.
    fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        send_updates: SendUpdates,
    ) -> BoxFuture<'_, (), Self::Error>;

    /// Apply a partial update to an event.
    fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: PatchEventRequest,
        send_updates: SendUpdates,
    ) -> BoxFuture<'_, CalendarEvent, Self::Error>;
}

/// Operations the notifier needs from a mail service.
pub trait MailBackend: Send + Sync {
    /// Error type returned by mail backend operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submit an already encoded (base64url) RFC 822 message for delivery.
    fn send_raw_message(
        &self,
        user_id: &str,
        raw: &str,
    ) -> BoxFuture<'_, SentMessage, Self::Error>;
}
