// --- File: crates/clinicflow_common/src/models.rs ---

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{invalid_argument, ClinicError};

/// Placeholder used when an appointment is booked without a usable patient name.
pub const DEFAULT_PATIENT_NAME: &str = "Patient";

/// Default appointment length in minutes.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Formats a timestamp the way the calendar API expects it, e.g. `2026-02-16T10:00:00-08:00`.
pub fn to_rfc3339(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn add_minutes(
    start: DateTime<FixedOffset>,
    minutes: i64,
) -> Result<DateTime<FixedOffset>, ClinicError> {
    Duration::try_minutes(minutes)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| invalid_argument(format!("duration_minutes out of range: {}", minutes)))
}

// --- Time windows ---

/// A time range checked against existing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// Window of `minutes` length beginning at `start`.
    pub fn starting_at(start: DateTime<FixedOffset>, minutes: i64) -> Result<Self, ClinicError> {
        Ok(Self {
            start,
            end: add_minutes(start, minutes)?,
        })
    }

    /// A window is only queried when its end lies strictly after its start.
    /// Every range query goes through this check; invalid windows hold no events.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// True when `[start, end)` shares any instant with this window.
    pub fn intersects(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        start < self.end && end > self.start
    }

    pub fn start_rfc3339(&self) -> String {
        to_rfc3339(&self.start)
    }

    pub fn end_rfc3339(&self) -> String {
        to_rfc3339(&self.end)
    }
}

// --- Appointment requests ---

/// What a caller supplies to book an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub start: DateTime<FixedOffset>,
    pub patient_name: String,
    #[serde(default)]
    pub patient_email: Option<String>,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: i64,
}

fn default_duration_minutes() -> i64 {
    DEFAULT_DURATION_MINUTES
}

impl AppointmentRequest {
    pub fn new(start: DateTime<FixedOffset>, patient_name: impl Into<String>) -> Self {
        Self {
            start,
            patient_name: patient_name.into(),
            patient_email: None,
            duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.patient_email = Some(email.into());
        self
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Trimmed patient name, or [`DEFAULT_PATIENT_NAME`] when nothing is left.
    pub fn normalized_patient_name(&self) -> String {
        let trimmed = self.patient_name.trim();
        if trimmed.is_empty() {
            DEFAULT_PATIENT_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Trimmed patient email; blank addresses count as absent.
    pub fn normalized_email(&self) -> Option<String> {
        self.patient_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string)
    }

    /// `start + duration_minutes`; fails when the sum leaves chrono's range.
    pub fn end(&self) -> Result<DateTime<FixedOffset>, ClinicError> {
        add_minutes(self.start, self.duration_minutes)
    }
}

// --- Calendar events ---

/// Whether attendees receive an email about an event change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendUpdates {
    All,
    None,
}

impl SendUpdates {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendUpdates::All => "all",
            SendUpdates::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            response_status: None,
        }
    }
}

/// Start or end of an event as reported by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    At(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

impl EventTime {
    pub fn date_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            EventTime::At(dt) => Some(*dt),
            EventTime::AllDay(_) => None,
        }
    }

    /// Instant used for ordering; all-day entries sort at midnight UTC.
    pub fn sort_key(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTime::At(dt) => Some(dt.with_timezone(&Utc)),
            EventTime::AllDay(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        }
    }
}

/// An event owned by the remote calendar. Only shaped here, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub html_link: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// Body of an event insert.
///
/// Fields are private so the `end > start` and non-blank summary rules hold for
/// every value that reaches a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateEventRequest {
    summary: String,
    description: Option<String>,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    attendees: Vec<Attendee>,
}

impl CreateEventRequest {
    pub fn new(
        summary: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, ClinicError> {
        let summary = summary.into();
        if summary.trim().is_empty() {
            return Err(invalid_argument("event summary must not be empty"));
        }
        if end <= start {
            return Err(invalid_argument("event end must be after its start"));
        }
        Ok(Self {
            summary,
            description: None,
            start,
            end,
            attendees: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attendee(mut self, attendee: Attendee) -> Self {
        self.attendees.push(attendee);
        self
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }
}

/// Partial update of an event. Unset fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchEventRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
}

impl PatchEventRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn reschedule(mut self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn attendees(mut self, attendees: Vec<Attendee>) -> Self {
        self.attendees = Some(attendees);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.status.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.attendees.is_none()
    }

    /// Checks the rules every patch must satisfy before it is sent.
    pub fn validate(&self) -> Result<(), ClinicError> {
        if self.is_empty() {
            return Err(invalid_argument("patch body must not be empty"));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end <= start {
                return Err(invalid_argument("patched end must be after patched start"));
            }
        }
        Ok(())
    }

    /// Builds a patch from a JSON mapping such as `{"description": "..."}`.
    ///
    /// Non-objects, empty objects and unknown fields are rejected.
    pub fn from_json(value: Value) -> Result<Self, ClinicError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(invalid_argument(format!(
                    "patch body must be a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };
        if map.is_empty() {
            return Err(invalid_argument("patch body must not be empty"));
        }

        let patch: PatchEventRequest = serde_json::from_value(Value::Object(map))
            .map_err(|e| invalid_argument(format!("invalid patch body: {}", e)))?;
        patch.validate()?;
        Ok(patch)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parameters of an event listing. Recurring events are always expanded and
/// results are ordered by start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListQuery {
    pub window: TimeWindow,
    pub query: Option<String>,
    pub max_results: Option<usize>,
}

impl EventListQuery {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            query: None,
            max_results: None,
        }
    }
}

// --- Email ---

/// A single plain-text email. Built per send call and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body_text: String,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            subject: subject.into(),
            body_text: body_text.into(),
        }
    }
}

/// What the mail backend reports for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: String,
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailResult {
    pub ok: bool,
    pub message_id: String,
}
