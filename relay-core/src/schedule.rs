//! Scheduling requests and their translation into provider events.
//!
//! The pipeline is linear: validate, resolve credentials, translate, call
//! the provider once, map the outcome. Any failure ends the request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{RelayError, RelayResult};
use crate::provider::{CalendarProvider, InsertEventRequest, InsertedEvent};
use crate::tenant::CredentialResolver;

pub const DEFAULT_SUMMARY: &str = "Appointment";
pub const DEFAULT_DESCRIPTION: &str = "";
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Inbound `POST /schedule` body.
///
/// Fields keep whatever JSON the caller sent; `None` means the field was
/// not in the body at all. Types are not checked here, the provider is the
/// judge of what it accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulingRequest {
    pub client_key: Option<Value>,
    pub summary: Option<Value>,
    pub description: Option<Value>,
    pub start_time: Option<Value>,
    pub end_time: Option<Value>,
    pub time_zone: Option<Value>,
    pub calendar_id: Option<Value>,
    pub attendees: Option<Value>,
}

impl SchedulingRequest {
    /// Parse a raw request body.
    ///
    /// An empty body, or any JSON value that is not an object, yields an
    /// empty request (which then fails validation on the missing client
    /// key). Only bytes that are not JSON at all are `MalformedBody`.
    pub fn from_body(body: &[u8]) -> RelayResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice(body).map_err(|_| RelayError::malformed_body())? {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_fields(mut fields: Map<String, Value>) -> Self {
        Self {
            client_key: fields.remove("clientKey"),
            summary: fields.remove("summary"),
            description: fields.remove("description"),
            start_time: fields.remove("startTime"),
            end_time: fields.remove("endTime"),
            time_zone: fields.remove("timeZone"),
            calendar_id: fields.remove("calendarId"),
            attendees: fields.remove("attendees"),
        }
    }

    /// The client key as used for lookups and logs, empty when absent.
    pub fn client_key_text(&self) -> String {
        self.client_key.as_ref().map(text).unwrap_or_default()
    }
}

/// `null`, `false`, `0` and `""` count as not provided.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a JSON value when it is used as a key or path segment.
///
/// Strings are taken as-is, arrays join their items with `,` and objects
/// become `[object Object]`.
fn text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn provided(value: Option<Value>) -> Option<Value> {
    value.filter(truthy)
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub client_key: String,
    pub start_time: Value,
    pub end_time: Value,
    pub summary: Value,
    pub description: Value,
    pub time_zone: Value,
    pub calendar_id: String,
    pub attendees: Value,
}

/// Check required fields and substitute defaults.
///
/// Defaults only replace absent fields; an explicit `null` or `""` is kept.
/// Timestamps are not parsed here.
pub fn validate(request: SchedulingRequest) -> RelayResult<ValidatedRequest> {
    let client_key = provided(request.client_key)
        .map(|key| text(&key))
        .ok_or_else(RelayError::missing_tenant_key)?;

    let (Some(start_time), Some(end_time)) =
        (provided(request.start_time), provided(request.end_time))
    else {
        crate::bail_relay!(missing_time_range);
    };

    let or_default = |value: Option<Value>, default: &str| {
        value.unwrap_or_else(|| Value::String(default.to_string()))
    };

    Ok(ValidatedRequest {
        client_key,
        start_time,
        end_time,
        summary: or_default(request.summary, DEFAULT_SUMMARY),
        description: or_default(request.description, DEFAULT_DESCRIPTION),
        time_zone: or_default(request.time_zone, DEFAULT_TIME_ZONE),
        calendar_id: request
            .calendar_id
            .map(|id| text(&id))
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
        attendees: request.attendees.unwrap_or_else(|| Value::Array(Vec::new())),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: Value,
    pub time_zone: Value,
}

/// Event body sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub summary: Value,
    pub description: Value,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Value,
}

impl ValidatedRequest {
    pub fn to_event(&self) -> EventPayload {
        EventPayload {
            summary: self.summary.clone(),
            description: self.description.clone(),
            start: EventDateTime {
                date_time: self.start_time.clone(),
                time_zone: self.time_zone.clone(),
            },
            end: EventDateTime {
                date_time: self.end_time.clone(),
                time_zone: self.time_zone.clone(),
            },
            attendees: self.attendees.clone(),
        }
    }

    pub fn into_insert_request(self) -> InsertEventRequest {
        let event = self.to_event();
        InsertEventRequest::new(self.calendar_id, event)
    }
}

/// Response body for `POST /schedule` success and server errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScheduleResult {
    #[serde(rename_all = "camelCase")]
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html_link: Option<String>,
    },
    Error { message: String },
}

impl ScheduleResult {
    pub fn error(message: impl Into<String>) -> Self {
        ScheduleResult::Error {
            message: message.into(),
        }
    }
}

impl From<InsertedEvent> for ScheduleResult {
    fn from(event: InsertedEvent) -> Self {
        ScheduleResult::Success {
            event_id: event.id,
            html_link: event.html_link,
        }
    }
}

/// Run one scheduling request end to end.
///
/// The provider is only called once credentials resolve.
pub async fn handle(
    resolver: CredentialResolver<'_>,
    provider: &dyn CalendarProvider,
    request: SchedulingRequest,
) -> RelayResult<ScheduleResult> {
    let request = validate(request)?;
    let credentials = resolver.resolve(&request.client_key)?;

    let inserted = provider
        .insert_event(&credentials, request.into_insert_request())
        .await
        .map_err(|err| RelayError::provider_failure(err.to_string()).with_source(err))?;

    Ok(ScheduleResult::from(inserted))
}
