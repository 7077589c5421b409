use async_trait::async_trait;
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::schedule::EventPayload;
use crate::tenant::CredentialSet;

/// `conferenceDataVersion` sent with every insert.
pub const CONFERENCE_DATA_VERSION: u8 = 1;

/// Arguments for the provider's "insert event" operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertEventRequest {
    pub calendar_id: String,
    pub event: EventPayload,
    pub conference_data_version: u8,
}

impl InsertEventRequest {
    pub fn new(calendar_id: impl Into<String>, event: EventPayload) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            event,
            conference_data_version: CONFERENCE_DATA_VERSION,
        }
    }
}

/// What the provider hands back for a created event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// The external calendar service.
///
/// Implementations authorize with the given credentials and create exactly
/// one event. Errors are returned as-is; the scheduling handler turns their
/// display text into the client-facing message, so implementations should
/// make that text the provider's own error description.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "calendar"
    }

    async fn insert_event(
        &self,
        credentials: &CredentialSet,
        request: InsertEventRequest,
    ) -> Result<InsertedEvent>;
}
