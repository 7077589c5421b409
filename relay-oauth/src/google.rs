//! Google Calendar v3 `events.insert` as a [`CalendarProvider`].

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use relay_core::config::PROVIDER_TIMEOUT_KEY;
use relay_core::{CalendarProvider, CredentialSet, InsertEventRequest, InsertedEvent, RelayConfigSnapshot};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::oauth2_client::{OAuth2RefreshTokenClient, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL};

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/calendar/v3";

pub const ENDPOINT_KEY: &str = "google.calendar.endpoint";
pub const AUTH_URL_KEY: &str = "google.oauth.auth_url";
pub const TOKEN_URL_KEY: &str = "google.oauth.token_url";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleCalendarOptions {
    pub endpoint: String,
    pub auth_url: String,
    pub token_url: String,
    /// Upper bound for token exchange plus insert. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for GoogleCalendarOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            timeout: None,
        }
    }
}

impl GoogleCalendarOptions {
    pub fn from_config(config: &RelayConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            endpoint: config
                .get_non_empty(ENDPOINT_KEY)
                .map(str::to_string)
                .unwrap_or(defaults.endpoint),
            auth_url: config
                .get_non_empty(AUTH_URL_KEY)
                .map(str::to_string)
                .unwrap_or(defaults.auth_url),
            token_url: config
                .get_non_empty(TOKEN_URL_KEY)
                .map(str::to_string)
                .unwrap_or(defaults.token_url),
            timeout: config
                .get_u64(PROVIDER_TIMEOUT_KEY)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

pub struct GoogleCalendarProvider {
    http: reqwest::Client,
    base_url: Url,
    options: GoogleCalendarOptions,
}

impl GoogleCalendarProvider {
    pub fn new(options: GoogleCalendarOptions) -> Result<Self> {
        let base_url = Url::parse(&options.endpoint)?;
        if base_url.cannot_be_a_base() {
            bail!("{ENDPOINT_KEY} must be a base URL");
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            options,
        })
    }

    fn events_url(&self, calendar_id: &str, conference_data_version: u8) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("{ENDPOINT_KEY} must be a base URL"))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);
        url.query_pairs_mut()
            .append_pair("conferenceDataVersion", &conference_data_version.to_string());
        Ok(url)
    }

    async fn insert(
        &self,
        credentials: &CredentialSet,
        request: InsertEventRequest,
    ) -> Result<InsertedEvent> {
        let oauth = OAuth2RefreshTokenClient::new(
            credentials,
            self.options.auth_url.clone(),
            self.options.token_url.clone(),
        )?;
        let access_token = oauth.access_token().await?;

        let url = self.events_url(&request.calendar_id, request.conference_data_version)?;
        debug!(calendar_id = %request.calendar_id, "inserting calendar event");

        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(&request.event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("{}", error_message(status.as_u16(), &body));
        }

        Ok(response.json::<InsertedEvent>().await?)
    }
}

/// Google error bodies look like `{"error": {"code": 400, "message": "..."}}`.
/// Falls back to a status line when the body carries no message.
fn error_message(status: u16, body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        match v.get("error")? {
            Value::Object(err) => err.get("message")?.as_str().map(str::to_string),
            Value::String(code) => Some(code.clone()),
            _ => None,
        }
    });

    match from_body {
        Some(message) if !message.trim().is_empty() => message,
        _ => format!("Request failed with status code {status}"),
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    fn name(&self) -> &str {
        "google-calendar"
    }

    async fn insert_event(
        &self,
        credentials: &CredentialSet,
        request: InsertEventRequest,
    ) -> Result<InsertedEvent> {
        match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, self.insert(credentials, request))
                .await
                .map_err(|_| anyhow!("Calendar request timed out after {}s", limit.as_secs()))?,
            None => self.insert(credentials, request).await,
        }
    }
}
