use std::sync::{Arc, Mutex};

use relay_core::{
    CalendarProvider, CredentialSet, ErrorKind, InsertEventRequest, InsertedEvent, RelayApp,
    RelayConfig, ScheduleResult, SchedulingRequest,
};
use serde_json::{json, Value};

/// Records every call and answers with a canned result.
struct RecordingProvider {
    calls: Mutex<Vec<(CredentialSet, InsertEventRequest)>>,
    fail_with: Option<String>,
}

impl RecordingProvider {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with: None,
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        })
    }

    fn calls(&self) -> Vec<(CredentialSet, InsertEventRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CalendarProvider for RecordingProvider {
    async fn insert_event(
        &self,
        credentials: &CredentialSet,
        request: InsertEventRequest,
    ) -> anyhow::Result<InsertedEvent> {
        self.calls
            .lock()
            .unwrap()
            .push((credentials.clone(), request));
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(InsertedEvent {
                id: Some("abc123".into()),
                html_link: Some("http://x/abc123".into()),
            }),
        }
    }
}

fn app(provider: Arc<RecordingProvider>) -> RelayApp {
    let mut config = RelayConfig::new();
    config.set("SALON_GOOGLE_CLIENT_ID", "salon-id");
    config.set("SALON_GOOGLE_CLIENT_SECRET", "salon-secret");
    config.set("SALON_GOOGLE_REFRESH_TOKEN", "salon-refresh");
    RelayApp::new(&config, provider).unwrap()
}

fn request(body: Value) -> SchedulingRequest {
    SchedulingRequest::from_body(body.to_string().as_bytes()).unwrap()
}

#[tokio::test]
async fn defaults_are_applied_to_the_outbound_event() {
    let provider = RecordingProvider::ok();
    let app = app(provider.clone());

    let res = app
        .schedule(request(json!({
            "clientKey": "demo-salon",
            "startTime": "2024-01-01T10:00:00Z",
            "endTime": "2024-01-01T10:30:00Z"
        })))
        .await
        .unwrap();

    assert_eq!(
        res,
        ScheduleResult::Success {
            event_id: Some("abc123".into()),
            html_link: Some("http://x/abc123".into()),
        }
    );

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    let (creds, req) = &calls[0];
    assert_eq!(creds.client_id, "salon-id");
    assert_eq!(creds.refresh_token, "salon-refresh");
    assert_eq!(
        serde_json::to_value(req).unwrap(),
        json!({
            "calendarId": "primary",
            "conferenceDataVersion": 1,
            "event": {
                "summary": "Appointment",
                "description": "",
                "start": { "dateTime": "2024-01-01T10:00:00Z", "timeZone": "America/New_York" },
                "end": { "dateTime": "2024-01-01T10:30:00Z", "timeZone": "America/New_York" },
                "attendees": []
            }
        })
    );
}

#[tokio::test]
async fn provided_fields_override_defaults() {
    let provider = RecordingProvider::ok();
    let app = app(provider.clone());

    app.schedule(request(json!({
        "clientKey": "demo-salon",
        "summary": "Haircut",
        "description": "",
        "startTime": "2024-01-01T10:00:00",
        "endTime": "2024-01-01T10:30:00",
        "timeZone": "Europe/Berlin",
        "calendarId": "salon@example.com",
        "attendees": [{ "email": "guest@example.com" }]
    })))
    .await
    .unwrap();

    let (_, req) = provider.calls().remove(0);
    assert_eq!(req.calendar_id, "salon@example.com");
    assert_eq!(req.event.summary, "Haircut");
    assert_eq!(req.event.description, "");
    assert_eq!(req.event.start.time_zone, "Europe/Berlin");
    assert_eq!(req.event.end.time_zone, "Europe/Berlin");
    assert_eq!(req.event.attendees, json!([{ "email": "guest@example.com" }]));
}

#[tokio::test]
async fn missing_client_key_never_reaches_provider() {
    let provider = RecordingProvider::ok();
    let app = app(provider.clone());

    for body in [
        json!({}),
        json!({ "clientKey": "", "startTime": "a", "endTime": "b" }),
        json!({ "clientKey": null, "startTime": "a", "endTime": "b" }),
        json!({ "clientKey": 0, "startTime": "a", "endTime": "b" }),
        json!({ "clientKey": false, "startTime": "a", "endTime": "b" }),
    ] {
        let err = app.schedule(request(body)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingTenantKey);
        assert_eq!(err.to_json(), json!({ "error": "Missing clientKey" }));
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn missing_time_range_is_a_client_error() {
    let provider = RecordingProvider::ok();
    let app = app(provider.clone());

    for body in [
        json!({ "clientKey": "demo-salon" }),
        json!({ "clientKey": "demo-salon", "startTime": "2024-01-01T10:00:00Z" }),
        json!({ "clientKey": "demo-salon", "endTime": "2024-01-01T10:30:00Z" }),
        json!({ "clientKey": "demo-salon", "startTime": "", "endTime": "x" }),
        json!({ "clientKey": "demo-salon", "startTime": null, "endTime": "x" }),
        json!({ "clientKey": "demo-salon", "startTime": "a", "endTime": 0 }),
    ] {
        let err = app.schedule(request(body)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingTimeRange);
        assert_eq!(err.code(), 400);
        assert_eq!(
            err.to_json(),
            json!({ "error": "startTime and endTime are required ISO strings" })
        );
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn timestamps_are_not_validated_locally() {
    let provider = RecordingProvider::ok();
    let app = app(provider.clone());

    let res = app
        .schedule(request(json!({
            "clientKey": "demo-salon",
            "startTime": "tomorrow-ish",
            "endTime": "later"
        })))
        .await;

    assert!(res.is_ok());
    assert_eq!(provider.calls()[0].1.event.start.date_time, "tomorrow-ish");
}

#[tokio::test]
async fn numeric_client_key_is_looked_up_as_text() {
    let provider = RecordingProvider::ok();
    let app = app(provider.clone());

    let err = app
        .schedule(request(json!({ "clientKey": 123, "startTime": "a", "endTime": "b" })))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::UnknownTenant);
    assert_eq!(
        err.to_json(),
        json!({ "status": "error", "message": "Unknown clientKey: 123" })
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn field_types_are_left_to_the_provider() {
    let provider = RecordingProvider::failing("Invalid attendee email.");
    let app = app(provider.clone());

    let err = app
        .schedule(request(json!({
            "clientKey": "demo-salon",
            "summary": null,
            "startTime": 1704103200,
            "endTime": { "date": "2024-01-01" },
            "attendees": "bob"
        })))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::ProviderFailure);
    assert_eq!(err.message, "Invalid attendee email.");

    let (_, req) = provider.calls().remove(0);
    assert_eq!(
        serde_json::to_value(&req.event).unwrap(),
        json!({
            "summary": null,
            "description": "",
            "start": { "dateTime": 1704103200, "timeZone": "America/New_York" },
            "end": { "dateTime": { "date": "2024-01-01" }, "timeZone": "America/New_York" },
            "attendees": "bob"
        })
    );
}

#[tokio::test]
async fn malformed_body_is_rejected_before_lookup() {
    let provider = RecordingProvider::ok();
    let app = app(provider.clone());

    let err = app.schedule_body(b"{\"clientKey\":").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedBody);
    assert_eq!(err.code(), 400);

    let res = app
        .schedule_body(br#"{"clientKey":"demo-salon","startTime":"a","endTime":"b"}"#)
        .await
        .unwrap();
    assert_eq!(provider.calls().len(), 1);
    assert!(matches!(res, ScheduleResult::Success { .. }));
}

#[tokio::test]
async fn unresolved_tenant_never_reaches_provider() {
    let provider = RecordingProvider::ok();
    let app = app(provider.clone());

    let err = app
        .schedule(request(json!({
            "clientKey": "demo-dentist",
            "startTime": "a",
            "endTime": "b"
        })))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::MissingConfiguration);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn provider_failure_carries_provider_message() {
    let provider = RecordingProvider::failing("Bad Request");
    let app = app(provider.clone());

    let err = app
        .schedule(request(json!({
            "clientKey": "demo-salon",
            "startTime": "a",
            "endTime": "b"
        })))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::ProviderFailure);
    assert_eq!(err.code(), 500);
    assert_eq!(
        err.to_json(),
        json!({ "status": "error", "message": "Bad Request" })
    );
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn provider_failure_without_message_uses_fallback() {
    let provider = RecordingProvider::failing("");
    let app = app(provider);

    let err = app
        .schedule(request(json!({
            "clientKey": "demo-salon",
            "startTime": "a",
            "endTime": "b"
        })))
        .await
        .unwrap_err();

    assert_eq!(err.message, "Unknown error");
}

#[test]
fn body_parsing_edge_cases() {
    assert_eq!(SchedulingRequest::from_body(b"").unwrap(), SchedulingRequest::default());
    assert_eq!(SchedulingRequest::from_body(b"null").unwrap(), SchedulingRequest::default());
    assert_eq!(SchedulingRequest::from_body(b"[1,2]").unwrap(), SchedulingRequest::default());

    let err = SchedulingRequest::from_body(b"{\"clientKey\":").unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedBody);

    let parsed = SchedulingRequest::from_body(b"{\"clientKey\": 42, \"attendees\": \"bob\"}").unwrap();
    assert_eq!(parsed.client_key, Some(json!(42)));
    assert_eq!(parsed.attendees, Some(json!("bob")));
    assert_eq!(parsed.client_key_text(), "42");
}

#[test]
fn status_lists_configured_tenants_in_order() {
    let app = app(RecordingProvider::ok());
    let status = app.status();
    assert!(status.ok);
    assert_eq!(status.service, "google-calendar-mcp");
    assert_eq!(status.clients, vec!["demo-salon", "demo-dentist"]);
}
