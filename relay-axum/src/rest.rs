use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    routing,
    Json,
    Router,
};
use relay_core::{ScheduleResult, ServiceStatus};

use crate::{RelayAxumError, RelayAxumState};

async fn status(State(state): State<RelayAxumState>) -> Json<ServiceStatus> {
    Json(state.app.status())
}

/// True when the request declares an `application/json` body.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}

// Only JSON bodies are read. Anything else is scheduled as an empty request
// and answers "Missing clientKey".
async fn schedule(
    State(state): State<RelayAxumState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ScheduleResult>, RelayAxumError> {
    let body: &[u8] = if is_json(&headers) { &body } else { &[] };

    let res = state.app.schedule_body(body).await?;
    Ok(Json(res))
}

/// `GET /` and `POST /schedule`.
pub fn relay_router(state: RelayAxumState) -> Router<()> {
    Router::new()
        .route("/", routing::get(status))
        .route("/schedule", routing::post(schedule))
        .with_state(state)
}
