use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::errors::RelayError;

#[derive(Debug)]
pub struct RelayAxumError(pub RelayError);

impl From<RelayError> for RelayAxumError {
    fn from(e: RelayError) -> Self {
        Self(e)
    }
}

impl From<anyhow::Error> for RelayAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(RelayError::normalize(e))
    }
}

impl IntoResponse for RelayAxumError {
    fn into_response(self) -> Response {
        let safe = self.0.sanitize_for_client();
        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
