//! # Errors
//!
//! calendar-relay keeps a small, closed set of structured errors.
//! Core goals:
//! - every failure carries a kind that fixes its HTTP status and body shape
//! - errors are plain values returned through `Result`
//! - transport-agnostic (the axum crate decides how to write the response)
//!
//! Client errors serialize as `{"error": message}`; server errors as
//! `{"status": "error", "message": message}`.

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::{json, Value};

use crate::schedule::ScheduleResult;

/// Result type used across the relay core.
pub type RelayResult<T> = std::result::Result<T, RelayError>;

/// Fallback message when a collaborator fails without describing why.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingTenantKey,     // 400
    MissingTimeRange,     // 400
    MalformedBody,        // 400
    UnknownTenant,        // 500
    MissingConfiguration, // 500
    ProviderFailure,      // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::MissingTenantKey
            | ErrorKind::MissingTimeRange
            | ErrorKind::MalformedBody => 400,
            ErrorKind::UnknownTenant
            | ErrorKind::MissingConfiguration
            | ErrorKind::ProviderFailure => 500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::MissingTenantKey => "MissingTenantKey",
            ErrorKind::MissingTimeRange => "MissingTimeRange",
            ErrorKind::MalformedBody => "MalformedBody",
            ErrorKind::UnknownTenant => "UnknownTenant",
            ErrorKind::MissingConfiguration => "MissingConfiguration",
            ErrorKind::ProviderFailure => "ProviderFailure",
        }
    }

    /// True for failures caused by the request itself.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// A structured relay error.
///
/// `message` is always safe to show to a client. `source` may hold the
/// underlying collaborator error and is dropped by `sanitize_for_client`.
#[derive(Debug)]
pub struct RelayError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<AnyError>,
}

impl RelayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Turn any error into a RelayError:
    /// - if it's already a RelayError, keep it
    /// - otherwise treat it as a provider failure using its display text
    pub fn normalize(err: AnyError) -> RelayError {
        match err.downcast::<RelayError>() {
            Ok(relay) => relay,
            Err(other) => RelayError::provider_failure(other.to_string()).with_source(other),
        }
    }

    /// Copy without the inner `source`.
    pub fn sanitize_for_client(&self) -> RelayError {
        RelayError {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }

    /// Response body for this error.
    pub fn to_json(&self) -> Value {
        if self.kind.is_client_error() {
            json!({ "error": self.message })
        } else {
            serde_json::to_value(ScheduleResult::error(self.message.clone()))
                .unwrap_or_else(|_| json!({ "status": "error", "message": self.message }))
        }
    }

    // ---- Constructors ----

    pub fn missing_tenant_key() -> Self {
        Self::new(ErrorKind::MissingTenantKey, "Missing clientKey")
    }

    pub fn missing_time_range() -> Self {
        Self::new(
            ErrorKind::MissingTimeRange,
            "startTime and endTime are required ISO strings",
        )
    }

    pub fn malformed_body() -> Self {
        Self::new(
            ErrorKind::MalformedBody,
            "Failed to parse the request body as JSON",
        )
    }

    pub fn unknown_tenant(key: &str) -> Self {
        Self::new(ErrorKind::UnknownTenant, format!("Unknown clientKey: {key}"))
    }

    pub fn missing_configuration(key: &str, prefix: &str) -> Self {
        Self::new(
            ErrorKind::MissingConfiguration,
            format!("Missing env vars for clientKey: {key} (prefix {prefix})"),
        )
    }

    /// An empty or whitespace-only message becomes [`UNKNOWN_ERROR_MESSAGE`].
    pub fn provider_failure(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.trim().is_empty() {
            Self::new(ErrorKind::ProviderFailure, UNKNOWN_ERROR_MESSAGE)
        } else {
            Self::new(ErrorKind::ProviderFailure, msg)
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| {
            let err: &(dyn std::error::Error + 'static) = e.as_ref();
            err
        })
    }
}

/// Return early with a relay error built from one of the constructors.
#[macro_export]
macro_rules! bail_relay {
    ($ctor:ident) => {
        return Err($crate::errors::RelayError::$ctor())
    };
    ($ctor:ident, $($arg:expr),+ $(,)?) => {
        return Err($crate::errors::RelayError::$ctor($($arg),+))
    };
}
