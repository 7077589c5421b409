//! relay-core: framework-agnostic core for calendar-relay.
//!
//! Resolves a tenant's OAuth credentials from an immutable configuration
//! snapshot, validates and translates scheduling requests into calendar
//! events, and hands them to a [`CalendarProvider`].

pub mod app;
pub mod config;
pub mod errors;
pub mod provider;
pub mod schedule;
pub mod tenant;

pub use app::{RelayApp, ServiceStatus, SERVICE_NAME};
pub use config::{RelayConfig, RelayConfigSnapshot};
pub use errors::{ErrorKind, RelayError, RelayResult};
pub use provider::{CalendarProvider, InsertEventRequest, InsertedEvent};
pub use schedule::{EventPayload, ScheduleResult, SchedulingRequest};
pub use tenant::{CredentialResolver, CredentialSet, TenantKey, TenantTable};
