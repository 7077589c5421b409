//! relay-axum: Axum adapter for calendar-relay.
//!
//! Mounts the status and scheduling routes on top of a [`RelayApp`] and maps
//! [`RelayError`](relay_core::RelayError) values onto HTTP responses.
//!
//! [`RelayApp`]: relay_core::RelayApp

pub mod app;
pub mod rest;
pub mod state;
mod error;
pub use error::RelayAxumError;
pub use state::RelayAxumState;

pub use app::{axum, AxumApp};
