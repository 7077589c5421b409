//! relay-oauth: the Google Calendar collaborator.
//!
//! Each call exchanges the tenant's refresh token for an access token and
//! creates one event through the Calendar v3 REST API.

pub mod google;
pub mod oauth2_client;

pub use google::*;
pub use oauth2_client::*;
