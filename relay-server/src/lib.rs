pub mod config;

use std::sync::Arc;

use anyhow::Result;
use relay_axum::{axum, AxumApp};
use relay_core::{CalendarProvider, RelayApp, RelayConfig};
use relay_oauth::{GoogleCalendarOptions, GoogleCalendarProvider};

/// Build the relay from the process environment, talking to Google.
pub fn build() -> Result<AxumApp> {
    let config = config::load()?;
    let options = GoogleCalendarOptions::from_config(&config.snapshot());
    let provider = GoogleCalendarProvider::new(options)?;
    build_with(&config, Arc::new(provider))
}

/// Build the relay from explicit configuration and provider.
pub fn build_with(config: &RelayConfig, provider: Arc<dyn CalendarProvider>) -> Result<AxumApp> {
    let app = RelayApp::new(config, provider)?;
    Ok(axum(app))
}
