use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};
use relay_core::config::{PROVIDER_TIMEOUT_KEY, TENANTS_KEY};
use relay_core::{RelayConfig, TenantTable};
use relay_oauth::{AUTH_URL_KEY, ENDPOINT_KEY, TOKEN_URL_KEY};
use tracing::warn;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "8080";

/// Build the relay configuration from the process environment.
///
/// Call once at startup, after `.env` has been loaded.
pub fn load() -> Result<RelayConfig> {
    from_vars(env::vars())
}

/// Build the relay configuration from an explicit set of variables.
pub fn from_vars<I>(vars: I) -> Result<RelayConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: HashMap<String, String> = vars.into_iter().collect();
    let mut config = RelayConfig::new();

    // HTTP Server Configuration
    configure_http(&mut config, &vars);

    // Tenant table + per-tenant Google credentials
    configure_tenants(&mut config, &vars)?;

    // External API Configuration
    configure_google(&mut config, &vars)?;

    Ok(config)
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Configure HTTP server settings
fn configure_http(config: &mut RelayConfig, vars: &HashMap<String, String>) {
    config.set("http.host", non_empty(vars, "HTTP_HOST").unwrap_or(DEFAULT_HOST));
    config.set("http.port", non_empty(vars, "PORT").unwrap_or(DEFAULT_PORT));
}

/// Copy each tenant's three credential values under their own names.
///
/// Only prefixes named in the tenant table are read. A tenant with missing
/// values is still served; its requests fail at resolution time.
fn configure_tenants(config: &mut RelayConfig, vars: &HashMap<String, String>) -> Result<()> {
    if let Some(raw) = non_empty(vars, "RELAY_TENANTS") {
        config.set(TENANTS_KEY, raw);
    }

    let tenants = TenantTable::from_config(&config.snapshot())?;

    for entry in tenants.entries() {
        let keys = [
            entry.client_id_key(),
            entry.client_secret_key(),
            entry.refresh_token_key(),
        ];
        let mut complete = true;
        for key in keys {
            match vars.get(&key) {
                Some(value) if !value.is_empty() => config.set(key, value.as_str()),
                _ => complete = false,
            }
        }
        if !complete {
            warn!(
                tenant = %entry.key,
                prefix = %entry.prefix,
                "tenant credentials incomplete; scheduling for this tenant will fail"
            );
        }
    }

    Ok(())
}

/// Configure the Google collaborator
fn configure_google(config: &mut RelayConfig, vars: &HashMap<String, String>) -> Result<()> {
    for (env_key, config_key) in [
        ("GOOGLE_CALENDAR_ENDPOINT", ENDPOINT_KEY),
        ("GOOGLE_AUTH_URL", AUTH_URL_KEY),
        ("GOOGLE_TOKEN_URL", TOKEN_URL_KEY),
    ] {
        if let Some(value) = non_empty(vars, env_key) {
            config.set(config_key, value);
        }
    }

    // 0 disables the timeout
    if let Some(value) = non_empty(vars, "RELAY_PROVIDER_TIMEOUT_SECS") {
        value.parse::<u64>().with_context(|| {
            format!("RELAY_PROVIDER_TIMEOUT_SECS must be a whole number of seconds, got `{value}`")
        })?;
        config.set(PROVIDER_TIMEOUT_KEY, value);
    }

    Ok(())
}
