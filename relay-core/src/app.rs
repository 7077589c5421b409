use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::{RelayConfig, RelayConfigSnapshot};
use crate::errors::RelayResult;
use crate::provider::CalendarProvider;
use crate::schedule::{self, ScheduleResult, SchedulingRequest};
use crate::tenant::{CredentialResolver, TenantTable};

/// Name reported by the status endpoint.
pub const SERVICE_NAME: &str = "google-calendar-mcp";

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub ok: bool,
    pub service: String,
    pub clients: Vec<String>,
}

struct RelayAppInner {
    config: RelayConfigSnapshot,
    tenants: TenantTable,
    provider: Arc<dyn CalendarProvider>,
}

/// RelayApp is the application container.
///
/// Framework-agnostic and immutable once built. Holds:
/// - the frozen config snapshot
/// - the tenant table
/// - the calendar provider
///
/// Cloning is cheap; every clone shares the same state.
#[derive(Clone)]
pub struct RelayApp {
    inner: Arc<RelayAppInner>,
}

impl RelayApp {
    /// Freeze `config` and read the tenant table out of it.
    pub fn new(config: &RelayConfig, provider: Arc<dyn CalendarProvider>) -> Result<Self> {
        let config = config.snapshot();
        let tenants = TenantTable::from_config(&config)?;
        Ok(Self::from_parts(config, tenants, provider))
    }

    pub fn from_parts(
        config: RelayConfigSnapshot,
        tenants: TenantTable,
        provider: Arc<dyn CalendarProvider>,
    ) -> Self {
        info!(
            tenants = ?tenants.keys(),
            provider = provider.name(),
            "relay app configured"
        );
        Self {
            inner: Arc::new(RelayAppInner {
                config,
                tenants,
                provider,
            }),
        }
    }

    /// Shorthand for `config().get_string(key)`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.config.get_string(key)
    }

    pub fn tenants(&self) -> &TenantTable {
        &self.inner.tenants
    }

    pub fn resolver(&self) -> CredentialResolver<'_> {
        CredentialResolver::new(&self.inner.tenants, &self.inner.config)
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            ok: true,
            service: SERVICE_NAME.to_string(),
            clients: self.inner.tenants.keys(),
        }
    }

    /// Parse a raw body, then [`schedule`](Self::schedule) it.
    pub async fn schedule_body(&self, body: &[u8]) -> RelayResult<ScheduleResult> {
        match SchedulingRequest::from_body(body) {
            Ok(request) => self.schedule(request).await,
            Err(err) => {
                error!(kind = err.name(), len = body.len(), "schedule error: {}", err.message);
                Err(err)
            }
        }
    }

    /// Validate, resolve, translate and forward one request.
    ///
    /// Failures are logged here, once, and returned to the caller.
    pub async fn schedule(&self, request: SchedulingRequest) -> RelayResult<ScheduleResult> {
        let client_key = request.client_key_text();

        let result = schedule::handle(self.resolver(), self.inner.provider.as_ref(), request).await;

        match &result {
            Ok(scheduled) => {
                info!(tenant = %client_key, result = ?scheduled, "event scheduled");
            }
            Err(err) => {
                error!(tenant = %client_key, kind = err.name(), "schedule error: {}", err.message);
            }
        }

        result
    }
}
