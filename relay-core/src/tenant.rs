//! Multi-tenant types: the tenant table and per-tenant OAuth credentials.

use std::fmt;

use anyhow::{anyhow, bail, Result};
use tracing::debug;

use crate::config::{RelayConfigSnapshot, TENANTS_KEY};
use crate::errors::{RelayError, RelayResult};

/// Tenant table used when `relay.tenants` is not configured.
pub const DEFAULT_TENANTS: &[(&str, &str)] = &[("demo-salon", "SALON"), ("demo-dentist", "DENTIST")];

/// The client key identifying a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantKey(pub String);

impl TenantKey {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantEntry {
    pub key: TenantKey,
    /// Namespace for this tenant's configuration keys, e.g. `SALON`.
    pub prefix: String,
}

impl TenantEntry {
    pub fn client_id_key(&self) -> String {
        format!("{}_GOOGLE_CLIENT_ID", self.prefix)
    }

    pub fn client_secret_key(&self) -> String {
        format!("{}_GOOGLE_CLIENT_SECRET", self.prefix)
    }

    pub fn refresh_token_key(&self) -> String {
        format!("{}_GOOGLE_REFRESH_TOKEN", self.prefix)
    }
}

/// Ordered mapping from tenant key to configuration prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantTable {
    entries: Vec<TenantEntry>,
}

impl Default for TenantTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_TENANTS
                .iter()
                .map(|(key, prefix)| TenantEntry {
                    key: TenantKey::new(*key),
                    prefix: (*prefix).to_string(),
                })
                .collect(),
        }
    }
}

impl TenantTable {
    /// Parse `key=PREFIX,key2=PREFIX2`. Whitespace around items is ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut table = Self { entries: Vec::new() };
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, prefix) = item
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid tenant entry `{item}`, expected key=PREFIX"))?;
            table.push(TenantEntry {
                key: TenantKey::new(key.trim()),
                prefix: prefix.trim().to_string(),
            })?;
        }
        Ok(table)
    }

    /// Read the table from `relay.tenants`, falling back to [`DEFAULT_TENANTS`]
    /// when the key is unset or blank.
    pub fn from_config(config: &RelayConfigSnapshot) -> Result<Self> {
        match config.get_non_empty(TENANTS_KEY) {
            Some(raw) => Self::parse(raw),
            None => Ok(Self::default()),
        }
    }

    fn push(&mut self, entry: TenantEntry) -> Result<()> {
        if entry.key.as_str().is_empty() {
            bail!("Tenant key must not be empty");
        }
        if entry.prefix.is_empty() {
            bail!("Tenant `{}` has an empty prefix", entry.key);
        }
        if self.get(entry.key.as_str()).is_some() {
            bail!("Tenant `{}` is configured twice", entry.key);
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&TenantEntry> {
        self.entries.iter().find(|e| e.key.as_str() == key)
    }

    pub fn prefix_for(&self, key: &str) -> Option<&str> {
        self.get(key).map(|e| e.prefix.as_str())
    }

    /// Tenant keys in configuration order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key.0.clone()).collect()
    }

    pub fn entries(&self) -> &[TenantEntry] {
        &self.entries
    }
}

/// OAuth client credentials for one tenant.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Resolves a tenant key to its credentials.
///
/// Borrows the table and the config snapshot; building one is free, and a
/// fresh [`CredentialSet`] is returned on every call.
#[derive(Debug, Clone, Copy)]
pub struct CredentialResolver<'a> {
    tenants: &'a TenantTable,
    config: &'a RelayConfigSnapshot,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(tenants: &'a TenantTable, config: &'a RelayConfigSnapshot) -> Self {
        Self { tenants, config }
    }

    pub fn resolve(&self, key: &str) -> RelayResult<CredentialSet> {
        let entry = self
            .tenants
            .get(key)
            .ok_or_else(|| RelayError::unknown_tenant(key))?;

        // Empty means missing; whitespace is left for the provider to reject.
        let value = |key: String| self.config.get(&key).filter(|v| !v.is_empty());
        let client_id = value(entry.client_id_key());
        let client_secret = value(entry.client_secret_key());
        let refresh_token = value(entry.refresh_token_key());

        let (Some(client_id), Some(client_secret), Some(refresh_token)) =
            (client_id, client_secret, refresh_token)
        else {
            return Err(RelayError::missing_configuration(key, &entry.prefix));
        };

        debug!(tenant = key, prefix = %entry.prefix, "resolved tenant credentials");

        Ok(CredentialSet {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            refresh_token: refresh_token.to_string(),
        })
    }
}
