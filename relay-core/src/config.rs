//! # Relay configuration
//!
//! A plain string key/value store. The binary fills a [`RelayConfig`] once at
//! startup (environment, `.env`, defaults) and freezes it into a
//! [`RelayConfigSnapshot`], which is the only thing request handling sees.
//!
//! ```rust
//! use relay_core::RelayConfig;
//!
//! let mut config = RelayConfig::new();
//! config.set("http.port", "8080");
//! config.set("SALON_GOOGLE_CLIENT_ID", "id");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get("http.port"), Some("8080"));
//! assert_eq!(snapshot.get_u64("http.port"), Some(8080));
//! ```
//!
//! Tenant credentials are stored under their environment names
//! (`{PREFIX}_GOOGLE_CLIENT_ID` and friends); everything else uses dotted
//! lowercase keys.

use std::collections::HashMap;

/// Key holding the tenant table (`key=PREFIX,key2=PREFIX2`).
pub const TENANTS_KEY: &str = "relay.tenants";
/// Key holding the optional provider timeout, in seconds.
pub const PROVIDER_TIMEOUT_KEY: &str = "relay.provider.timeout_secs";

#[derive(Default)]
pub struct RelayConfig {
    values: HashMap<String, String>,
}

impl RelayConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> RelayConfigSnapshot {
        RelayConfigSnapshot::new(self.values.clone())
    }
}

/// Immutable view of the configuration, shared by every request.
#[derive(Clone, Default)]
pub struct RelayConfigSnapshot {
    map: HashMap<String, String>,
}

impl RelayConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    /// Like [`get`](Self::get), but treats empty and whitespace-only values as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }
}

// Values include client secrets; only the keys are printed.
impl std::fmt::Debug for RelayConfigSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.map.keys().collect();
        keys.sort();
        f.debug_struct("RelayConfigSnapshot").field("keys", &keys).finish()
    }
}

// Values include client secrets; only the keys are printed.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("RelayConfig").field("keys", &keys).finish()
    }
}
