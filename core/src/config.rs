//! Client configuration: API key and service endpoint.
//!
//! # Design
//! The endpoint is fixed when the config is created; only the key can change
//! afterwards. An empty key means "unset" and is still sent as `key=` so the
//! remote service reports the problem itself.

use std::fmt;

/// Root URL of the hosted GeoIP service.
pub const DEFAULT_ENDPOINT: &str = "https://gregeoip.com/";

/// Value of the `source` query parameter identifying this SDK.
pub const SOURCE_TAG: &str = "Rust-SDK";

/// Environment variable holding the API key for `ClientConfig::from_env`.
pub const ENV_API_KEY: &str = "GEOIP_API_KEY";

/// Environment variable overriding the endpoint for `ClientConfig::from_env`.
pub const ENV_ENDPOINT: &str = "GEOIP_ENDPOINT";

#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    endpoint: String,
}

impl ClientConfig {
    pub fn new(endpoint: &str) -> Self {
        Self {
            api_key: String::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Build a config from `GEOIP_API_KEY` and `GEOIP_ENDPOINT`, falling back
    /// to an unset key and `DEFAULT_ENDPOINT`.
    pub fn from_env() -> Self {
        let endpoint = std::env::var(ENV_ENDPOINT)
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let mut config = Self::new(&endpoint);
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            config.set_key(&key);
        }
        config
    }

    /// Store `key` if it is non-empty. Returns `false` and keeps the previous
    /// key otherwise. The key's format is not checked.
    pub fn set_key(&mut self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.api_key = key.to_string();
        true
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Endpoint without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL of an operation path, e.g. `https://gregeoip.com/IPLookup`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.has_key() { "<redacted>" } else { "<unset>" };
        f.debug_struct("ClientConfig")
            .field("api_key", &key)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
