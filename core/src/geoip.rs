//! Blocking façade: validation, one round-trip, interpretation.

use crate::client::GeoIpClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::request::LookupRequest;
use crate::types::Operation;
use crate::response::Envelope;

#[cfg(feature = "ureq")]
use crate::http::UreqTransport;

/// A `GeoIpClient` paired with the transport that executes its requests.
///
/// Each call makes at most one HTTP request and never retries. Validation
/// failures return before the transport is touched.
#[derive(Debug, Clone)]
pub struct GeoIp<T> {
    client: GeoIpClient,
    transport: T,
}

#[cfg(feature = "ureq")]
impl GeoIp<UreqTransport> {
    /// Client for the hosted endpoint with no key set.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

#[cfg(feature = "ureq")]
impl Default for GeoIp<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> GeoIp<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            client: GeoIpClient::with_config(config),
            transport,
        }
    }

    pub fn set_key(&mut self, key: &str) -> bool {
        self.client.set_key(key)
    }

    pub fn config(&self) -> &ClientConfig {
        self.client.config()
    }

    pub fn client(&self) -> &GeoIpClient {
        &self.client
    }

    /// Whether the most recent call failed in any way, including a remote
    /// `status` other than `success`.
    pub fn is_error(&self) -> bool {
        self.client.is_error()
    }

    /// Look up an IP address. `modules` may contain `location`, `security`,
    /// `timezone`, `currency` and `device`.
    pub fn lookup<S: AsRef<str>>(
        &self,
        ip: &str,
        modules: &[S],
        lang: &str,
        mode: &str,
    ) -> Result<Envelope, ApiError> {
        let request = self.client.build_lookup(ip, modules, lang, mode)?;
        let response = self.send(&request)?;
        self.client.parse_lookup(response)
    }

    /// Look up a country by ISO 3166-1 alpha-2 code. `modules` may contain
    /// `language`, `flag`, `currency` and `timezone`.
    pub fn country<S: AsRef<str>>(
        &self,
        country_code: &str,
        modules: &[S],
        lang: &str,
        mode: &str,
    ) -> Result<Envelope, ApiError> {
        let request = self.client.build_country(country_code, modules, lang, mode)?;
        let response = self.send(&request)?;
        self.client.parse_country(response)
    }

    /// Like `lookup`, but a body that is not JSON yields `Ok(None)`.
    pub fn lookup_lenient<S: AsRef<str>>(
        &self,
        ip: &str,
        modules: &[S],
        lang: &str,
        mode: &str,
    ) -> Result<Option<Envelope>, ApiError> {
        let request = self.client.build_lookup(ip, modules, lang, mode)?;
        let response = self.send(&request)?;
        Ok(self.client.parse_lenient(response))
    }

    /// Like `country`, but a body that is not JSON yields `Ok(None)`.
    pub fn country_lenient<S: AsRef<str>>(
        &self,
        country_code: &str,
        modules: &[S],
        lang: &str,
        mode: &str,
    ) -> Result<Option<Envelope>, ApiError> {
        let request = self.client.build_country(country_code, modules, lang, mode)?;
        let response = self.send(&request)?;
        Ok(self.client.parse_lenient(response))
    }

    /// Run an already validated request. Use this with `Language::default()`
    /// and `Mode::default()` for the service's `EN` / `live` defaults.
    pub fn execute(&self, request: &LookupRequest) -> Result<Envelope, ApiError> {
        let http_request = self.client.build_request(request);
        let response = self.send(&http_request)?;
        match request.operation() {
            Operation::IpLookup => self.client.parse_lookup(response),
            Operation::Country => self.client.parse_country(response),
        }
    }

    /// Like `execute`, but a body that is not JSON yields `Ok(None)`.
    pub fn execute_lenient(&self, request: &LookupRequest) -> Result<Option<Envelope>, ApiError> {
        let http_request = self.client.build_request(request);
        let response = self.send(&http_request)?;
        Ok(self.client.parse_lenient(response))
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request).inspect_err(|err| {
            tracing::warn!(%err, "GeoIP request failed");
            self.client.flag_error();
        })
    }
}
