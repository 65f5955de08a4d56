//! Request builder and response interpreter for the GeoIP API.
//!
//! # Design
//! `GeoIpClient` holds the configuration and performs no I/O. Each operation
//! is split into a `build_*` method that validates caller input and produces
//! an `HttpRequest`, and a `parse_*` method that decodes the `HttpResponse`.
//! The caller (or `GeoIp`) executes the round-trip in between.
//!
//! The outcome of a call is carried by its return value: a validation or
//! decode failure is an `Err`, a remote failure is an `Envelope` with
//! `is_remote_error()` set. The client also keeps a sticky `is_error` flag
//! for callers that poll it after a call. The flag is reset when a new
//! request is built, so it reflects the most recent call only, and it is
//! shared by every thread using the same client: concurrent calls overwrite
//! each other's value.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::LookupRequest;
use crate::response::Envelope;
use crate::types::Operation;

#[derive(Debug)]
pub struct GeoIpClient {
    config: ClientConfig,
    is_error: AtomicBool,
}

impl GeoIpClient {
    pub fn new(endpoint: &str) -> Self {
        Self::with_config(ClientConfig::new(endpoint))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            is_error: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Store a non-empty API key. See `ClientConfig::set_key`.
    pub fn set_key(&mut self, key: &str) -> bool {
        self.config.set_key(key)
    }

    /// Whether the most recent build or parse on this client failed.
    pub fn is_error(&self) -> bool {
        self.is_error.load(Ordering::Relaxed)
    }

    pub fn clear_error(&self) {
        self.is_error.store(false, Ordering::Relaxed);
    }

    /// Build an `IPLookup` request for `ip`.
    pub fn build_lookup<S: AsRef<str>>(
        &self,
        ip: &str,
        modules: &[S],
        lang: &str,
        mode: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.build(Operation::IpLookup, ip, modules, lang, mode)
    }

    /// Build a `Country` request for an ISO 3166-1 alpha-2 `country_code`.
    pub fn build_country<S: AsRef<str>>(
        &self,
        country_code: &str,
        modules: &[S],
        lang: &str,
        mode: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.build(Operation::Country, country_code, modules, lang, mode)
    }

    /// Build the HTTP request for an already validated `LookupRequest`.
    pub fn build_request(&self, request: &LookupRequest) -> HttpRequest {
        self.clear_error();
        tracing::debug!(
            operation = %request.operation(),
            subject = request.subject(),
            params = %request.params_token(),
            lang = %request.language(),
            mode = %request.mode(),
            has_key = self.config.has_key(),
            "built GeoIP request"
        );
        HttpRequest {
            url: request.to_url(&self.config),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }

    pub fn parse_lookup(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse(Operation::IpLookup, response)
    }

    pub fn parse_country(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse(Operation::Country, response)
    }

    /// Decode without failing on malformed JSON: such bodies yield `None`
    /// instead of an `Err`.
    ///
    /// Unlike the service's older clients, which leave their error flag
    /// untouched when the body does not decode, this sets the flag: a `None`
    /// here is still a failed call.
    pub fn parse_lenient(&self, response: HttpResponse) -> Option<Envelope> {
        match Envelope::decode_lenient(&response.body) {
            Some(envelope) => {
                self.note_status(None, &envelope);
                Some(envelope)
            }
            None => {
                tracing::debug!(http_status = response.status, "GeoIP response is not JSON");
                self.flag_error();
                None
            }
        }
    }

    fn build<S: AsRef<str>>(
        &self,
        operation: Operation,
        subject: &str,
        modules: &[S],
        lang: &str,
        mode: &str,
    ) -> Result<HttpRequest, ApiError> {
        match LookupRequest::validate(operation, subject, modules, lang, mode) {
            Ok(request) => Ok(self.build_request(&request)),
            Err(err) => {
                self.flag_error();
                Err(err.into())
            }
        }
    }

    fn parse(&self, operation: Operation, response: HttpResponse) -> Result<Envelope, ApiError> {
        let envelope = Envelope::decode(&response.body).inspect_err(|err| {
            tracing::debug!(%operation, http_status = response.status, %err, "undecodable GeoIP response");
            self.flag_error();
        })?;
        self.note_status(Some(operation), &envelope);
        Ok(envelope)
    }

    fn note_status(&self, operation: Option<Operation>, envelope: &Envelope) {
        if envelope.is_remote_error() {
            tracing::warn!(
                operation = operation.map(|op| op.path()),
                status = ?envelope.status(),
                message = envelope.message(),
                "GeoIP service reported an error"
            );
            self.flag_error();
        }
    }

    pub(crate) fn flag_error(&self) {
        self.is_error.store(true, Ordering::Relaxed);
    }
}

impl Clone for GeoIpClient {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            is_error: AtomicBool::new(self.is_error()),
        }
    }
}

impl Default for GeoIpClient {
    fn default() -> Self {
        Self::with_config(ClientConfig::default())
    }
}
