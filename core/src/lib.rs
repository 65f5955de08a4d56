//! Client core for the GRE GeoIP service.
//!
//! # Overview
//! Two remote operations are supported: IP geolocation (`IPLookup`) and
//! country metadata (`Country`). Caller input is validated against the
//! service's fixed vocabularies and turned into a percent-encoded GET
//! request; the JSON answer is returned as a generic `Envelope`.
//!
//! # Design
//! - `GeoIpClient` performs no I/O: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse` (host-does-IO pattern).
//! - `GeoIp` pairs a client with a `Transport` for callers that just want a
//!   blocking call; `UreqTransport` is the default.
//! - Validation failures are `Err`s raised before any network activity. A
//!   remote `status` other than `success` is not an `Err`; it is visible on
//!   the returned `Envelope` and through the client's error flag.

pub mod client;
pub mod config;
pub mod error;
pub mod geoip;
pub mod http;
pub mod request;
pub mod response;
pub mod types;

pub use client::GeoIpClient;
pub use config::{ClientConfig, DEFAULT_ENDPOINT, SOURCE_TAG};
pub use error::{ApiError, ValidationError};
pub use geoip::GeoIp;
pub use http::{HttpRequest, HttpResponse, Transport};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use request::LookupRequest;
pub use response::Envelope;
pub use types::{Language, Mode, Module, Operation};
