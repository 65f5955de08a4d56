//! Decoded response body.
//!
//! # Design
//! The service's response shape depends on the requested modules and is not
//! under this crate's control, so `Envelope` keeps the decoded JSON as a
//! `serde_json::Value`. The only field interpreted here is `status`.

use serde_json::{Map, Value};

use crate::error::ApiError;

const SUCCESS: &str = "success";

/// A decoded response, returned verbatim whatever its `status` says.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    value: Value,
}

impl Envelope {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Decode `body` as JSON. Malformed input is a `Deserialization` error.
    pub fn decode(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body)
            .map(Self::new)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Decode `body`, yielding `None` instead of an error for malformed JSON.
    pub fn decode_lenient(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok().map(Self::new)
    }

    /// The `status` value, if the body is a mapping that has one.
    pub fn status(&self) -> Option<&Value> {
        self.value.as_object()?.get("status")
    }

    /// `true` when the body is a mapping whose `status` key holds anything
    /// other than the string `"success"`. A missing `status` is not an error.
    pub fn is_remote_error(&self) -> bool {
        self.status().is_some_and(|s| s.as_str() != Some(SUCCESS))
    }

    /// The service's `message` field, typically present on error responses.
    pub fn message(&self) -> Option<&str> {
        self.get("message")?.as_str()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.as_object()?.get(key)
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.value.as_object()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl From<Value> for Envelope {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
