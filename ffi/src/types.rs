//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, a pointer plus length instead of `Vec`,
//! and enums with explicit discriminants. Conversions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use geoip_core::{ApiError, Envelope, HttpRequest, ValidationError};

/// Opaque handle to a `GeoIpClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiGeoIpClient {
    pub(crate) inner: geoip_core::GeoIpClient,
}

/// Copy `s` into a heap C string. Interior NULs yield an empty string.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A GET request described as C-compatible plain data.
///
/// The C caller performs the request and hands the answer back through
/// `geoip_parse_lookup` / `geoip_parse_country`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers: Box<[FfiHeader]> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let headers_len = headers.len() as u32;
        let headers = if headers.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            url: c_string(req.url),
            headers,
            headers_len,
        }))
    }

    /// Release a request previously returned by `from_core`.
    ///
    /// # Safety
    /// `req` must come from `from_core` and not have been freed already.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    }
}

/// An HTTP response described as C-compatible plain data.
///
/// Built by the C caller, usually on the stack. The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiGeoIpResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    MissingSubject = 1,
    InvalidModule = 2,
    InvalidLanguage = 3,
    InvalidMode = 4,
    Transport = 5,
    Deserialization = 6,
    Panic = 7,
    NullArg = 8,
    InvalidUtf8 = 9,
}

/// Tag that tells `geoip_free_result` what `FfiGeoIpResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is an `FfiHttpRequest*`.
    Request = 1,
    /// `data` is a NUL-terminated JSON document (`char*`).
    Json = 2,
}

/// Result envelope for every build and parse function.
///
/// On success `error_code` is `Ok`, `error_message` is null and `data` holds
/// the payload described by `data_tag`. `remote_error` is set when a parsed
/// body carries a `status` other than `"success"`; the body is still in
/// `data`. On failure `data` is null and `error_message` explains why.
#[repr(C)]
pub struct FfiGeoIpResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub remote_error: bool,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiGeoIpResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        FfiGeoIpResult {
            error_code,
            error_message: c_string(msg),
            remote_error: false,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
        .boxed()
    }

    pub(crate) fn ok_request(req: HttpRequest) -> *mut Self {
        FfiGeoIpResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            remote_error: false,
            data_tag: FfiDataTag::Request,
            data: FfiHttpRequest::from_core(req) as *mut c_void,
        }
        .boxed()
    }

    pub(crate) fn ok_envelope(envelope: Envelope) -> *mut Self {
        let remote_error = envelope.is_remote_error();
        let json = envelope.into_value().to_string();
        FfiGeoIpResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            remote_error,
            data_tag: FfiDataTag::Json,
            data: c_string(json) as *mut c_void,
        }
        .boxed()
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::Validation(ValidationError::MissingSubject { .. }) => FfiErrorCode::MissingSubject,
            ApiError::Validation(ValidationError::InvalidModule(_)) => FfiErrorCode::InvalidModule,
            ApiError::Validation(ValidationError::InvalidLanguage(_)) => FfiErrorCode::InvalidLanguage,
            ApiError::Validation(ValidationError::InvalidMode(_)) => FfiErrorCode::InvalidMode,
            ApiError::Transport(_) => FfiErrorCode::Transport,
            ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
        };
        Self::failure(code, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn invalid_utf8(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::InvalidUtf8, format!("argument is not valid UTF-8: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    /// Release a result and whatever `data` points to.
    ///
    /// # Safety
    /// `result` must come from one of the constructors above and not have
    /// been freed already.
    pub(crate) unsafe fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Request => unsafe { FfiHttpRequest::free(result.data as *mut FfiHttpRequest) },
            FfiDataTag::Json => drop(unsafe { CString::from_raw(result.data as *mut c_char) }),
            FfiDataTag::None => {}
        }
    }
}
