//! C-ABI wrapper around `geoip-core`.
//!
//! # Overview
//! Exposes request building and response interpretation for both GeoIP
//! operations through `extern "C"` functions, so any language with a C FFI
//! can validate input and build queries exactly like the Rust client while
//! doing the HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Build and parse functions mirror `GeoIpClient` 1:1 and all return an
//!   `FfiGeoIpResult`, so validation messages reach the C caller.
//! - The C caller owns every returned pointer and must release it with the
//!   matching `geoip_*_free` / `geoip_free_*` function.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use geoip_core::{ClientConfig, GeoIpClient, HttpResponse, Operation};

use types::*;

/// Why a C argument could not be read.
enum ArgError {
    Null(&'static str),
    InvalidUtf8(&'static str),
}

impl ArgError {
    fn into_result(self) -> *mut FfiGeoIpResult {
        match self {
            ArgError::Null(name) => FfiGeoIpResult::null_arg(name),
            ArgError::InvalidUtf8(name) => FfiGeoIpResult::invalid_utf8(name),
        }
    }
}

/// Borrow a C string as UTF-8. Null yields `Ok(None)`; invalid UTF-8 is an
/// error naming the argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_str<'a>(ptr: *const c_char, name: &'static str) -> Result<Option<&'a str>, ArgError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(Some)
        .map_err(|_| ArgError::InvalidUtf8(name))
}

/// Read `len` module names. Null entries are treated as empty and skipped by
/// validation.
///
/// # Safety
/// `modules` must be null (with `len == 0`) or point to `len` string pointers.
unsafe fn read_modules<'a>(modules: *const *const c_char, len: u32) -> Result<Vec<&'a str>, ArgError> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if modules.is_null() {
        return Err(ArgError::Null("modules"));
    }
    let ptrs = unsafe { std::slice::from_raw_parts(modules, len as usize) };
    ptrs.iter()
        .map(|p| unsafe { read_str(*p, "modules") }.map(Option::unwrap_or_default))
        .collect()
}

/// Caller input for a build call, borrowed from C strings.
struct BuildArgs<'a> {
    subject: &'a str,
    modules: Vec<&'a str>,
    lang: &'a str,
    mode: &'a str,
}

/// # Safety
/// Same contract as `read_str` / `read_modules` for each pointer.
unsafe fn read_build_args<'a>(
    subject: *const c_char,
    modules: *const *const c_char,
    modules_len: u32,
    lang: *const c_char,
    mode: *const c_char,
) -> Result<BuildArgs<'a>, ArgError> {
    Ok(BuildArgs {
        modules: unsafe { read_modules(modules, modules_len) }?,
        subject: unsafe { read_str(subject, "subject") }?.unwrap_or_default(),
        lang: unsafe { read_str(lang, "lang") }?.unwrap_or("EN"),
        mode: unsafe { read_str(mode, "mode") }?.unwrap_or("live"),
    })
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `endpoint`, or to the hosted service when
/// `endpoint` is null.
///
/// Returns null if `endpoint` is not valid UTF-8 or an internal panic
/// occurs. The caller must free the returned pointer with `geoip_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_client_new(endpoint: *const c_char) -> *mut FfiGeoIpClient {
    catch_unwind(|| {
        let config = match unsafe { read_str(endpoint, "endpoint") } {
            Ok(Some(url)) => ClientConfig::new(url),
            Ok(None) => ClientConfig::default(),
            Err(_) => return std::ptr::null_mut(),
        };
        let inner = GeoIpClient::with_config(config);
        Box::into_raw(Box::new(FfiGeoIpClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `geoip_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_client_free(client: *mut FfiGeoIpClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Store a non-empty API key. Returns false for a null or empty key, or one
/// that is not valid UTF-8; the previous key is then kept.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_set_key(client: *mut FfiGeoIpClient, key: *const c_char) -> bool {
    catch_unwind(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &mut *client };
        match unsafe { read_str(key, "key") } {
            Ok(Some(key)) => client.inner.set_key(key),
            _ => false,
        }
    })
    .unwrap_or(false)
}

/// Whether the most recent build or parse on `client` failed, including a
/// remote `status` other than `success`. Returns false for null.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_client_is_error(client: *const FfiGeoIpClient) -> bool {
    if client.is_null() {
        return false;
    }
    catch_unwind(|| unsafe { &*client }.inner.is_error()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build an `IPLookup` request.
///
/// `modules` points to `modules_len` C strings (may be null when the length
/// is 0). A null `lang` or `mode` selects `EN` / `live`. Any argument that
/// is not valid UTF-8 fails with `InvalidUtf8`. On success the result's
/// `data` is an `FfiHttpRequest*`.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_build_lookup(
    client: *const FfiGeoIpClient,
    ip: *const c_char,
    modules: *const *const c_char,
    modules_len: u32,
    lang: *const c_char,
    mode: *const c_char,
) -> *mut FfiGeoIpResult {
    build(Operation::IpLookup, client, ip, modules, modules_len, lang, mode)
}

/// Build a `Country` request. Same conventions as `geoip_build_lookup`.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_build_country(
    client: *const FfiGeoIpClient,
    country_code: *const c_char,
    modules: *const *const c_char,
    modules_len: u32,
    lang: *const c_char,
    mode: *const c_char,
) -> *mut FfiGeoIpResult {
    build(Operation::Country, client, country_code, modules, modules_len, lang, mode)
}

fn build(
    operation: Operation,
    client: *const FfiGeoIpClient,
    subject: *const c_char,
    modules: *const *const c_char,
    modules_len: u32,
    lang: *const c_char,
    mode: *const c_char,
) -> *mut FfiGeoIpResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiGeoIpResult::null_arg("client");
        }
        let client = unsafe { &*client };
        let args = match unsafe { read_build_args(subject, modules, modules_len, lang, mode) } {
            Ok(args) => args,
            Err(err) => return err.into_result(),
        };

        let built = match operation {
            Operation::IpLookup => {
                client.inner.build_lookup(args.subject, args.modules.as_slice(), args.lang, args.mode)
            }
            Operation::Country => {
                client.inner.build_country(args.subject, args.modules.as_slice(), args.lang, args.mode)
            }
        };
        match built {
            Ok(req) => FfiGeoIpResult::ok_request(req),
            Err(err) => FfiGeoIpResult::from_error(err),
        }
    })
    .unwrap_or_else(|_| FfiGeoIpResult::panic("panic in build"))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> Result<HttpResponse, ArgError> {
    let body = unsafe { read_str(resp.body, "response.body") }?.unwrap_or_default();
    Ok(HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: body.to_string(),
    })
}

/// Interpret the answer to an `IPLookup` request. On success `data` is the
/// decoded JSON re-serialized as a C string.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_parse_lookup(
    client: *const FfiGeoIpClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGeoIpResult {
    parse(Operation::IpLookup, client, response)
}

/// Interpret the answer to a `Country` request.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_parse_country(
    client: *const FfiGeoIpClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGeoIpResult {
    parse(Operation::Country, client, response)
}

fn parse(
    operation: Operation,
    client: *const FfiGeoIpClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGeoIpResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiGeoIpResult::null_arg("client");
        }
        if response.is_null() {
            return FfiGeoIpResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let response = match ffi_response_to_core(resp) {
            Ok(response) => response,
            Err(err) => return err.into_result(),
        };
        let parsed = match operation {
            Operation::IpLookup => client.inner.parse_lookup(response),
            Operation::Country => client.inner.parse_country(response),
        };
        match parsed {
            Ok(envelope) => FfiGeoIpResult::ok_envelope(envelope),
            Err(err) => FfiGeoIpResult::from_error(err),
        }
    })
    .unwrap_or_else(|_| FfiGeoIpResult::panic("panic in parse"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiGeoIpResult` and the payload it carries. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn geoip_free_result(result: *mut FfiGeoIpResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiGeoIpResult::free(result) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn new_client(key: &str) -> *mut FfiGeoIpClient {
        let url = CString::new("http://localhost:3000").unwrap();
        let client = geoip_client_new(url.as_ptr());
        assert!(!client.is_null());
        let key = CString::new(key).unwrap();
        geoip_set_key(client, key.as_ptr());
        client
    }

    fn request_url(result: *mut FfiGeoIpResult) -> String {
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Request);
        let req = unsafe { &*(r.data as *const FfiHttpRequest) };
        unsafe { CStr::from_ptr(req.url) }.to_str().unwrap().to_string()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client("k");
        geoip_client_free(client);
    }

    #[test]
    fn client_new_null_uses_hosted_endpoint() {
        let client = geoip_client_new(std::ptr::null());
        let ip = CString::new("8.8.8.8").unwrap();
        let result = geoip_build_lookup(client, ip.as_ptr(), std::ptr::null(), 0, std::ptr::null(), std::ptr::null());
        let url = request_url(result);
        assert!(url.starts_with("https://gregeoip.com/IPLookup?key=&ip=8.8.8.8&lang=EN&params=&mode=live"));
        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn client_free_null_is_safe() {
        geoip_client_free(std::ptr::null_mut());
        geoip_free_result(std::ptr::null_mut());
    }

    #[test]
    fn set_key_rejects_empty_and_null() {
        let client = new_client("first");
        let empty = CString::new("").unwrap();
        assert!(!geoip_set_key(client, empty.as_ptr()));
        assert!(!geoip_set_key(client, std::ptr::null()));
        assert!(!geoip_set_key(std::ptr::null_mut(), empty.as_ptr()));
        let ip = CString::new("1.1.1.1").unwrap();
        let result = geoip_build_lookup(client, ip.as_ptr(), std::ptr::null(), 0, std::ptr::null(), std::ptr::null());
        assert!(request_url(result).contains("key=first&"));
        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn build_lookup_with_modules() {
        let client = new_client("k");
        let ip = CString::new("8.8.8.8").unwrap();
        let location = CString::new("location").unwrap();
        let empty = CString::new("").unwrap();
        let device = CString::new("device").unwrap();
        let modules = [location.as_ptr(), empty.as_ptr(), std::ptr::null(), device.as_ptr()];
        let lang = CString::new("DE").unwrap();
        let mode = CString::new("test").unwrap();

        let result = geoip_build_lookup(
            client,
            ip.as_ptr(),
            modules.as_ptr(),
            modules.len() as u32,
            lang.as_ptr(),
            mode.as_ptr(),
        );
        let url = request_url(result);
        assert!(url.starts_with("http://localhost:3000/IPLookup?"));
        assert!(url.contains("params=location%2Cdevice"));
        assert!(url.contains("lang=DE"));
        assert!(url.contains("mode=test"));

        let r = unsafe { &*result };
        let req = unsafe { &*(r.data as *const FfiHttpRequest) };
        assert_eq!(req.headers_len, 1);
        assert!(!geoip_client_is_error(client));

        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn build_country_invalid_module_reports_message() {
        let client = new_client("k");
        let code = CString::new("US").unwrap();
        let security = CString::new("security").unwrap();
        let modules = [security.as_ptr()];
        let result = geoip_build_country(client, code.as_ptr(), modules.as_ptr(), 1, std::ptr::null(), std::ptr::null());

        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidModule);
        assert!(r.data.is_null());
        let msg = unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap();
        assert!(msg.contains("`security`"));
        assert!(geoip_client_is_error(client));

        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn build_with_null_subject_is_missing_subject() {
        let client = new_client("k");
        let result = geoip_build_country(client, std::ptr::null(), std::ptr::null(), 0, std::ptr::null(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::MissingSubject);
        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn build_with_null_modules_and_length_is_null_arg() {
        let client = new_client("k");
        let ip = CString::new("8.8.8.8").unwrap();
        let result = geoip_build_lookup(client, ip.as_ptr(), std::ptr::null(), 2, std::ptr::null(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn build_null_client_is_null_arg() {
        let ip = CString::new("8.8.8.8").unwrap();
        let result = geoip_build_lookup(std::ptr::null(), ip.as_ptr(), std::ptr::null(), 0, std::ptr::null(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        geoip_free_result(result);
    }

    #[test]
    fn parse_success_returns_json() {
        let client = new_client("k");
        let body = CString::new(r#"{"status":"success","ip":"1.2.3.4"}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = geoip_parse_lookup(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Json);
        assert!(!r.remote_error);

        let json = unsafe { CStr::from_ptr(r.data as *const c_char) }.to_str().unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["ip"], "1.2.3.4");

        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn parse_remote_error_keeps_body() {
        let client = new_client("k");
        let body = CString::new(r#"{"status":"error","message":"invalid key"}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = geoip_parse_country(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.remote_error);
        assert!(!r.data.is_null());
        assert!(geoip_client_is_error(client));

        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn parse_bad_json_is_deserialization_error() {
        let client = new_client("k");
        let body = CString::new("not json").unwrap();
        let resp = FfiHttpResponse {
            status: 502,
            body: body.as_ptr(),
        };
        let result = geoip_parse_lookup(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Deserialization);
        assert!(r.data.is_null());

        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn parse_null_response_is_null_arg() {
        let client = new_client("k");
        let result = geoip_parse_lookup(client, std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        geoip_free_result(result);
        geoip_client_free(client);
    }

    fn non_utf8(bytes: &[u8]) -> CString {
        CString::new(bytes.to_vec()).unwrap()
    }

    #[test]
    fn set_key_rejects_invalid_utf8_and_keeps_previous() {
        let client = new_client("first");
        let key = non_utf8(b"se\xffc");
        assert!(!geoip_set_key(client, key.as_ptr()));

        let ip = CString::new("1.1.1.1").unwrap();
        let result = geoip_build_lookup(client, ip.as_ptr(), std::ptr::null(), 0, std::ptr::null(), std::ptr::null());
        assert!(request_url(result).contains("key=first&"));
        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn build_with_invalid_utf8_subject_is_rejected() {
        let client = new_client("k");
        let ip = non_utf8(b"1.2\xfe");
        let result = geoip_build_lookup(client, ip.as_ptr(), std::ptr::null(), 0, std::ptr::null(), std::ptr::null());

        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidUtf8);
        assert!(r.data.is_null());
        let msg = unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap();
        assert!(msg.contains("subject"));

        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn build_with_invalid_utf8_module_lang_or_mode_is_rejected() {
        let client = new_client("k");
        let code = CString::new("US").unwrap();
        let bad = non_utf8(b"fl\xffag");
        let modules = [bad.as_ptr()];

        let result = geoip_build_country(client, code.as_ptr(), modules.as_ptr(), 1, std::ptr::null(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidUtf8);
        geoip_free_result(result);

        let result = geoip_build_country(client, code.as_ptr(), std::ptr::null(), 0, bad.as_ptr(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidUtf8);
        geoip_free_result(result);

        let result = geoip_build_country(client, code.as_ptr(), std::ptr::null(), 0, std::ptr::null(), bad.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidUtf8);
        geoip_free_result(result);

        geoip_client_free(client);
    }

    #[test]
    fn parse_invalid_utf8_body_is_rejected() {
        let client = new_client("k");
        let body = non_utf8(b"{\"status\":\"succ\xffess\"}");
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = geoip_parse_lookup(client, &resp);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidUtf8);
        geoip_free_result(result);
        geoip_client_free(client);
    }

    #[test]
    fn client_new_with_invalid_utf8_endpoint_is_null() {
        let endpoint = non_utf8(b"http://\xff");
        assert!(geoip_client_new(endpoint.as_ptr()).is_null());
    }
}
