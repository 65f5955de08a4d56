use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Key the mock treats as revoked, alongside the empty key.
pub const INVALID_KEY: &str = "invalid";

const IP_MODULES: &[&str] = &["location", "security", "timezone", "currency", "device"];
const COUNTRY_MODULES: &[&str] = &["language", "flag", "currency", "timezone"];

/// Query parameters of both endpoints. Everything is optional so the mock
/// can answer malformed requests with an error envelope instead of a 400.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApiQuery {
    #[serde(default)]
    pub key: String,
    pub ip: Option<String>,
    #[serde(rename = "CountryCode")]
    pub country_code: Option<String>,
    #[serde(default)]
    pub params: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub source: String,
}

impl ApiQuery {
    /// Requested modules, in order, skipping empty entries.
    pub fn modules(&self) -> Vec<&str> {
        self.params.split(',').filter(|m| !m.is_empty()).collect()
    }
}

/// Number of requests the mock has answered.
pub type Hits = Arc<AtomicUsize>;

pub fn app() -> Router {
    app_with_hits(Hits::default())
}

pub fn app_with_hits(hits: Hits) -> Router {
    Router::new()
        .route("/IPLookup", get(ip_lookup))
        .route("/Country", get(country))
        .with_state(hits)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_hits(listener, Hits::default()).await
}

pub async fn run_with_hits(listener: TcpListener, hits: Hits) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_hits(hits)).await
}

async fn ip_lookup(State(hits): State<Hits>, Query(query): Query<ApiQuery>) -> Json<Value> {
    hits.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(ip = ?query.ip, params = %query.params, "IPLookup");

    let ip = match check(&query, query.ip.as_deref(), "ip", IP_MODULES) {
        Ok(ip) => ip,
        Err(body) => return Json(body),
    };
    let mut body = base(&query);
    body.insert("ip".to_string(), json!(ip));
    for module in query.modules() {
        body.insert(module.to_string(), ip_section(module));
    }
    Json(Value::Object(body))
}

async fn country(State(hits): State<Hits>, Query(query): Query<ApiQuery>) -> Json<Value> {
    hits.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(country = ?query.country_code, params = %query.params, "Country");

    let code = match check(&query, query.country_code.as_deref(), "CountryCode", COUNTRY_MODULES) {
        Ok(code) => code,
        Err(body) => return Json(body),
    };
    let mut body = base(&query);
    body.insert("countryCode".to_string(), json!(code));
    body.insert("name".to_string(), json!(country_name(code)));
    for module in query.modules() {
        body.insert(module.to_string(), country_section(module));
    }
    Json(Value::Object(body))
}

/// Validate key, subject and modules; on failure return the error envelope.
fn check<'a>(
    query: &ApiQuery,
    subject: Option<&'a str>,
    subject_param: &str,
    vocabulary: &[&str],
) -> Result<&'a str, Value> {
    if query.key.is_empty() || query.key == INVALID_KEY {
        return Err(error("invalid key"));
    }
    let subject = match subject {
        Some(s) if !s.is_empty() => s,
        _ => return Err(error(&format!("missing {subject_param}"))),
    };
    if let Some(unknown) = query.modules().into_iter().find(|m| !vocabulary.contains(m)) {
        return Err(error(&format!("unknown module {unknown}")));
    }
    Ok(subject)
}

fn error(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

fn base(query: &ApiQuery) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("status".to_string(), json!("success"));
    body.insert("lang".to_string(), json!(query.lang));
    body.insert("mode".to_string(), json!(query.mode));
    body.insert("source".to_string(), json!(query.source));
    body.insert("params".to_string(), json!(query.modules()));
    body
}

fn ip_section(module: &str) -> Value {
    match module {
        "location" => json!({ "countryCode": "US", "city": "Mountain View", "latitude": 37.386, "longitude": -122.0838 }),
        "security" => json!({ "isProxy": false, "isTor": false, "isCrawler": false }),
        "timezone" => json!({ "name": "America/Los_Angeles", "offset": -25200 }),
        "currency" => json!({ "code": "USD", "symbol": "$" }),
        "device" => json!({ "type": "desktop", "os": "Linux" }),
        _ => Value::Null,
    }
}

fn country_section(module: &str) -> Value {
    match module {
        "language" => json!([{ "code": "en", "name": "English" }]),
        "flag" => json!({ "emoji": "\u{1f3f3}", "svg": "https://example.invalid/flag.svg" }),
        "currency" => json!({ "code": "USD", "symbol": "$" }),
        "timezone" => json!(["America/New_York", "America/Los_Angeles"]),
        _ => Value::Null,
    }
}

fn country_name(code: &str) -> &'static str {
    match code {
        "US" => "United States",
        "DE" => "Germany",
        "FR" => "France",
        "JP" => "Japan",
        _ => "Unknown",
    }
}
