use std::sync::atomic::Ordering;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_hits, Hits};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- IPLookup ---

#[tokio::test]
async fn ip_lookup_success_echoes_request() {
    let resp = app()
        .oneshot(get(
            "/IPLookup?key=k&ip=8.8.8.8&lang=EN&params=location%2Cdevice&mode=test&source=Rust-SDK",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["ip"], "8.8.8.8");
    assert_eq!(body["mode"], "test");
    assert_eq!(body["source"], "Rust-SDK");
    assert_eq!(body["params"], serde_json::json!(["location", "device"]));
    assert!(body["location"].is_object());
    assert!(body["device"].is_object());
    assert!(body.get("security").is_none());
}

#[tokio::test]
async fn ip_lookup_empty_key_is_an_error_envelope() {
    let resp = app()
        .oneshot(get("/IPLookup?key=&ip=8.8.8.8&lang=EN&params=&mode=live&source=x"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "invalid key");
}

#[tokio::test]
async fn ip_lookup_missing_ip() {
    let resp = app().oneshot(get("/IPLookup?key=k")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "missing ip");
}

// --- Country ---

#[tokio::test]
async fn country_success() {
    let resp = app()
        .oneshot(get(
            "/Country?key=k&CountryCode=US&params=flag%2Ccurrency&lang=FR&mode=live&source=Rust-SDK",
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["countryCode"], "US");
    assert_eq!(body["name"], "United States");
    assert_eq!(body["lang"], "FR");
    assert_eq!(body["currency"]["code"], "USD");
    assert!(body.get("flag").is_some());
}

#[tokio::test]
async fn country_rejects_ip_modules() {
    let resp = app()
        .oneshot(get("/Country?key=k&CountryCode=US&params=device"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "unknown module device");
}

// --- misc ---

#[tokio::test]
async fn unknown_path_is_404() {
    let resp = app().oneshot(get("/Weather?key=k")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hits_are_counted() {
    let hits = Hits::default();
    let router = app_with_hits(hits.clone());
    router
        .clone()
        .oneshot(get("/Country?key=k&CountryCode=DE"))
        .await
        .unwrap();
    router
        .oneshot(get("/IPLookup?key=k&ip=1.1.1.1"))
        .await
        .unwrap();
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}
