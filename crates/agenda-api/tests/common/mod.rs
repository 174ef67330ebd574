//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone as _, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use agenda_core::clock::Clock;
use agenda_core::language::LanguageRegistry;
use agenda_core::store::DocumentStore;
use agenda_events::event::Event;
use agenda_events::translation::Translation;
use agenda_test_support::{FixedClock, InMemoryDocumentStore};

use agenda_api::renderer::PlainTextRenderer;
use agenda_api::routes;
use agenda_api::state::AppState;

/// Builds application state over an in-memory store with the built-in
/// language set and a clock fixed at 2024-03-01.
pub fn test_state() -> AppState {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
    let languages = Arc::new(LanguageRegistry::builtin());
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
    ));
    AppState::new(
        store,
        languages,
        clock,
        Arc::new(PlainTextRenderer),
        "https://agenda.example.ch",
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_app(state: AppState) -> Router {
    routes::router().with_state(state)
}

/// Create an event with its canonical German translation; returns the id.
pub async fn seed_event(state: &AppState, date: &str, title: &str) -> i64 {
    let event = Event::new(
        Some(date.parse().unwrap()),
        "Kanzlei",
        "Tram 8",
        "https://example.ch",
        BTreeSet::from(["festival".to_owned()]),
    );
    let canonical = Translation::new(None, "de", title, "Text", "", "", "");
    let (created, _) = state.events.create(event, canonical).await.unwrap();
    created.id().unwrap()
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a DELETE request and return the status.
pub async fn delete(app: Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap().status()
}
