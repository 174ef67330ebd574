//! Integration tests for the public event feed.

mod common;

use axum::http::StatusCode;

use agenda_events::translation::Translation;

#[tokio::test]
async fn test_feed_starts_today_and_orders_by_date() {
    let state = common::test_state();
    // The test clock says 2024-03-01: February is already over.
    common::seed_event(&state, "2024-02-15", "Vergangenes").await;
    common::seed_event(&state, "2024-03-20", "Konzert").await;
    common::seed_event(&state, "2024-03-05", "Frühlingsfest").await;
    let app = common::build_app(state);

    let (status, json) = common::get_json(app, "/api/v1/events").await;

    assert_eq!(status, StatusCode::OK);
    let events = json["events"].as_array().unwrap();
    let titles: Vec<_> = events.iter().map(|e| e["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Frühlingsfest", "Konzert"]);
    assert_eq!(events[0]["date"], "2024-03-05");
    assert_eq!(events[0]["location"], "Kanzlei");
    assert_eq!(json["cursor"], "");
}

#[tokio::test]
async fn test_feed_resolves_requested_language_with_fallback() {
    let state = common::test_state();
    let id = common::seed_event(&state, "2024-03-05", "Frühlingsfest").await;
    common::seed_event(&state, "2024-03-20", "Konzert").await;
    let french = Translation::new(Some(id), "fr", "Fête du printemps", "", "", "", "");
    state.translations.save(&french).await.unwrap();
    let app = common::build_app(state);

    let (status, json) = common::get_json(app, "/api/v1/events?lang=fr").await;

    assert_eq!(status, StatusCode::OK);
    let events = json["events"].as_array().unwrap();
    assert_eq!(events[0]["title"], "Fête du printemps");
    assert_eq!(events[0]["lang"], "fr");
    // No French text for the second event: canonical German fills in.
    assert_eq!(events[1]["title"], "Konzert");
    assert_eq!(events[1]["lang"], "de");
}

#[tokio::test]
async fn test_feed_pages_through_with_cursors() {
    let state = common::test_state();
    for (date, title) in [
        ("2024-03-05", "Erstes"),
        ("2024-03-10", "Zweites"),
        ("2024-03-15", "Drittes"),
    ] {
        common::seed_event(&state, date, title).await;
    }

    let app = common::build_app(state.clone());
    let (status, first) = common::get_json(app, "/api/v1/events?numEvents=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["events"].as_array().unwrap().len(), 2);
    let cursor = first["cursor"].as_str().unwrap().to_owned();
    assert!(!cursor.is_empty());

    let app = common::build_app(state.clone());
    let uri = format!("/api/v1/events?numEvents=2&cursor={cursor}");
    let (status, second) = common::get_json(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    let events = second["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Drittes");

    // The terminal sentinel is absorbing: an empty page, again terminal.
    let terminal = second["cursor"].as_str().unwrap().to_owned();
    assert_eq!(terminal, "");
    let app = common::build_app(state);
    let uri = format!("/api/v1/events?numEvents=2&cursor={terminal}");
    let (status, third) = common::get_json(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(third["events"].as_array().unwrap().is_empty());
    assert_eq!(third["cursor"], "");
}

#[tokio::test]
async fn test_feed_rejects_corrupt_cursor() {
    let state = common::test_state();
    common::seed_event(&state, "2024-03-05", "Frühlingsfest").await;
    let app = common::build_app(state);

    let (status, json) =
        common::get_json(app, "/api/v1/events?cursor=not-a-real-token").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_cursor");
}

#[tokio::test]
async fn test_feed_honors_explicit_start_date() {
    let state = common::test_state();
    common::seed_event(&state, "2024-02-15", "Vergangenes").await;
    common::seed_event(&state, "2024-03-05", "Frühlingsfest").await;
    let app = common::build_app(state);

    let (status, json) =
        common::get_json(app, "/api/v1/events?startDate=2024-02-01").await;

    assert_eq!(status, StatusCode::OK);
    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["title"], "Vergangenes");
}
