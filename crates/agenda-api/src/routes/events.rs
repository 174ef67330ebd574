//! The public event feed.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use agenda_events::collection::Events;
use agenda_events::event::Event;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 15;

/// Query parameters for GET /.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    /// Language the descriptions are resolved for; defaults to canonical.
    pub lang: Option<String>,
    /// Page size; defaults to 15.
    pub num_events: Option<usize>,
    /// Continuation token from a previous page.
    pub cursor: Option<String>,
    /// First date of interest; defaults to today.
    pub start_date: Option<NaiveDate>,
}

/// One event as served to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: i64,
    pub date: Option<NaiveDate>,
    pub location: String,
    pub transit: String,
    pub url: String,
    pub tags: Vec<String>,
    /// Language the title and body are actually in; may differ from the
    /// requested language when the canonical text filled in.
    pub lang: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl EventDto {
    pub(crate) fn from_event(event: &Event) -> Option<Self> {
        let id = event.id()?;
        Some(Self {
            id,
            date: event.date(),
            location: event.location().to_owned(),
            transit: event.transit().to_owned(),
            url: event.url().to_owned(),
            tags: event.tags().iter().cloned().collect(),
            lang: event.description().map(|d| d.lang.clone()),
            title: event.description().map(|d| d.title.clone()),
            body: event.description().map(|d| d.body.clone()),
        })
    }
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub events: Vec<EventDto>,
    /// Opaque continuation token; the empty string means no more results.
    pub cursor: String,
}

/// GET /
#[instrument(skip(state, params), fields(lang = params.lang.as_deref().unwrap_or("")))]
async fn feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, ApiError> {
    let lang = params
        .lang
        .unwrap_or_else(|| state.languages.canonical_code().to_owned());
    let start = params.start_date.unwrap_or_else(|| state.clock.today());
    let page_size = params.num_events.unwrap_or(DEFAULT_PAGE_SIZE);

    let page = state
        .events
        .query_page(start, page_size, params.cursor.as_deref())
        .await?;

    let mut collection = Events::from_events(page.events);
    collection.load_descriptions(&lang, &state.translations).await?;

    let events = collection
        .sorted()
        .iter()
        .filter_map(EventDto::from_event)
        .collect();
    Ok(Json(FeedResponse {
        events,
        cursor: page.cursor.encode(),
    }))
}

/// Returns the router for the event feed.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(feed))
}
