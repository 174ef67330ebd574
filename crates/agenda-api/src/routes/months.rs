//! Calendar month view.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::instrument;

use agenda_core::error::DomainError;
use agenda_events::collection::Events;

use crate::error::ApiError;
use crate::routes::events::EventDto;
use crate::state::AppState;

/// Query parameters for GET /.
#[derive(Debug, Deserialize)]
pub struct MonthParams {
    /// Calendar month as `YYYY-MM`.
    pub month: String,
    /// Language the descriptions are resolved for; defaults to canonical.
    pub lang: Option<String>,
}

/// Parses a `YYYY-MM` month designator.
pub(crate) fn parse_month(month: &str) -> Result<(i32, u32), DomainError> {
    let invalid =
        || DomainError::Validation(vec![format!("'{month}' is not a YYYY-MM month")]);
    let (year, month_number) = month.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month_number: u32 = month_number.parse().map_err(|_| invalid())?;
    Ok((year, month_number))
}

/// GET /
#[instrument(skip(state, params), fields(month = %params.month))]
async fn month_view(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<Vec<EventDto>>, ApiError> {
    let (year, month) = parse_month(&params.month)?;
    let lang = params
        .lang
        .unwrap_or_else(|| state.languages.canonical_code().to_owned());

    let collection =
        Events::for_month(&state.events, &state.translations, year, month, &lang).await?;
    let events = collection
        .sorted()
        .iter()
        .filter_map(EventDto::from_event)
        .collect();
    Ok(Json(events))
}

/// Returns the router for the month view.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(month_view))
}
