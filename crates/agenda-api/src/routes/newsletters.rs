//! Monthly newsletter rendering.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::routes::months;
use crate::state::AppState;

/// Query parameters for GET /.
#[derive(Debug, Deserialize)]
pub struct NewsletterParams {
    /// Calendar month as `YYYY-MM`.
    pub month: String,
}

/// GET / — one rendered newsletter body per language code.
#[instrument(skip(state, params), fields(month = %params.month))]
async fn render(
    State(state): State<AppState>,
    Query(params): Query<NewsletterParams>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let (year, month) = months::parse_month(&params.month)?;
    let bodies = state
        .newsletter
        .render_month(year, month, &state.base_url, None)
        .await?;
    Ok(Json(bodies))
}

/// Returns the router for newsletters.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(render))
}
