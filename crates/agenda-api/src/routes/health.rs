//! Service health endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Body of GET /health: liveness plus a glimpse of the language registry
/// the service booted with.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBody {
    pub status: &'static str,
    pub version: &'static str,
    /// Canonical language code the translation fallback resolves to.
    pub canonical_lang: String,
    /// Number of languages in the registry snapshot.
    pub language_count: usize,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        canonical_lang: state.languages.canonical_code().to_owned(),
        language_count: state.languages.all().count(),
    })
}

/// Returns the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
