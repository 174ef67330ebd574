//! Supported languages.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// One language as served to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDto {
    pub code: String,
    pub name: String,
    pub german_name: String,
    pub days_of_week: Vec<String>,
    pub is_right_to_left: bool,
    pub is_in_agenda: bool,
    /// Whether the newsletter uses a language-specific format.
    pub has_specific_format: bool,
    /// Whether this is the canonical language the fallback resolves to.
    pub is_canonical: bool,
}

/// GET /
async fn list(State(state): State<AppState>) -> Json<Vec<LanguageDto>> {
    let canonical = state.languages.canonical_code();
    let languages = state
        .languages
        .all()
        .map(|language| LanguageDto {
            code: language.code.clone(),
            name: language.name.clone(),
            german_name: language.german_name.clone(),
            days_of_week: language.days_of_week.clone(),
            is_right_to_left: language.is_right_to_left,
            is_in_agenda: language.is_in_agenda,
            has_specific_format: language.has_specific_format,
            is_canonical: language.code == canonical,
        })
        .collect();
    Json(languages)
}

/// Returns the router for the language list.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
