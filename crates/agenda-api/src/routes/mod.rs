//! Route modules, one per resource.

pub mod events;
pub mod health;
pub mod languages;
pub mod months;
pub mod newsletters;
pub mod subscribers;

use axum::Router;

use crate::state::AppState;

/// Assembles the full application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/events", events::router())
        .nest("/api/v1/months", months::router())
        .nest("/api/v1/languages", languages::router())
        .nest("/api/v1/newsletters", newsletters::router())
        .nest("/api/v1/subscribers", subscribers::router())
}
