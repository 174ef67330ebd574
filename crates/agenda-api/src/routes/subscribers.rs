//! Newsletter subscription management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use agenda_core::document::Kind;
use agenda_core::error::DomainError;
use agenda_events::subscriber::Subscriber;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub language: String,
}

/// Response body after a successful subscription. The hash goes into the
/// confirmation mail's unsubscribe link.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub email: String,
    pub hash: String,
}

/// One subscriber as listed to the admin; the unsubscribe hash stays out.
#[derive(Debug, Serialize)]
pub struct SubscriberDto {
    pub email: String,
    pub name: String,
    pub language: String,
}

/// GET /
async fn list(State(state): State<AppState>) -> Result<Json<Vec<SubscriberDto>>, ApiError> {
    let all = state.subscribers.get_all().await?;
    let subscribers = all
        .into_values()
        .map(|s| SubscriberDto {
            email: s.email().to_owned(),
            name: s.name().to_owned(),
            language: s.language().to_owned(),
        })
        .collect();
    Ok(Json(subscribers))
}

/// POST /
#[instrument(skip(state, request), fields(language = %request.language))]
async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscribeResponse>), ApiError> {
    let subscriber = Subscriber::new(request.email, request.name, request.language);
    state.subscribers.save(&subscriber).await?;
    info!("subscriber added");
    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            email: subscriber.email().to_owned(),
            hash: subscriber.hash().to_owned(),
        }),
    ))
}

/// DELETE /{hash} — unsubscribe by opt-out token.
#[instrument(skip(state))]
async fn unsubscribe(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<StatusCode, ApiError> {
    let subscriber = state
        .subscribers
        .find_by_hash(&hash)
        .await?
        .ok_or_else(|| DomainError::not_found(Kind::Subscriber, hash.clone()))?;
    state.subscribers.delete(subscriber.email()).await?;
    info!("subscriber removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for subscribers.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(subscribe))
        .route("/{hash}", axum::routing::delete(unsubscribe))
}
