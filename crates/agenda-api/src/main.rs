//! Agenda API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use agenda_core::clock::{Clock, SystemClock};
use agenda_core::language::LanguageRegistry;
use agenda_core::store::DocumentStore;
use agenda_store::PgDocumentStore;

use agenda_api::error::AppError;
use agenda_api::renderer::PlainTextRenderer;
use agenda_api::routes;
use agenda_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting agenda API server");

    // Read configuration from environment.
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        AppError::Config("DATABASE_URL environment variable must be set".to_string())
    })?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
    let canonical = std::env::var("CANONICAL_LANG").unwrap_or_else(|_| "de".to_string());
    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| format!("http://{host}:{port}"));

    // Create database connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    // Build application state.
    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool));
    let languages = Arc::new(LanguageRegistry::load(store.as_ref(), &canonical).await?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let app_state = AppState::new(
        store,
        languages,
        clock,
        Arc::new(PlainTextRenderer),
        base_url,
    );

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
