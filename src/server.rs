//! Web server: routes, shared state, CORS, bind and graceful shutdown.

use crate::config::Config;
use crate::error::Result;
use crate::notify::Notifier;
use crate::{admin, events, index, notify, prayer_times, settings, store};
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub notifier: Notifier,
    pub config: Arc<Config>,
}

/// `GET /api/health`
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": "Mosque API is running",
        "site": state.config.site_name,
    }))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Build the application router. Public so integration tests can mount the
/// full route table on their own listener with their own state.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(index::landing_page))
        .route("/api/health", get(health))
        .route(
            "/api/prayer-times",
            get(prayer_times::list).put(prayer_times::replace),
        )
        .route("/api/events", get(events::list_active).post(events::create))
        .route(
            "/api/events/:id",
            put(events::update).delete(events::remove),
        )
        .route(
            "/api/settings",
            get(settings::grouped).put(settings::upsert),
        )
        .route("/api/settings/:key", get(settings::get_one))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/update-profile", put(admin::update_profile))
        .route("/api/updates", get(notify::updates_stream))
        .nest_service("/static", ServeDir::new("static"))
        .layer(cors)
        .with_state(state)
}

/// Run the web server on the specified port.
///
/// Loads configuration, opens and seeds the database, then serves until the
/// cancellation token fires.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the database cannot
/// be opened or seeded, or the listener fails to bind.
pub async fn run(
    port: u16,
    config_path: Option<PathBuf>,
    cancel_token: CancellationToken,
) -> Result<()> {
    tracing::info!("Initializing server");

    let config = Config::load(config_path.as_deref())?;

    let pool = store::connect(&config.database_file).await?;
    store::init_schema(&pool).await?;
    store::seed_defaults(&pool, &config.admin).await?;

    let state = AppState {
        pool,
        notifier: Notifier::new(),
        config: Arc::new(config),
    };

    let app = app(state);
    tracing::debug!("Routes configured");

    let address: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("Site launched on: http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
