pub mod handlers;
pub mod types;

use crate::{Result, config::Config, render::StabilityClient, storage::RESULTS_URL_PREFIX};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

/// Room left in the request body for the text fields and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub async fn run(config: Config) -> Result<()> {
    // Make sure output and upload directories exist
    tokio::fs::create_dir_all(&config.server.results_dir).await?;
    tokio::fs::create_dir_all(&config.server.uploads_dir).await?;

    if config.stability.api_key.is_none() {
        warn!("STABILITY_API_KEY is not set; /render will reject requests");
    }

    // Initialize vendor client
    let client = StabilityClient::new(&config.stability)?;
    info!("Using Stability engine: {}", config.stability.engine);

    let config = Arc::new(config);
    let app = router(AppState::new(config.clone(), Arc::new(client)));

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router: API routes, result files and the landing page.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let server = &config.server;
    let body_limit = server.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/render",
            post(handlers::render).layer(DefaultBodyLimit::max(body_limit)),
        )
        .nest_service(RESULTS_URL_PREFIX, ServeDir::new(&server.results_dir))
        .fallback_service(ServeDir::new(&server.public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
