pub mod error;
pub mod handlers;
pub mod models;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::document::PipelineContext;
use crate::inference::LayoutDetector;

/// Shared handler state.
pub struct AppState<D: LayoutDetector> {
    pub context: Arc<PipelineContext<D>>,
    /// Maximum decoded upload size in bytes
    pub max_file_size: u64,
}

impl<D: LayoutDetector> AppState<D> {
    pub fn new(context: Arc<PipelineContext<D>>, max_file_size: u64) -> Self {
        Self {
            context,
            max_file_size,
        }
    }
}

impl<D: LayoutDetector> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            max_file_size: self.max_file_size,
        }
    }
}

pub fn create_app<D: LayoutDetector + 'static>(state: AppState<D>) -> Router {
    // Base64 inflates uploads by a third; leave headroom for the JSON envelope.
    let body_limit = usize::try_from(state.max_file_size / 3 * 4 + 64 * 1024).unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/layout/page", post(handlers::analyze_page::<D>))
        .route("/api/v1/layout/document", post(handlers::analyze_document::<D>))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Loads the models and serves `state` on `addr` until the process is stopped.
pub async fn start_server<D: LayoutDetector + 'static>(
    state: AppState<D>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Preloading layout model...");
    let context = Arc::clone(&state.context);
    tokio::task::spawn_blocking(move || context.warm_up()).await??;

    tracing::info!("Starting server on {}", addr);

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Page endpoint: http://{}/api/v1/layout/page", addr);
    tracing::info!("Document endpoint: http://{}/api/v1/layout/document", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
