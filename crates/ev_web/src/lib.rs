use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/reports", post(handlers::create_report))
        .route("/api/articles", get(handlers::list_articles).post(handlers::store_articles))
        .route("/api/tags", get(handlers::extract_tags))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> ev_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use ev_core::{Article, Error, Result};
    pub use crate::{create_app, serve, AppState};
}
