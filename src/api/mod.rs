pub mod handlers;
pub mod problem;

use crate::provider::SourceProvider;
use crate::registry::client::HttpRegistryClient;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use problem::Problem;

#[derive(Clone)]
pub struct AppState {
    /// Template client; each request gets a copy carrying its own
    /// `Authorization` header.
    pub registry: HttpRegistryClient,
    pub source: Arc<dyn SourceProvider>,
}

pub fn router(state: AppState, allow_all_origins: bool) -> Router {
    let router = Router::new()
        .route("/", get(handlers::ping))
        .route("/import/github", post(handlers::import))
        .route("/import/github/version", get(handlers::version))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if allow_all_origins {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
