pub mod config;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod routes;
pub mod schemas;
pub mod services;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Full application router, mounted under `/api`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_router())
        .with_state(state)
}
