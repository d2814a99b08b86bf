//! Newsroom Backend Library
//!
//! Collaborative article platform: credentials, roles, identity resolution,
//! authorization guards and the engagement badge engine, served over axum.

pub mod api;
pub mod auth;
pub mod config;
pub mod engagement;
pub mod generation;
pub mod middleware;
pub mod models;
pub mod store;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use api::AppState;
pub use config::Config;

/// Full application router with logging, tracing and CORS layers applied
pub fn build_app(state: AppState) -> Router {
    api::router(state)
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
