pub mod admin;
pub mod public;
pub mod user;

use axum::{middleware::from_fn, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::logging::logging_middleware;
use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

pub fn build_app(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(public_api_router())
        .merge(user_api_router(db.clone(), config.clone()))
        .merge(admin_api_router(db.clone(), config.clone()))
        .layer(Extension(db))
        .layer(Extension(config))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
