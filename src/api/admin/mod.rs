pub mod product_type;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use product_type::admin_product_type_router;

pub fn admin_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(admin_product_type_router())
        .route_layer(from_fn_with_state(
            AuthState {
                db,
                config,
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
