pub mod cart;
pub mod order;
pub mod payment;
pub mod sell;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use cart::cart_router;
use order::order_router;
use payment::payment_router;
use sell::sell_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(cart_router())
        .merge(order_router())
        .merge(payment_router())
        .merge(sell_router())
        .route_layer(from_fn_with_state(
            AuthState {
                db,
                config,
                role: Role::User,
            },
            auth_middleware,
        ))
}
