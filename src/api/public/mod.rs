pub mod auth;
pub mod product;
pub mod product_type;

use axum::Router;

use auth::auth_router;
use product::product_router;
use product_type::product_type_router;

pub fn public_api_router() -> Router {
    Router::new()
        .merge(auth_router())
        .merge(product_router())
        .merge(product_type_router())
}
