use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ShopError;
use crate::middleware::auth::Claims;
use crate::orders;

pub fn cart_router() -> Router {
    Router::new().route("/api/cart", get(get_cart).post(add_product))
}

async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(orders::view_cart(&db, claims.user_id).await?))
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddProduct>,
) -> Result<impl IntoResponse, ShopError> {
    let response = match orders::add_line(&db, claims.user_id, payload.product_id).await? {
        Some(line) => (StatusCode::CREATED, Json(json!({ "line": line }))),
        None => (
            StatusCode::OK,
            Json(json!({
                "added": false,
                "reason": "Product is out of stock",
            })),
        ),
    };
    Ok(response)
}

#[derive(Debug, Deserialize)]
struct AddProduct {
    product_id: i32,
}
