use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ShopError;
use crate::middleware::auth::Claims;
use crate::orders::{self, OrderId};

pub fn order_router() -> Router {
    Router::new()
        .route("/api/orders", get(get_orders))
        .route("/api/orders/:id", get(get_order).delete(cancel_order))
        .route("/api/orders/:id/lines/:product_id", delete(remove_line))
        .route("/api/orders/:id/checkout", post(begin_checkout))
        .route("/api/orders/:id/complete", post(complete_checkout))
}

async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(orders::order_history(&db, claims.user_id).await?))
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(
        orders::order_detail(&db, claims.user_id, OrderId(id)).await?,
    ))
}

async fn cancel_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ShopError> {
    orders::cancel_order(&db, claims.user_id, OrderId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_line(
    Path((id, product_id)): Path<(i32, i32)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ShopError> {
    let removed = orders::remove_line(&db, claims.user_id, OrderId(id), product_id).await?;
    Ok(Json(removed))
}

async fn begin_checkout(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BeginCheckout>,
) -> Result<impl IntoResponse, ShopError> {
    let preview = orders::begin_checkout(&db, claims.user_id, OrderId(id), payload.total).await?;
    Ok(Json(preview))
}

async fn complete_checkout(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CompleteCheckout>,
) -> Result<impl IntoResponse, ShopError> {
    let detail =
        orders::complete_checkout(&db, claims.user_id, OrderId(id), payload.payment_method_id)
            .await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
struct BeginCheckout {
    total: Decimal,
}

#[derive(Debug, Deserialize)]
struct CompleteCheckout {
    payment_method_id: i32,
}
