use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::catalog::{self, ProductFilter};
use crate::error::ShopError;

pub fn product_router() -> Router {
    Router::new()
        .route("/api/products", get(get_products))
        .route("/api/products/:id", get(get_product))
}

async fn get_products(
    Query(filter): Query<ProductFilter>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ShopError> {
    let products = catalog::list_products(&db, &filter).await?;
    Ok(Json(products))
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ShopError> {
    let product = catalog::get_product(&*db, id).await?;
    Ok(Json(product))
}
