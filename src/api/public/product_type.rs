use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::catalog;
use crate::error::ShopError;

pub fn product_type_router() -> Router {
    Router::new()
        .route("/api/product_types", get(get_product_types))
        .route("/api/product_types/:id", get(get_product_type))
}

async fn get_product_types(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(catalog::list_product_types(&db).await?))
}

async fn get_product_type(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ShopError> {
    let (product_type, products) = catalog::products_of_type(&db, id).await?;
    Ok(Json(json!({
        "product_type": product_type,
        "products": products,
    })))
}
