use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::catalog::{self, NewProductType};
use crate::error::ShopError;

pub fn admin_product_type_router() -> Router {
    Router::new()
        .route("/api/admin/product_types", post(create_product_type))
        .route("/api/admin/product_types/:id", delete(delete_product_type))
}

async fn create_product_type(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<NewProductType>,
) -> Result<impl IntoResponse, ShopError> {
    payload.validate()?;
    let created = catalog::create_product_type(&db, payload).await?;
    info!(product_type_id = created.id, "Product type created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_product_type(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ShopError> {
    catalog::delete_product_type(&db, id).await?;
    info!(product_type_id = id, "Product type deleted");
    Ok(StatusCode::NO_CONTENT)
}
