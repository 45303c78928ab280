use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use validator::Validate;

use crate::catalog::{self, NewProduct, ProductPatch};
use crate::error::ShopError;
use crate::middleware::auth::Claims;

pub fn sell_router() -> Router {
    Router::new()
        .route("/api/sell", post(sell_product))
        .route("/api/sell/:id", patch(edit_product).delete(remove_product))
}

async fn sell_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ShopError> {
    payload.validate()?;
    let product = catalog::create_product(&db, claims.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn edit_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProductPatch>,
) -> Result<impl IntoResponse, ShopError> {
    payload.validate()?;
    let product = catalog::update_product(&db, claims.user_id, id, payload).await?;
    Ok(Json(product))
}

async fn remove_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ShopError> {
    catalog::delete_product(&db, claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
