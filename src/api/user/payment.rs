use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use validator::Validate;

use crate::error::ShopError;
use crate::middleware::auth::Claims;
use crate::payments::{self, NewPaymentMethod};

pub fn payment_router() -> Router {
    Router::new()
        .route(
            "/api/payment_methods",
            get(get_payment_methods).post(add_payment_method),
        )
        .route("/api/payment_methods/:id", delete(remove_payment_method))
}

async fn get_payment_methods(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(
        payments::list_payment_methods(&*db, claims.user_id).await?,
    ))
}

async fn add_payment_method(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewPaymentMethod>,
) -> Result<impl IntoResponse, ShopError> {
    payload.validate()?;
    let created = payments::create_payment_method(&db, claims.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn remove_payment_method(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ShopError> {
    payments::delete_payment_method(&db, claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
