use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::config::Config;
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::error::{is_unique_violation, ShopError};
use crate::middleware::auth::generate_token;

pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
}

async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterUser>,
) -> Result<impl IntoResponse, ShopError> {
    payload.validate()?;

    let password = user::hash_password(&payload.password)
        .map_err(|err| ShopError::Internal(format!("Failed to hash password: {err}")))?;

    let created = user::ActiveModel {
        username: Set(payload.username.clone()),
        password: Set(password),
        role: Set(Role::User),
        ..Default::default()
    }
    .insert(&*db)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            ShopError::Conflict(format!("Username {} already exists", payload.username))
        } else {
            err.into()
        }
    })?;

    info!(user_id = created.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "id": created.id,
        })),
    ))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Json(payload): Json<UserLogin>,
) -> Result<impl IntoResponse, ShopError> {
    let user = UserEntity::find()
        .filter(user::Column::Username.eq(&*payload.username))
        .one(&*db)
        .await?
        .ok_or(ShopError::Unauthorized)?;

    if let Err(reason) = user.check_hash(&payload.password) {
        debug!(user_id = user.id, reason = %reason, "Login refused");
        return Err(ShopError::Unauthorized);
    }

    let token = generate_token(user.id, user.role, &config)
        .map_err(|err| ShopError::Internal(err.to_string()))?;

    info!(user_id = user.id, role = %user.role, "User logged in");
    Ok(Json(json!({ "token": token })))
}

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,25}$").expect("username pattern is valid"));

#[derive(Clone, Debug, Deserialize, Validate)]
struct RegisterUser {
    #[validate(regex(path = *USERNAME_REGEX))]
    username: String,
    #[validate(length(min = 8, max = 128))]
    password: String,
}

#[derive(Clone, Debug, Deserialize)]
struct UserLogin {
    username: String,
    password: String,
}
