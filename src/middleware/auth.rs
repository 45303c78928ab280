use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::entities::user::{Entity as UserEntity, Role};
use crate::error::ShopError;

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
    {
        Some(token) => token,
        None => return ShopError::Unauthorized.into_response(),
    };

    let claims = match validate_token(&state, token).await {
        Ok(claims) => claims,
        Err(err) => {
            debug!(error = %err, "Rejected bearer token");
            return ShopError::Unauthorized.into_response();
        }
    };

    req.extensions_mut().insert(claims);
    next.run(req).await
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: Role,
    pub exp: usize,
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub role: Role,
}

pub fn generate_token(
    user_id: i32,
    role: Role,
    config: &Config,
) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(config.token_ttl_hours))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims { user_id, role, exp };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub async fn validate_token(state: &AuthState, token: &str) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::TokenExpired)?
    .claims;

    // The role stored in the database wins over a stale token.
    let user = UserEntity::find_by_id(claims.user_id)
        .one(&*state.db)
        .await
        .map_err(|_| AuthMiddlewareError::InternalServerError)?
        .ok_or(AuthMiddlewareError::InvalidUserOrRole)?;

    if user.role == claims.role && user.role.permits(state.role) {
        Ok(claims)
    } else {
        Err(AuthMiddlewareError::InvalidUserOrRole)
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Token expired or malformed")]
    TokenExpired,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Internal server error")]
    InternalServerError,
}
