use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{sqlx, DbErr, RuntimeErr, SqlErr};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::middleware::logging::ErrorReport;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ShopError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShopError::NotFound(_) => StatusCode::NOT_FOUND,
            ShopError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            ShopError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ShopError::Conflict(_) => StatusCode::CONFLICT,
            ShopError::Unauthorized => StatusCode::UNAUTHORIZED,
            ShopError::Internal(_) | ShopError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ShopError::NotFound(_) => "not_found",
            ShopError::InvalidReference(_) => "invalid_reference",
            ShopError::Validation(_) => "validation",
            ShopError::Conflict(_) => "conflict",
            ShopError::Unauthorized => "unauthorized",
            ShopError::Internal(_) => "internal",
            ShopError::Database(_) => "database",
        }
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// SQLITE_BUSY and SQLITE_LOCKED, including their extended codes.
pub(crate) fn is_busy(err: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
    | DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))) = err
    else {
        return false;
    };
    match db_err.code().and_then(|code| code.parse::<i32>().ok()) {
        Some(code) => matches!(code & 0xff, 5 | 6),
        None => db_err.message().contains("database is locked"),
    }
}

impl From<ValidationErrors> for ShopError {
    fn from(errors: ValidationErrors) -> Self {
        ShopError::Validation(errors.to_string())
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side details stay in the log.
        let message = match &self {
            ShopError::Internal(_) | ShopError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        response.extensions_mut().insert(ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        });
        response
    }
}
