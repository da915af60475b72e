use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by request handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Error while rendering a page template
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Error from password hashing or verification
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// The requested row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was understood but refused, e.g. a CSRF mismatch
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(error: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            AppError::NotFound(what) => {
                warn!("Not found: {}", what);
                (StatusCode::NOT_FOUND, "Not Found")
            }
            AppError::Forbidden(reason) => {
                warn!("Forbidden: {}", reason);
                (StatusCode::FORBIDDEN, "Forbidden")
            }
            AppError::Database(_) | AppError::Template(_) | AppError::PasswordHash(_) => {
                error!(error = ?self, "Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        };

        let body = format!(
            "<!DOCTYPE html><html><head><title>{title}</title></head>\
             <body><h1>{code} {title}</h1></body></html>",
            title = title,
            code = status.as_u16(),
        );
        (status, Html(body)).into_response()
    }
}
