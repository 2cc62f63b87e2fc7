//! Error responses for the dashboard API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::database::DatabaseError;
use crate::schema::ErrorResponse;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request parameter
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Query failure; `context` is what the client sees, `source` is logged
    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: DatabaseError,
    },
}

impl ApiError {
    pub fn database(context: &'static str) -> impl FnOnce(DatabaseError) -> Self {
        move |source| ApiError::Database { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::Validation(message) | ApiError::NotFound(message) => message,
            ApiError::Database { context, source } => {
                tracing::error!(error = %source, "{}", context);
                context.to_string()
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
