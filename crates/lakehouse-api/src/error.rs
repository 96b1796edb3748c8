//! Error types for the query endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lakehouse_query::QueryError;
use thiserror::Error;

/// Errors that can occur while serving a query request
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing SQL statement")]
    MissingSql,

    #[error("Only SELECT queries are allowed")]
    SelectOnly,

    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed body or pagination values
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingSql | ApiError::SelectOnly => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) | ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure is the server's (5xx) rather than the caller's
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if status.is_server_error() {
            format!("Error: {}", self)
        } else {
            self.to_string()
        };

        (status, body).into_response()
    }
}
