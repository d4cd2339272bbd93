use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] libsql::Error),
    #[error("malformed document {id}")]
    Document {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode document")]
    Encode(#[from] serde_json::Error),
    #[error("insert returned no row")]
    NoRowReturned,
}

/// Errors surfaced by the book handlers.
///
/// `Client` answers 400 and `Server` answers 500, both carrying the
/// rendered cause in `details`. `NotFound` answers 404 with no details.
#[derive(Debug)]
pub enum ApiError {
    Client { error: &'static str, details: String },
    Server { error: &'static str, details: String },
    NotFound(&'static str),
}

impl ApiError {
    pub fn client<E: std::error::Error>(error: &'static str, cause: &E) -> Self {
        ApiError::Client {
            error,
            details: crate::unpack_error(cause),
        }
    }

    pub fn server<E: std::error::Error>(error: &'static str, cause: &E) -> Self {
        ApiError::Server {
            error,
            details: crate::unpack_error(cause),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Client { .. } => StatusCode::BAD_REQUEST,
            ApiError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Client { error, details } | ApiError::Server { error, details } => {
                tracing::error!(status = status.as_u16(), details = %details, "{}", error);
                ErrorResponse {
                    error: error.to_string(),
                    details: Some(details),
                }
            }
            ApiError::NotFound(error) => ErrorResponse {
                error: error.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
