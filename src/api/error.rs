use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use super::ApiResponse;
use crate::db::RepoError;
use crate::schema::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input parsed but failed shape/bounds checks
    #[error("validation failed")]
    Validation(Vec<ValidationError>),

    /// Body, query string or path could not be parsed at all
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Address not found")]
    NotFound { id: i64 },

    #[error("store failure: {0}")]
    Store(#[source] rusqlite::Error),

    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejected { status, .. } => *status,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { id } => ApiError::NotFound { id },
            RepoError::Store(e) => ApiError::Store(e),
        }
    }
}

macro_rules! from_rejection {
    ($($rejection:ty),+) => {
        $(impl From<$rejection> for ApiError {
            fn from(rejection: $rejection) -> Self {
                ApiError::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }
            }
        })+
    };
}

from_rejection!(JsonRejection, PathRejection);

// Unparseable query values are reported like out-of-range ones
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Validation(details) => {
                warn!(?details, "request rejected by validation");
                ApiResponse::<()>::error("Validation failed", Some(details))
            }
            ApiError::Rejected { message, .. } => {
                warn!(%status, %message, "malformed request");
                ApiResponse::error(message, None)
            }
            ApiError::NotFound { id } => {
                warn!(id, "address not found");
                ApiResponse::error("Address not found", None)
            }
            ApiError::Store(ref e) => {
                error!(error = %e, "store failure");
                ApiResponse::error("Internal server error", None)
            }
            ApiError::Task(ref e) => {
                error!(error = %e, "request task failed");
                ApiResponse::error("Internal server error", None)
            }
        };

        (status, Json(body)).into_response()
    }
}
