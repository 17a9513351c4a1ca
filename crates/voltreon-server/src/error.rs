//! HTTP error mapping.
//!
//! Every failure becomes a JSON body `{"error": <message>, "kind": <kind>}`
//! with a status derived from the error's [`ErrorKind`]:
//!
//! | kind               | status |
//! |--------------------|--------|
//! | `validation`       | 400    |
//! | `not_found`        | 404    |
//! | `conflict`         | 409    |
//! | `upstream_service` | 502    |
//! | `store`            | 500    |

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use voltreon::error::{Error, ErrorKind};

/// Error returned by every handler.
#[derive(Debug)]
pub enum AppError {
    /// A library error, classified by its kind
    Domain(Error),
    /// The request itself could not be decoded (bad JSON, missing field,
    /// malformed id)
    BadRequest(String),
}

impl AppError {
    /// The classification reported in the response body.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(e) => e.kind(),
            AppError::BadRequest(_) => ErrorKind::Validation,
        }
    }

    /// The HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::UpstreamService => StatusCode::BAD_GATEWAY,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match self {
            AppError::Domain(e) => e.to_string(),
            AppError::BadRequest(msg) => msg,
        };

        if kind == ErrorKind::Store {
            tracing::error!(error = %message, "Store failure");
        } else {
            tracing::debug!(%kind, error = %message, "Request rejected");
        }

        let body = Json(serde_json::json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::Domain(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
