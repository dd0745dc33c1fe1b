use crate::sandbox::SandboxError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid path")]
    InvalidPath,
    #[error("file not found")]
    NotFound,
    #[error("project not found")]
    ProjectNotFound,
    #[error("not found")]
    RouteNotFound,
    #[error("io error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error payload shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub code: u16,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidPath => "InvalidPath",
            AppError::NotFound => "NotFound",
            AppError::ProjectNotFound => "ProjectNotFound",
            AppError::RouteNotFound => "RouteNotFound",
            AppError::Io(_) => "IOFailure",
            AppError::Internal(_) => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidPath => StatusCode::BAD_REQUEST,
            AppError::NotFound | AppError::ProjectNotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Io(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let status = self.status();
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            let s = self.to_string();
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => s,
            }
        };
        ErrorBody { error: error_slug(status), message, code: status.as_u16() }
    }
}

pub fn error_slug(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "bad_request",
        404 => "not_found",
        _ => "internal_error",
    }
}

impl From<SandboxError> for AppError {
    fn from(err: SandboxError) -> Self {
        match err {
            SandboxError::InvalidPath(_) => AppError::InvalidPath,
            SandboxError::NotFound => AppError::NotFound,
            SandboxError::Io(e) => AppError::Io(e.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), status = status.as_u16(), "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_errors_keep_their_kind() {
        assert!(matches!(AppError::from(SandboxError::InvalidPath("x")), AppError::InvalidPath));
        assert!(matches!(AppError::from(SandboxError::NotFound), AppError::NotFound));
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(AppError::from(SandboxError::Io(io)), AppError::Io(_)));
    }

    #[test]
    fn every_variant_has_a_matching_slug() {
        let cases = [
            (AppError::InvalidPath, "bad_request"),
            (AppError::NotFound, "not_found"),
            (AppError::ProjectNotFound, "not_found"),
            (AppError::RouteNotFound, "not_found"),
            (AppError::Io("x".into()), "internal_error"),
            (AppError::Internal("x".into()), "internal_error"),
        ];
        for (err, slug) in cases {
            assert_eq!(err.body().error, slug, "{err}");
        }
    }

    #[test]
    fn server_errors_hide_details() {
        let body = AppError::Io("/srv/secret: permission denied".into()).body();
        assert_eq!(body.error, "internal_error");
        assert_eq!(body.message, "Internal server error");
        assert_eq!(body.code, 500);
    }

    #[test]
    fn client_errors_describe_themselves() {
        let body = AppError::InvalidPath.body();
        assert_eq!((body.error, body.message.as_str(), body.code), ("bad_request", "Invalid path", 400));
        let body = AppError::NotFound.body();
        assert_eq!((body.error, body.message.as_str(), body.code), ("not_found", "File not found", 404));
    }
}
