use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the public API, translated at the outermost
/// handler layer. Nothing below this escapes as a raw fault.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{message}")]
    Upstream {
        message: String,
        debug: Option<String>,
    },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Wraps an upstream failure behind a generic message. The underlying
    /// error text is only exposed when the debug flag is set.
    pub fn upstream<E: std::error::Error>(message: &str, debug_enabled: bool, source: &E) -> Self {
        error!(error = %source, "upstream request failed");
        Self::Upstream {
            message: message.to_string(),
            debug: debug_enabled.then(|| source.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, ErrorBody { message, debug: None }),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, ErrorBody { message, debug: None }),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, ErrorBody { message, debug: None }),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, ErrorBody { message, debug: None }),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, ErrorBody { message, debug: None }),
            ApiError::Validation(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorBody { message, debug: None })
            }
            ApiError::Upstream { message, debug } => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody { message, debug })
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "Internal server error.".into(),
                        debug: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_hides_detail_unless_debug() {
        let source = std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timeout");

        let hidden = ApiError::upstream("Recipe search failed.", false, &source);
        match hidden {
            ApiError::Upstream { message, debug } => {
                assert_eq!(message, "Recipe search failed.");
                assert!(debug.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        let shown = ApiError::upstream("Recipe search failed.", true, &source);
        match shown {
            ApiError::Upstream { debug, .. } => {
                assert_eq!(debug.as_deref(), Some("connect timeout"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
