use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failure of a single provider request.
///
/// Every variant names the operation that failed and keeps whatever the
/// provider or the transport reported.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{operation}: request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: HTTP {status}: {message}")]
    Http {
        operation: &'static str,
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    #[error("{operation}: provider rejected request: {message} (code {code})")]
    Rejected {
        operation: &'static str,
        code: String,
        message: String,
    },

    #[error("{operation}: unexpected response body")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// The request URL is dropped from `source`: AMap carries its key in the query.
    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Transport {
            operation,
            source: source.without_url(),
        }
    }

    pub fn decode(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { operation, source }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::Transport { operation, .. }
            | Self::Http { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::Decode { operation, .. } => operation,
        }
    }

    /// HTTP status, when the provider answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            Self::Rejected { .. } | Self::Decode { .. } => None,
        }
    }

    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } | Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Http { code, .. } => code.as_deref(),
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Failure of a view, rendered as the navigation response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Client(err) => {
                tracing::error!(
                    "View failed: {} (cause: {:?})",
                    err,
                    std::error::Error::source(err)
                );
                let body = json!({
                    "error": err.to_string(),
                    "operation": err.operation(),
                    "status": err.status().map(|s| s.as_u16()),
                    "provider_code": err.provider_code(),
                    "provider_message": err.provider_message(),
                });
                (StatusCode::BAD_GATEWAY, axum::Json(body)).into_response()
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({ "error": msg })),
            )
                .into_response(),
        }
    }
}
