use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Engine returned {status} ({kind}): {reason}")]
    Api {
        status: u16,
        kind: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load fixture {path}: {reason}")]
    Fixture { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid time value: {0}")]
    InvalidTimeValue(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Error envelope returned by the engine on non-2xx responses:
/// `{"error": {"type": "...", "reason": "..."}, "status": 404}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    Cause(crate::types::ErrorCause),
    Message(String),
}

impl SearchError {
    /// Build an [`SearchError::Api`] from a status and the raw response body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let (kind, reason) = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody {
                error: ApiErrorDetail::Cause(cause),
            }) => (cause.kind, cause.reason.unwrap_or_default()),
            Ok(ApiErrorBody {
                error: ApiErrorDetail::Message(msg),
            }) => ("error".to_string(), msg),
            Err(_) => ("http_error".to_string(), body.to_string()),
        };

        SearchError::Api {
            status: status.as_u16(),
            kind,
            reason,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            SearchError::Transport(e) => e.status().unwrap_or(StatusCode::BAD_GATEWAY),
            SearchError::Json(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SearchError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SearchError::Fixture { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SearchError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SearchError::InvalidTimeValue(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == StatusCode::NOT_FOUND
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code() == StatusCode::CONFLICT
    }
}
