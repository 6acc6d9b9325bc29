use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Errors raised by the summarization service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch data: {0}")]
    FetchError(String),

    #[error("LLM processing error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    InsufficientData(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::FetchError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::LlmError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::InsufficientData(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced by the client-side feeds and the summary request.
///
/// Cloneable so it can sit inside published feed state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("API key is missing")]
    MissingCredential,

    #[error("Network error: {0}")]
    Transport(String),

    #[error("{}", remote_message(.status, .message))]
    Remote {
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

fn remote_message(status: &Option<u16>, message: &Option<String>) -> String {
    match (status, message) {
        (_, Some(msg)) => format!("Error: {}", msg),
        (Some(code), None) => format!("Error: {}", code),
        (None, None) => "Error: remote service rejected the request".to_string(),
    }
}

impl FeedError {
    pub fn status(code: u16) -> Self {
        FeedError::Remote {
            status: Some(code),
            message: None,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedError::MalformedResponse(err.to_string())
        } else {
            FeedError::Transport(err.to_string())
        }
    }
}
