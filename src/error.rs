use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::client::types::ApiResponse;

/// How the transport failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request was aborted because its timeout elapsed.
    Aborted,
    /// No connection could be made.
    Connect,
    /// The server answered with a non-2xx status.
    Status,
    Other,
}

/// Failure reported by a [`Transport`](crate::client::Transport).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// Present only when the server actually answered.
    pub response: Option<ApiResponse>,
}

impl TransportError {
    pub fn aborted(timeout: Duration) -> Self {
        Self {
            kind: TransportErrorKind::Aborted,
            message: format!("timeout of {}ms exceeded", timeout.as_millis()),
            response: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Connect,
            message: message.into(),
            response: None,
        }
    }

    pub fn status(response: ApiResponse) -> Self {
        Self {
            kind: TransportErrorKind::Status,
            message: format!("Request failed with status code {}", response.status),
            response: Some(response),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Other,
            message: message.into(),
            response: None,
        }
    }

    /// Aborted requests and anything whose message mentions a timeout.
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Aborted || self.message.contains("timeout")
    }

    pub fn from_reqwest(error: reqwest::Error, timeout: Option<Duration>) -> Self {
        if error.is_timeout() {
            return match timeout {
                Some(t) => Self::aborted(t),
                None => Self {
                    kind: TransportErrorKind::Aborted,
                    message: format!("timeout: {}", error),
                    response: None,
                },
            };
        }
        if error.is_connect() {
            return Self::network(error.to_string());
        }
        Self::other(error.to_string())
    }
}

/// Rejection produced by the client pipeline.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Timeout { message: String },

    #[error("{message}")]
    Network { message: String },

    /// The transport's error, passed through untouched.
    #[error(transparent)]
    Http(TransportError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Message suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http(error) => match &error.response {
                Some(response) => {
                    crate::client::handler::http_user_message(response.status, &response.body)
                }
                None => error.message.clone(),
            },
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            AppError::InvalidMethod(_) => (StatusCode::BAD_REQUEST, "INVALID_METHOD"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.to_string(),
                "code": error_code,
            }
        }));

        (status, body).into_response()
    }
}
