use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::ClientError;

/// HTTP method of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Other(String),
}

impl HttpMethod {
    /// Parses a method name, ignoring case.
    pub fn parse(method: &str) -> Self {
        let upper = method.trim().to_uppercase();
        match upper.as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other(upper),
        }
    }

    /// Like [`HttpMethod::parse`] but rejects names that are not valid
    /// HTTP tokens.
    pub fn from_token(method: &str) -> Result<Self, ClientError> {
        let trimmed = method.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
        if valid {
            Ok(Self::parse(trimmed))
        } else {
            Err(ClientError::InvalidRequest(format!(
                "invalid HTTP method {:?}",
                method
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        Self::parse(method)
    }
}

/// Instrumentation attached by the request interceptor.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    pub start_time: Option<Instant>,
    pub timeout: Option<Duration>,
}

/// An outgoing request as it flows through the pipeline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub metadata: RequestMetadata,
}

impl RequestContext {
    pub fn new(method: impl Into<HttpMethod>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            metadata: RequestMetadata::default(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>, body: Option<String>) -> Self {
        let mut ctx = Self::new(HttpMethod::Post, url);
        ctx.body = body;
        ctx
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Declared content type, looked up case-insensitively.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }

    /// Time since the interceptor stamped the request.
    pub fn elapsed(&self) -> Option<Duration> {
        self.metadata.start_time.map(|start| start.elapsed())
    }

    /// Fresh copy for re-issuing; metadata is cleared so the timeout is
    /// computed again.
    pub fn reissue(&self) -> Self {
        Self {
            metadata: RequestMetadata::default(),
            ..self.clone()
        }
    }
}

/// A response received from the panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    /// Parsed JSON, or the raw text as a JSON string.
    pub body: Value,
}

/// Classification of a finished exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `elapsed` is `None` when the request was never stamped.
    Success { elapsed: Option<Duration> },
    SlowWarning { elapsed: Duration },
    Timeout {
        timeout: Duration,
        method: HttpMethod,
        url: String,
    },
    NetworkFailure { message: String },
    HttpError {
        status: u16,
        status_text: String,
        body: Value,
    },
}
