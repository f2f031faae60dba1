//! Transport abstraction layer.
//!
//! Provides a trait-based abstraction for request execution so the
//! pipeline can be driven by mock transports in tests.

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

use super::types::{ApiResponse, HttpMethod, RequestContext};
use crate::config::Config;
use crate::error::TransportError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Content type sent with bodies that do not declare one.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Trait for transports that execute HTTP requests.
///
/// Implementations resolve with the response for 2xx statuses and fail
/// with a [`TransportError`] otherwise. A received non-2xx response is
/// carried inside the error.
pub trait Transport: Send + Sync {
    /// Sends one request.
    ///
    /// # Arguments
    ///
    /// * `request` - The request, already stamped with its timeout
    ///
    /// # Returns
    ///
    /// A future that resolves to the 2xx response or the transport error.
    fn send<'a>(
        &'a self,
        request: &'a RequestContext,
    ) -> BoxFuture<'a, Result<ApiResponse, TransportError>>;
}

/// Transport backed by a shared `reqwest` client with a cookie jar.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
    cookies: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::other(format!("Invalid base URL: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        let cookies = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .cookie_provider(cookies.clone())
            .build()
            .map_err(|e| TransportError::other(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            cookies,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The jar shared with the client, e.g. for reading the `lang` cookie.
    pub fn cookie_jar(&self) -> Arc<Jar> {
        self.cookies.clone()
    }

    /// Absolute URLs pass through; anything else is joined onto the base.
    pub fn resolve_url(&self, url: &str) -> Result<Url, TransportError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(url)
                .map_err(|e| TransportError::other(format!("Invalid URL: {}", e))),
            Err(e) => Err(TransportError::other(format!("Invalid URL: {}", e))),
        }
    }

    fn build_request(&self, request: &RequestContext) -> Result<reqwest::RequestBuilder, TransportError> {
        let url = self.resolve_url(&request.url)?;
        let method = reqwest::Method::from_str(request.method.as_str())
            .map_err(|_| TransportError::other(format!("Invalid method: {}", request.method)))?;

        let mut builder = self.client.request(method, url);
        if let Some(timeout) = request.metadata.timeout {
            builder = builder.timeout(timeout);
        }
        for (key, value) in &request.headers {
            let name = HeaderName::from_str(key)
                .map_err(|_| TransportError::other(format!("Invalid header name: {}", key)))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            if request.content_type().is_none() && request.method != HttpMethod::Get {
                builder = builder.header("Content-Type", FORM_CONTENT_TYPE);
            }
            builder = builder.body(body.clone());
        }
        Ok(builder)
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: &'a RequestContext,
    ) -> BoxFuture<'a, Result<ApiResponse, TransportError>> {
        Box::pin(async move {
            let timeout = request.metadata.timeout;
            let response = self
                .build_request(request)?
                .send()
                .await
                .map_err(|e| TransportError::from_reqwest(e, timeout))?;

            let status = response.status();
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
                .collect();
            let text = response
                .text()
                .await
                .map_err(|e| TransportError::from_reqwest(e, timeout))?;

            let response = ApiResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                headers,
                body: parse_body(text),
            };

            if status.is_success() {
                Ok(response)
            } else {
                Err(TransportError::status(response))
            }
        })
    }
}

fn parse_body(text: String) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}
