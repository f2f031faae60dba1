//! Client pipeline.
//!
//! Wires the request interceptor, a [`Transport`] and the response
//! handler together. All collaborators are injected, which keeps the
//! pipeline testable with mock implementations.

use std::sync::Arc;
use std::time::Duration;

use super::handler::{ResponseHandler, Settlement};
use super::interceptor::RequestInterceptor;
use super::transport::{BoxFuture, Transport};
use super::types::{ApiResponse, RequestContext};
use crate::config::Config;
use crate::error::ClientError;
use crate::infra::{NotificationSink, PageReloader, RetryAction};
use crate::policy::TimeoutPolicy;

type RequestResult = Result<ApiResponse, ClientError>;

struct Inner {
    transport: Arc<dyn Transport>,
    interceptor: RequestInterceptor,
    handler: ResponseHandler,
}

/// HTTP client that applies the timeout policy and outcome handling to
/// every request.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

impl HttpClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
        reloader: Arc<dyn PageReloader>,
    ) -> Self {
        Self::with_policy(
            transport,
            sink,
            reloader,
            TimeoutPolicy::STANDARD,
            Duration::from_millis(crate::config::DEFAULT_SLOW_REQUEST_MS),
        )
    }

    pub fn from_config(
        config: &Config,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
        reloader: Arc<dyn PageReloader>,
    ) -> Self {
        Self::with_policy(
            transport,
            sink,
            reloader,
            TimeoutPolicy::STANDARD,
            config.slow_request_threshold,
        )
    }

    pub fn with_policy(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
        reloader: Arc<dyn PageReloader>,
        policy: TimeoutPolicy,
        slow_threshold: Duration,
    ) -> Self {
        let handler = ResponseHandler::new(sink, reloader)
            .with_policy(policy)
            .with_slow_threshold(slow_threshold);
        Self {
            inner: Arc::new(Inner {
                transport,
                interceptor: RequestInterceptor::new(policy),
                handler,
            }),
        }
    }

    /// Sends a request through the pipeline.
    ///
    /// A 401 answer hands control to the page reloader and the returned
    /// future never resolves.
    pub fn request(&self, ctx: RequestContext) -> BoxFuture<'static, RequestResult> {
        let client = self.clone();
        Box::pin(async move { client.dispatch(ctx).await })
    }

    pub fn get(&self, url: &str) -> BoxFuture<'static, RequestResult> {
        self.request(RequestContext::get(url))
    }

    pub fn post(&self, url: &str, body: Option<String>) -> BoxFuture<'static, RequestResult> {
        self.request(RequestContext::post(url, body))
    }

    async fn dispatch(&self, mut ctx: RequestContext) -> RequestResult {
        self.inner.interceptor.prepare(&mut ctx);

        match self.inner.transport.send(&ctx).await {
            Ok(response) => {
                self.inner.handler.on_success(&ctx, &response);
                Ok(response)
            }
            Err(error) => {
                let retry = self.retry_action(&ctx);
                let (outcome, settlement) = self.inner.handler.on_failure(&ctx, error, Some(retry));
                tracing::trace!(?outcome, "Request settled");
                match settlement {
                    Settlement::Reject(error) => Err(error),
                    Settlement::Unsettled => std::future::pending().await,
                }
            }
        }
    }

    /// Re-runs the whole pipeline for a copy of `ctx`.
    fn retry_action(&self, ctx: &RequestContext) -> RetryAction {
        let client = self.clone();
        let ctx = ctx.reissue();
        RetryAction::new(move || client.request(ctx))
    }
}
