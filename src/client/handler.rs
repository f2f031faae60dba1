//! Response outcome handling.
//!
//! Turns a completed or failed exchange into exactly one [`Outcome`],
//! notifies the user where appropriate and decides what the caller gets
//! back.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::types::{ApiResponse, HttpMethod, Outcome, RequestContext};
use crate::config::DEFAULT_SLOW_REQUEST_MS;
use crate::error::{ClientError, TransportError};
use crate::infra::{Dialog, NotificationSink, PageReloader, RetryAction};
use crate::policy::{RequestClass, TimeoutPolicy};
use crate::shared::{is_slow, millis, seconds_label};

const TIMEOUT_DIALOG_DURATION: Duration = Duration::from_secs(10);
const NETWORK_DIALOG_DURATION: Duration = Duration::from_secs(8);
const SERVER_ERROR_DURATION: Duration = Duration::from_secs(6);

const DEFAULT_NETWORK_MESSAGE: &str = "Network connection failed";

/// What the caller of a failed request receives.
#[derive(Debug)]
pub enum Settlement {
    Reject(ClientError),
    /// The page is being reloaded; the caller is never answered.
    Unsettled,
}

pub struct ResponseHandler {
    sink: Arc<dyn NotificationSink>,
    reloader: Arc<dyn PageReloader>,
    policy: TimeoutPolicy,
    slow_threshold: Duration,
}

impl ResponseHandler {
    pub fn new(sink: Arc<dyn NotificationSink>, reloader: Arc<dyn PageReloader>) -> Self {
        Self {
            sink,
            reloader,
            policy: TimeoutPolicy::STANDARD,
            slow_threshold: Duration::from_millis(DEFAULT_SLOW_REQUEST_MS),
        }
    }

    pub fn with_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Classifies a response the transport accepted.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The request as stamped by the interceptor
    /// * `response` - The 2xx response
    ///
    /// # Returns
    ///
    /// `Outcome::SlowWarning` when the exchange took longer than the slow
    /// threshold, `Outcome::Success` otherwise. Requests without a start
    /// time are always a plain success.
    pub fn on_success(&self, ctx: &RequestContext, response: &ApiResponse) -> Outcome {
        match ctx.elapsed() {
            Some(elapsed) => self.classify_elapsed(ctx, response.status, elapsed),
            None => Outcome::Success { elapsed: None },
        }
    }

    /// Classifies a successful exchange that took `elapsed`.
    pub fn classify_elapsed(&self, ctx: &RequestContext, status: u16, elapsed: Duration) -> Outcome {
        tracing::info!(
            method = %ctx.method,
            url = %ctx.url,
            status,
            elapsed_ms = millis(elapsed),
            "Request completed"
        );

        if is_slow(elapsed, self.slow_threshold) {
            tracing::warn!(
                method = %ctx.method,
                url = %ctx.url,
                elapsed_ms = millis(elapsed),
                "Slow request detected"
            );
            Outcome::SlowWarning { elapsed }
        } else {
            Outcome::Success {
                elapsed: Some(elapsed),
            }
        }
    }

    /// Handles a transport failure. The timeout check runs before the
    /// no-response check.
    pub fn on_failure(
        &self,
        ctx: &RequestContext,
        error: TransportError,
        retry: Option<RetryAction>,
    ) -> (Outcome, Settlement) {
        if let Some(elapsed) = ctx.elapsed() {
            tracing::info!(
                method = %ctx.method,
                url = %ctx.url,
                elapsed_ms = millis(elapsed),
                "Request failed"
            );
        }

        if error.is_timeout() {
            return self.timed_out(ctx, retry);
        }

        match error.response {
            None => self.network_failure(error.message, retry),
            Some(_) => self.http_error(error),
        }
    }

    fn timed_out(&self, ctx: &RequestContext, retry: Option<RetryAction>) -> (Outcome, Settlement) {
        let timeout = ctx
            .metadata
            .timeout
            .unwrap_or_else(|| self.policy.duration(RequestClass::Default));
        let message = timeout_message(&ctx.method, &ctx.url, timeout);
        tracing::error!(timeout_ms = millis(timeout), "{}", message);

        self.sink.dialog(Dialog::retryable(
            "Request Timeout",
            format!(
                "{}\n\nPossible causes:\n• Unstable network connection\n• Slow server response\n• Request payload too large\n\nSuggestions:\n• Check your network connection\n• Retry later",
                message
            ),
            TIMEOUT_DIALOG_DURATION,
            retry,
        ));

        let outcome = Outcome::Timeout {
            timeout,
            method: ctx.method.clone(),
            url: ctx.url.clone(),
        };
        (outcome, Settlement::Reject(ClientError::Timeout { message }))
    }

    fn network_failure(&self, message: String, retry: Option<RetryAction>) -> (Outcome, Settlement) {
        let message = if message.is_empty() {
            DEFAULT_NETWORK_MESSAGE.to_string()
        } else {
            message
        };
        tracing::error!(message = %message, "Network error");

        self.sink.dialog(Dialog::retryable(
            "Network Error",
            format!(
                "{}\n\nPlease check:\n• Network connection status\n• Whether the server is running\n• Firewall settings",
                message
            ),
            NETWORK_DIALOG_DURATION,
            retry,
        ));

        let outcome = Outcome::NetworkFailure {
            message: message.clone(),
        };
        (outcome, Settlement::Reject(ClientError::Network { message }))
    }

    fn http_error(&self, error: TransportError) -> (Outcome, Settlement) {
        let Some(response) = error.response.as_ref() else {
            return self.network_failure(error.message, None);
        };
        let status = response.status;
        tracing::error!(
            status,
            status_text = %response.status_text,
            body = %response.body,
            "HTTP error"
        );

        let outcome = Outcome::HttpError {
            status,
            status_text: response.status_text.clone(),
            body: response.body.clone(),
        };

        if status == 401 {
            tracing::warn!("Authentication failed, reloading");
            self.reloader.reload();
            return (outcome, Settlement::Unsettled);
        }

        if status >= 500 {
            let message = http_user_message(status, &response.body);
            self.sink
                .dialog(Dialog::notice("Server Error", message, SERVER_ERROR_DURATION));
        }

        (outcome, Settlement::Reject(ClientError::Http(error)))
    }
}

/// `Request timed out (15s)`, plus method and URL for anything but GET.
pub fn timeout_message(method: &HttpMethod, url: &str, timeout: Duration) -> String {
    let mut message = format!("Request timed out ({}s)", seconds_label(timeout));
    if *method != HttpMethod::Get {
        let url = if url.is_empty() { "Unknown URL" } else { url };
        message.push_str(&format!(" - {} {}", method, url));
    }
    message
}

/// User-facing text for an HTTP error status.
pub fn http_user_message(status: u16, body: &Value) -> String {
    match status {
        403 => "Insufficient permission to access this resource".to_string(),
        404 => "The requested resource does not exist".to_string(),
        s if s >= 500 => "Internal server error, please retry later".to_string(),
        _ => match body.get("msg").and_then(Value::as_str) {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => format!("Request failed ({})", status),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingSink {
        dialogs: Mutex<Vec<Dialog>>,
    }

    impl NotificationSink for RecordingSink {
        fn dialog(&self, dialog: Dialog) {
            self.dialogs.lock().unwrap().push(dialog);
        }
        fn error(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn info(&self, _message: &str) {}
    }

    #[derive(Default)]
    struct CountingReloader(AtomicUsize);

    impl PageReloader for CountingReloader {
        fn reload(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn handler() -> (ResponseHandler, Arc<RecordingSink>, Arc<CountingReloader>) {
        let sink = Arc::new(RecordingSink::default());
        let reloader = Arc::new(CountingReloader::default());
        (
            ResponseHandler::new(sink.clone(), reloader.clone()),
            sink,
            reloader,
        )
    }

    fn response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            status,
            status_text: String::new(),
            headers: HashMap::new(),
            body,
        }
    }

    fn stamped(ctx: RequestContext, timeout: Duration) -> RequestContext {
        let mut ctx = ctx;
        ctx.metadata.start_time = Some(Instant::now());
        ctx.metadata.timeout = Some(timeout);
        ctx
    }

    #[test]
    fn test_slow_threshold() {
        let (handler, _, _) = handler();
        let ctx = RequestContext::get("/panel/api/server/status");

        assert_eq!(
            handler.classify_elapsed(&ctx, 200, Duration::from_millis(6000)),
            Outcome::SlowWarning {
                elapsed: Duration::from_millis(6000)
            }
        );
        assert_eq!(
            handler.classify_elapsed(&ctx, 200, Duration::from_millis(4000)),
            Outcome::Success {
                elapsed: Some(Duration::from_millis(4000))
            }
        );
    }

    #[test]
    fn test_success_without_start_time() {
        let (handler, _, _) = handler();
        let ctx = RequestContext::get("/");
        assert_eq!(
            handler.on_success(&ctx, &response(200, Value::Null)),
            Outcome::Success { elapsed: None }
        );
    }

    #[test]
    fn test_success_with_start_time() {
        let (handler, _, _) = handler();
        let ctx = stamped(RequestContext::get("/"), Duration::from_secs(10));
        assert!(matches!(
            handler.on_success(&ctx, &response(200, Value::Null)),
            Outcome::Success { elapsed: Some(_) }
        ));
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            timeout_message(&HttpMethod::Get, "/panel/api/inbounds/list", Duration::from_secs(10)),
            "Request timed out (10s)"
        );
        assert_eq!(
            timeout_message(&HttpMethod::Post, "/panel/api/inbounds/add", Duration::from_secs(15)),
            "Request timed out (15s) - POST /panel/api/inbounds/add"
        );
        assert_eq!(
            timeout_message(&HttpMethod::Delete, "", Duration::from_millis(1500)),
            "Request timed out (1.5s) - DELETE Unknown URL"
        );
    }

    #[test]
    fn test_timeout_wins_over_network_failure() {
        let (handler, sink, _) = handler();
        let ctx = stamped(
            RequestContext::post("/panel/api/inbounds/add", None),
            Duration::from_secs(15),
        );
        let error = TransportError::network("timeout of 15000ms exceeded");
        assert_eq!(error.kind, TransportErrorKind::Connect);

        let (outcome, settlement) = handler.on_failure(&ctx, error, None);
        assert!(matches!(outcome, Outcome::Timeout { timeout, .. } if timeout == Duration::from_secs(15)));
        match settlement {
            Settlement::Reject(ClientError::Timeout { message }) => assert_eq!(
                message,
                "Request timed out (15s) - POST /panel/api/inbounds/add"
            ),
            other => panic!("unexpected settlement: {:?}", other),
        }

        let dialogs = sink.dialogs.lock().unwrap();
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].title, "Request Timeout");
        assert!(dialogs[0].content.contains("Slow server response"));
        assert_eq!(dialogs[0].ok_text.as_deref(), Some("Retry"));
    }

    #[test]
    fn test_timeout_without_metadata_uses_default() {
        let (handler, _, _) = handler();
        let ctx = RequestContext::get("/");
        let (outcome, _) =
            handler.on_failure(&ctx, TransportError::aborted(Duration::from_secs(1)), None);
        assert!(matches!(outcome, Outcome::Timeout { timeout, .. } if timeout == Duration::from_secs(15)));
    }

    #[test]
    fn test_network_failure() {
        let (handler, sink, _) = handler();
        let ctx = stamped(RequestContext::get("/"), Duration::from_secs(10));
        let (outcome, settlement) =
            handler.on_failure(&ctx, TransportError::network("connection refused"), None);

        assert_eq!(
            outcome,
            Outcome::NetworkFailure {
                message: "connection refused".to_string()
            }
        );
        assert!(matches!(
            settlement,
            Settlement::Reject(ClientError::Network { ref message }) if message == "connection refused"
        ));
        let dialogs = sink.dialogs.lock().unwrap();
        assert_eq!(dialogs[0].title, "Network Error");
        assert!(dialogs[0].content.contains("Firewall settings"));
    }

    #[test]
    fn test_network_failure_default_message() {
        let (handler, _, _) = handler();
        let ctx = RequestContext::get("/");
        let (_, settlement) = handler.on_failure(&ctx, TransportError::network(""), None);
        assert!(matches!(
            settlement,
            Settlement::Reject(ClientError::Network { ref message }) if message == DEFAULT_NETWORK_MESSAGE
        ));
    }

    #[test]
    fn test_unauthorized_reloads_without_rejection() {
        let (handler, sink, reloader) = handler();
        let ctx = RequestContext::get("/panel/api/inbounds/list");
        let error = TransportError::status(response(401, Value::Null));

        let (outcome, settlement) = handler.on_failure(&ctx, error, None);
        assert!(matches!(outcome, Outcome::HttpError { status: 401, .. }));
        assert!(matches!(settlement, Settlement::Unsettled));
        assert_eq!(reloader.0.load(Ordering::SeqCst), 1);
        assert!(sink.dialogs.lock().unwrap().is_empty());
    }

    #[test]
    fn test_server_error_shows_passive_notice() {
        let (handler, sink, _) = handler();
        let ctx = RequestContext::get("/");
        let error = TransportError::status(response(502, json!({ "msg": "upstream" })));

        let (_, settlement) = handler.on_failure(&ctx, error, None);
        match settlement {
            Settlement::Reject(ClientError::Http(original)) => {
                assert_eq!(original.message, "Request failed with status code 502");
                assert_eq!(original.response.unwrap().body["msg"], "upstream");
            }
            other => panic!("unexpected settlement: {:?}", other),
        }
        let dialogs = sink.dialogs.lock().unwrap();
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].content, "Internal server error, please retry later");
        assert!(!dialogs[0].is_retryable());
    }

    #[test]
    fn test_client_errors_are_silent() {
        let (handler, sink, _) = handler();
        let ctx = RequestContext::get("/");
        for status in [400, 403, 404] {
            let error = TransportError::status(response(status, Value::Null));
            let (_, settlement) = handler.on_failure(&ctx, error, None);
            assert!(matches!(settlement, Settlement::Reject(ClientError::Http(_))));
        }
        assert!(sink.dialogs.lock().unwrap().is_empty());
    }

    #[test]
    fn test_http_user_message() {
        assert_eq!(
            http_user_message(403, &Value::Null),
            "Insufficient permission to access this resource"
        );
        assert_eq!(
            http_user_message(404, &json!({ "msg": "ignored" })),
            "The requested resource does not exist"
        );
        assert_eq!(
            http_user_message(503, &Value::Null),
            "Internal server error, please retry later"
        );
        assert_eq!(
            http_user_message(400, &json!({ "msg": "port in use" })),
            "port in use"
        );
        assert_eq!(http_user_message(409, &json!({ "msg": "" })), "Request failed (409)");
        assert_eq!(http_user_message(422, &Value::Null), "Request failed (422)");
    }
}
