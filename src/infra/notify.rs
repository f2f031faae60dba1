//! Notification sink abstraction.
//!
//! The pipeline never talks to a UI directly. Dialogs and toasts go
//! through [`NotificationSink`], so hosts can plug in their own surface
//! and tests can record what would have been shown.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::client::types::ApiResponse;
use crate::error::ClientError;

pub type RetryFuture = Pin<Box<dyn Future<Output = Result<ApiResponse, ClientError>> + Send>>;

/// Re-issues a failed request when the user confirms a dialog.
pub struct RetryAction(Box<dyn FnOnce() -> RetryFuture + Send>);

impl RetryAction {
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() -> RetryFuture + Send + 'static,
    {
        Self(Box::new(action))
    }

    pub fn run(self) -> RetryFuture {
        (self.0)()
    }
}

impl fmt::Debug for RetryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RetryAction")
    }
}

/// An error dialog. Dialogs without `on_ok` are passive.
#[derive(Debug)]
pub struct Dialog {
    pub title: String,
    pub content: String,
    pub ok_text: Option<String>,
    pub cancel_text: Option<String>,
    /// How long the dialog stays up.
    pub duration: Duration,
    pub on_ok: Option<RetryAction>,
}

impl Dialog {
    /// A passive dialog with no actions.
    pub fn notice(title: impl Into<String>, content: impl Into<String>, duration: Duration) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ok_text: None,
            cancel_text: None,
            duration,
            on_ok: None,
        }
    }

    /// A dialog offering "Retry" and "Cancel".
    pub fn retryable(
        title: impl Into<String>,
        content: impl Into<String>,
        duration: Duration,
        retry: Option<RetryAction>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ok_text: Some("Retry".to_string()),
            cancel_text: Some("Cancel".to_string()),
            duration,
            on_ok: retry,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.on_ok.is_some()
    }
}

/// Toast level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Anything other than `error` or `warning` is shown as info.
    pub fn parse(value: &str) -> Self {
        match value {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

/// Surface that shows dialogs and toasts to the user.
pub trait NotificationSink: Send + Sync {
    fn dialog(&self, dialog: Dialog);

    fn error(&self, message: &str);

    fn warn(&self, message: &str);

    fn info(&self, message: &str);

    fn toast(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => self.error(message),
            Severity::Warning => self.warn(message),
            Severity::Info => self.info(message),
        }
    }
}

/// Writes notifications to the log. Used where there is no UI.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn dialog(&self, dialog: Dialog) {
        tracing::error!(
            title = %dialog.title,
            retryable = dialog.is_retryable(),
            "{}",
            dialog.content
        );
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn dialog(&self, _dialog: Dialog) {}

    fn error(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn info(&self, _message: &str) {}
}
