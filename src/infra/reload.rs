//! Page reload hook.

/// Called when the panel answers 401 and the session must be rebuilt.
pub trait PageReloader: Send + Sync {
    fn reload(&self);
}

/// Logs the reload. For hosts without a page to reload.
#[derive(Debug, Default, Clone)]
pub struct LoggingReloader;

impl PageReloader for LoggingReloader {
    fn reload(&self) {
        tracing::warn!("Authentication failed, session must be re-established");
    }
}
