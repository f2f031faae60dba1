//! Infrastructure layer providing abstractions for external collaborators.
//!
//! This module contains traits and implementations for:
//! - user notifications (dialogs and toasts)
//! - translation catalogs
//! - cookie lookup
//! - page reloads after authentication failures
//!
//! These abstractions are injected into the client pipeline and the
//! certificate error translator instead of being read from globals.

pub mod catalog;
pub mod cookies;
pub mod notify;
pub mod reload;

pub use catalog::{EmbeddedCatalog, NoTranslations, TranslationError, TranslationSource};
pub use cookies::{CookieSource, HeaderCookies, JarCookies, StaticCookies};
pub use notify::{Dialog, NoopSink, NotificationSink, RetryAction, RetryFuture, Severity, TracingSink};
pub use reload::{LoggingReloader, PageReloader};
