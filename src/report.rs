//! Handler for errors nothing else caught.
//!
//! Records are logged, not shipped anywhere.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::error::Error;
use std::sync::OnceLock;

use crate::config::Config;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub timestamp: String,
    pub message: String,
    pub stack: Option<String>,
    pub context: String,
    pub user_agent: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ErrorReporter {
    user_agent: String,
    page_url: String,
}

impl ErrorReporter {
    pub fn new(user_agent: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            page_url: page_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.user_agent.clone(), config.base_url.clone())
    }

    pub fn handle(&self, error: &(dyn Error + 'static), context: &str) -> ErrorRecord {
        let message = error.to_string();
        let record = ErrorRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message: if message.is_empty() {
                "Unknown error".to_string()
            } else {
                message
            },
            stack: source_chain(error),
            context: context.to_string(),
            user_agent: self.user_agent.clone(),
            url: self.page_url.clone(),
        };

        tracing::error!(
            timestamp = %record.timestamp,
            message = %record.message,
            stack = record.stack.as_deref().unwrap_or(""),
            context = %record.context,
            user_agent = %record.user_agent,
            url = %record.url,
            "Uncaught error"
        );
        record
    }
}

/// Each `source()` on its own line, outermost first.
fn source_chain(error: &(dyn Error + 'static)) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        lines.push(format!("caused by: {}", cause));
        current = cause.source();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

static REPORTER: OnceLock<ErrorReporter> = OnceLock::new();

/// Process-wide entry point, configured from the environment on first use.
pub fn handle_global_error(error: &(dyn Error + 'static), context: &str) -> ErrorRecord {
    REPORTER
        .get_or_init(|| ErrorReporter::from_config(&Config::from_env()))
        .handle(error, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::TranslationError;

    #[test]
    fn test_record_fields() {
        let reporter = ErrorReporter::new("panel-http/test", "http://127.0.0.1:2053/panel/");
        let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");

        let record = reporter.handle(&error, "saving settings");
        assert_eq!(record.message, "disk full");
        assert_eq!(record.context, "saving settings");
        assert_eq!(record.user_agent, "panel-http/test");
        assert_eq!(record.url, "http://127.0.0.1:2053/panel/");
        assert!(record.stack.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[test]
    fn test_stack_from_sources() {
        let reporter = ErrorReporter::new("ua", "url");
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = TranslationError::Malformed {
            name: "en-US".to_string(),
            source: cause,
        };

        let record = reporter.handle(&error, "");
        let stack = record.stack.unwrap();
        assert!(stack.starts_with("caused by: "));
        assert!(record.message.starts_with("catalog en-US is not valid JSON"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = ErrorReporter::new("ua", "url").handle(&std::fmt::Error, "ctx");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["userAgent"], "ua");
        assert!(json.get("timestamp").is_some());
    }
}
