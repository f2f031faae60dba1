use serde_json::Value;
use std::sync::Arc;

use super::code::{CertErrorCode, KnownCertError};
use super::language::LanguageResolver;
use crate::infra::{
    CookieSource, NotificationSink, Severity, TranslationError, TranslationSource,
};

const UNKNOWN_ERROR: &str = "Unknown error";

/// Turns `CERT_Ennn` codes into messages for the user.
///
/// Lookup order is the translation catalog for the detected language, then
/// the built-in English text, then the caller's fallback. None of the
/// operations fail; every error degrades to a best-effort string.
#[derive(Clone)]
pub struct CertErrorTranslator {
    source: Arc<dyn TranslationSource>,
    language: LanguageResolver,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl CertErrorTranslator {
    pub fn new(
        source: Arc<dyn TranslationSource>,
        language: LanguageResolver,
        sink: Option<Arc<dyn NotificationSink>>,
    ) -> Self {
        Self {
            source,
            language,
            sink,
        }
    }

    /// Message for `code`. Codes outside the `CERT_E` family return the
    /// fallback, else the code itself. Codes with the prefix but no valid
    /// three-digit suffix skip the catalog and the English table.
    pub fn resolve(&self, code: &str, fallback: &str, language: Option<&str>) -> String {
        if !CertErrorCode::is_cert_code(code) {
            return degrade(code, fallback);
        }

        if let Ok(parsed) = CertErrorCode::parse(code) {
            let language = self.current_language(language);
            match self.translated_message(parsed, &language) {
                Ok(Some(message)) => return message,
                Ok(None) => {}
                Err(error) => {
                    tracing::error!(code, error = %error, "Certificate error lookup failed");
                    return degrade(code, fallback);
                }
            }

            if let Some(message) = parsed.known().map(KnownCertError::english) {
                return message.to_string();
            }
        }

        if fallback.is_empty() {
            format!("Certificate Error: {}", code)
        } else {
            fallback.to_string()
        }
    }

    /// A copy that reads the `lang` cookie from `cookies`.
    pub fn with_cookies(&self, cookies: Arc<dyn CookieSource>) -> Self {
        Self {
            source: self.source.clone(),
            language: self.language.with_cookies(cookies),
            sink: self.sink.clone(),
        }
    }

    pub fn current_language(&self, explicit: Option<&str>) -> String {
        self.language.detect(explicit)
    }

    /// Catalog text for `cert_errors.<code>`, ignoring empty entries.
    pub fn translated_message(
        &self,
        code: CertErrorCode,
        language: &str,
    ) -> Result<Option<String>, TranslationError> {
        let key = format!("cert_errors.{}", code);
        Ok(self
            .source
            .lookup(&key, language)?
            .filter(|message| !message.is_empty()))
    }

    pub fn default_english_message(&self, code: &str) -> Option<&'static str> {
        CertErrorCode::parse(code)
            .ok()
            .and_then(CertErrorCode::known)
            .map(KnownCertError::english)
    }

    /// Adds `error.userMessage` when `error.code` is a certificate code.
    /// Everything else is returned as-is.
    pub fn normalize_api_response(&self, response: Value) -> Value {
        let user_message = {
            let Some(error) = response.get("error") else {
                return response;
            };
            let Some(code) = error
                .get("code")
                .and_then(Value::as_str)
                .filter(|code| CertErrorCode::is_cert_code(code))
            else {
                return response;
            };
            let fallback = error.get("message").and_then(Value::as_str).unwrap_or("");
            self.resolve(code, fallback, None)
        };

        let mut normalized = response;
        if let Some(error) = normalized.get_mut("error").and_then(Value::as_object_mut) {
            error.insert("userMessage".to_string(), Value::String(user_message));
        }
        normalized
    }

    pub fn present_toast(&self, code: &str, details: &str, severity: Severity) {
        let message = self.resolve(code, "", None);

        match &self.sink {
            Some(sink) => {
                sink.toast(severity, &message);
                if !details.is_empty() {
                    tracing::warn!(code, details, "Certificate error details");
                }
            }
            None => tracing::error!(target: "alert", "{}", message),
        }
    }
}

fn degrade(code: &str, fallback: &str) -> String {
    [fallback, code]
        .into_iter()
        .find(|text| !text.is_empty())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}
