//! Certificate error codes and their user-facing messages.

pub mod code;
pub mod language;
pub mod translator;

pub use code::{CertErrorCode, CodeParseError, KnownCertError, CERT_CODE_PREFIX};
pub use language::{LanguageResolver, DEFAULT_LANGUAGE, LANGUAGE_COOKIE};
pub use translator::CertErrorTranslator;

use std::sync::{Arc, OnceLock};

use crate::infra::{
    CookieSource, EmbeddedCatalog, NoTranslations, TracingSink, TranslationSource,
};

static TRANSLATOR: OnceLock<CertErrorTranslator> = OnceLock::new();

impl CertErrorTranslator {
    /// Embedded catalogs, locale from the environment, log-backed sink.
    /// `cookies` supplies the stored `lang` choice when there is one.
    pub fn embedded(
        language_override: Option<String>,
        cookies: Option<Arc<dyn CookieSource>>,
    ) -> Self {
        let source: Arc<dyn TranslationSource> = match EmbeddedCatalog::load() {
            Ok(catalog) => Arc::new(catalog),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load translation catalogs");
                Arc::new(NoTranslations)
            }
        };
        let system_locale = language_override.or_else(language::system_locale);
        Self::new(
            source,
            LanguageResolver::new(cookies, system_locale),
            Some(Arc::new(TracingSink)),
        )
    }
}

/// Registers the process-wide translator. Only the first call wins; later
/// calls hand their translator back.
pub fn install(translator: CertErrorTranslator) -> Result<(), CertErrorTranslator> {
    TRANSLATOR.set(translator)
}

/// The process-wide translator, created with [`CertErrorTranslator::embedded`]
/// if nothing was installed.
pub fn global() -> &'static CertErrorTranslator {
    TRANSLATOR.get_or_init(|| CertErrorTranslator::embedded(None, None))
}
