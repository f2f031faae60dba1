//! Translation catalogs.
//!
//! Provides a trait-based abstraction over the i18n lookup so the
//! translator can be tested without the embedded catalogs.

use rust_embed::RustEmbed;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/locales/"]
struct LocaleAssets;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("catalog {name} is not valid JSON: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("translation source unavailable: {0}")]
    Unavailable(String),
}

/// Looks up a dotted key such as `cert_errors.CERT_E001` in one language.
pub trait TranslationSource: Send + Sync {
    fn lookup(&self, key: &str, language: &str) -> Result<Option<String>, TranslationError>;
}

/// JSON catalogs keyed by lowercase language tag.
#[derive(Debug, Default, Clone)]
pub struct EmbeddedCatalog {
    catalogs: HashMap<String, Value>,
}

impl EmbeddedCatalog {
    /// Loads every `locales/*.json` file compiled into the binary.
    pub fn load() -> Result<Self, TranslationError> {
        let mut catalogs = HashMap::new();
        for file in LocaleAssets::iter() {
            let Some(name) = file.strip_suffix(".json") else {
                continue;
            };
            let Some(asset) = LocaleAssets::get(&file) else {
                continue;
            };
            let value: Value =
                serde_json::from_slice(&asset.data).map_err(|source| TranslationError::Malformed {
                    name: name.to_string(),
                    source,
                })?;
            catalogs.insert(normalize_tag(name), value);
        }
        tracing::debug!(languages = catalogs.len(), "Loaded translation catalogs");
        Ok(Self { catalogs })
    }

    pub fn from_catalogs<I, S>(catalogs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        Self {
            catalogs: catalogs
                .into_iter()
                .map(|(name, value)| (normalize_tag(name.as_ref()), value))
                .collect(),
        }
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    /// Exact tag first, then the primary subtag, then any regional variant
    /// of it.
    fn catalogs_for(&self, language: &str) -> Vec<&Value> {
        let tag = normalize_tag(language);
        let primary = tag.split('-').next().unwrap_or_default().to_string();

        let mut found = Vec::new();
        if let Some(catalog) = self.catalogs.get(&tag) {
            found.push(catalog);
        }
        if primary != tag {
            if let Some(catalog) = self.catalogs.get(&primary) {
                found.push(catalog);
            }
        }
        let prefix = format!("{}-", primary);
        let mut variants: Vec<_> = self
            .catalogs
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix) && **name != tag)
            .collect();
        variants.sort_by(|a, b| a.0.cmp(b.0));
        found.extend(variants.into_iter().map(|(_, catalog)| catalog));
        found
    }
}

impl TranslationSource for EmbeddedCatalog {
    fn lookup(&self, key: &str, language: &str) -> Result<Option<String>, TranslationError> {
        Ok(self
            .catalogs_for(language)
            .into_iter()
            .find_map(|catalog| lookup_dotted(catalog, key))
            .map(str::to_string))
    }
}

/// A source that never has a translation.
#[derive(Debug, Default, Clone)]
pub struct NoTranslations;

impl TranslationSource for NoTranslations {
    fn lookup(&self, _key: &str, _language: &str) -> Result<Option<String>, TranslationError> {
        Ok(None)
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}

fn lookup_dotted<'a>(catalog: &'a Value, key: &str) -> Option<&'a str> {
    key.split('.')
        .try_fold(catalog, |node, part| node.get(part))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}
