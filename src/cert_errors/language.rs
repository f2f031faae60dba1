use std::env;
use std::sync::Arc;

use crate::infra::CookieSource;

pub const DEFAULT_LANGUAGE: &str = "zh-CN";

pub const LANGUAGE_COOKIE: &str = "lang";

/// Picks the display language: explicit choice, `lang` cookie, system
/// locale, then [`DEFAULT_LANGUAGE`].
#[derive(Clone, Default)]
pub struct LanguageResolver {
    cookies: Option<Arc<dyn CookieSource>>,
    system_locale: Option<String>,
}

impl LanguageResolver {
    pub fn new(cookies: Option<Arc<dyn CookieSource>>, system_locale: Option<String>) -> Self {
        Self {
            cookies,
            system_locale,
        }
    }

    /// Uses the process locale from the environment.
    pub fn from_env(cookies: Option<Arc<dyn CookieSource>>) -> Self {
        Self::new(cookies, system_locale())
    }

    /// Same system locale, different cookie source.
    pub fn with_cookies(&self, cookies: Arc<dyn CookieSource>) -> Self {
        Self::new(Some(cookies), self.system_locale.clone())
    }

    pub fn detect(&self, explicit: Option<&str>) -> String {
        explicit
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.cookies
                    .as_ref()
                    .and_then(|cookies| cookies.get(LANGUAGE_COOKIE))
            })
            .or_else(|| self.system_locale.clone())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }
}

/// Reads `LC_ALL`, `LC_MESSAGES` and `LANG` in that order.
pub fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find_map(|value| normalize_locale(&value))
}

/// `en_US.UTF-8` becomes `en-US`. `C` and `POSIX` carry no language.
pub fn normalize_locale(value: &str) -> Option<String> {
    let base = value.split(['.', '@']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}
