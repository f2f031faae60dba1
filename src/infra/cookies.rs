//! Cookie lookup used for the stored UI language.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, COOKIE};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

pub trait CookieSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads cookies the transport's jar holds for one URL.
pub struct JarCookies {
    jar: Arc<Jar>,
    url: Url,
}

impl JarCookies {
    pub fn new(jar: Arc<Jar>, url: Url) -> Self {
        Self { jar, url }
    }
}

impl CookieSource for JarCookies {
    fn get(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let header = header.to_str().ok()?;
        find_cookie(header, name)
    }
}

/// Cookies sent with an incoming request.
#[derive(Debug, Default, Clone)]
pub struct HeaderCookies(String);

impl HeaderCookies {
    /// Joins every `Cookie` header; values that are not visible ASCII are
    /// skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let joined = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        Self(joined)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CookieSource for HeaderCookies {
    fn get(&self, name: &str) -> Option<String> {
        find_cookie(&self.0, name)
    }
}

/// Fixed set of cookies.
#[derive(Debug, Default, Clone)]
pub struct StaticCookies(HashMap<String, String>);

impl StaticCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl CookieSource for StaticCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Finds `name` in a `Cookie:` header value.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
