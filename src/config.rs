use std::env;
use std::time::Duration;

/// Requests slower than this are logged as slow.
pub const DEFAULT_SLOW_REQUEST_MS: u64 = 5000;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:2053";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub language: Option<String>,
    pub slow_request_threshold: Duration,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            base_url: lookup("PANEL_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            language: lookup("PANEL_LANG").filter(|l| !l.trim().is_empty()),
            slow_request_threshold: Duration::from_millis(
                lookup("SLOW_REQUEST_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SLOW_REQUEST_MS),
            ),
            user_agent: lookup("PANEL_USER_AGENT")
                .unwrap_or_else(|| format!("panel-http/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.language.is_none());
        assert_eq!(config.slow_request_threshold, Duration::from_millis(5000));
        assert!(config.user_agent.starts_with("panel-http/"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "8080"),
            ("PANEL_BASE_URL", "https://panel.example.com"),
            ("PANEL_LANG", "en-US"),
            ("SLOW_REQUEST_MS", "750"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "https://panel.example.com");
        assert_eq!(config.language.as_deref(), Some("en-US"));
        assert_eq!(config.slow_request_threshold, Duration::from_millis(750));
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = Config::from_lookup(|key| match key {
            "PORT" => Some("not-a-port".to_string()),
            "SLOW_REQUEST_MS" => Some("soon".to_string()),
            "PANEL_LANG" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.port, 3000);
        assert_eq!(config.slow_request_threshold, Duration::from_millis(5000));
        assert!(config.language.is_none());
    }
}
