use std::env;
use std::time::Duration;

use crate::error::{GenPixError, Result};

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub session_tokens: Vec<String>,
    pub public_routes: bool,
    pub upstream_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PageConfig {
    pub generation_url: String,
    pub proxy_base_url: String,
    pub session_token: Option<String>,
    pub request_timeout_secs: u64,
    pub slot_count: usize,
    pub reset_delay_ms: u64,
    pub content_type: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub proxy: ProxyConfig,
    pub page: PageConfig,
    pub log_json: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            session_tokens: Vec::new(),
            public_routes: false,
            upstream_timeout_secs: 30,
        }
    }
}

impl ProxyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let session_tokens = env::var("SESSION_TOKENS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();
        let public_routes = env::var("ENABLE_PUBLIC_PROXY")
            .ok()
            .map_or(false, |val| val == "true");
        let upstream_timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.upstream_timeout_secs);

        ProxyConfig {
            host,
            port,
            session_tokens,
            public_routes,
            upstream_timeout_secs,
        }
    }

    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_tokens.push(token.into());
        self
    }

    pub fn with_public_routes(mut self, enabled: bool) -> Self {
        self.public_routes = enabled;
        self
    }

    pub fn with_upstream_timeout(mut self, secs: u64) -> Self {
        self.upstream_timeout_secs = secs;
        self
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn accepts(&self, token: &str) -> bool {
        !token.is_empty() && self.session_tokens.iter().any(|t| t == token)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session_tokens.is_empty() {
            return Err(GenPixError::ConfigError(
                "At least one session token is required for the download proxy".into(),
            ));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(GenPixError::ConfigError(
                "Upstream timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            generation_url: "http://127.0.0.1:3000/api/image".to_string(),
            proxy_base_url: "http://127.0.0.1:3000".to_string(),
            session_token: None,
            request_timeout_secs: 60,
            slot_count: 5,
            reset_delay_ms: 2500,
            content_type: "image/png".to_string(),
            display_name: "image.png".to_string(),
        }
    }
}

impl PageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        PageConfig {
            generation_url: env::var("GENERATION_API_URL").unwrap_or(defaults.generation_url),
            proxy_base_url: env::var("PROXY_BASE_URL").unwrap_or(defaults.proxy_base_url),
            session_token: env::var("SESSION_TOKEN").ok(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            slot_count: env::var("DOWNLOAD_SLOTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.slot_count),
            reset_delay_ms: env::var("DOWNLOAD_RESET_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.reset_delay_ms),
            content_type: env::var("DOWNLOAD_CONTENT_TYPE").unwrap_or(defaults.content_type),
            display_name: defaults.display_name,
        }
    }

    pub fn with_endpoints(
        mut self,
        generation_url: impl Into<String>,
        proxy_base_url: impl Into<String>,
    ) -> Self {
        self.generation_url = generation_url.into();
        self.proxy_base_url = proxy_base_url.into();
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count;
        self
    }

    pub fn with_reset_delay(mut self, delay_ms: u64) -> Self {
        self.reset_delay_ms = delay_ms;
        self
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            proxy: ProxyConfig::from_env(),
            page: PageConfig::from_env(),
            log_json: env::var("LOG_JSON").ok().map_or(false, |val| val == "true"),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_proxy_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert!(!config.public_routes);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_accepts_only_configured_tokens() {
        let config = ProxyConfig::new().with_session_token("sess_1");
        assert!(config.accepts("sess_1"));
        assert!(!config.accepts("sess_2"));
        assert!(!config.accepts(""));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_proxy_builders() {
        let config = ProxyConfig::new()
            .with_address("0.0.0.0", 8080)
            .with_session_token("sess_1")
            .with_upstream_timeout(0);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(matches!(config.validate(), Err(GenPixError::ConfigError(_))));

        let config = config.with_upstream_timeout(5);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_defaults() {
        let page = PageConfig::default();
        assert_eq!(page.request_timeout(), Duration::from_secs(60));
        assert_eq!(page.slot_count, 5);
        assert_eq!(page.reset_delay(), Duration::from_millis(2500));
        assert_eq!(page.content_type, "image/png");
        assert_eq!(page.display_name, "image.png");
    }
}
