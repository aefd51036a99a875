use std::time::Duration;

/// Default User-Agent header value
pub const DEFAULT_USER_AGENT: &str = concat!("paintflow-client/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Base URL every request path is appended to, e.g. `https://host/api`
    pub base_url: String,

    /// Timeout for a single request, including reading the body
    pub request_timeout: Duration,

    /// User-Agent header value
    pub user_agent: String,
}

impl HttpClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_owned(),
            request_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}
