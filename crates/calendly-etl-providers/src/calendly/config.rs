//! Calendly API client configuration.

use std::time::Duration;

use calendly_etl_core::{EtlError, EtlResult};
use url::Url;

/// Configuration for the Calendly API client.
#[derive(Debug, Clone)]
pub struct CalendlyConfig {
    /// Base URL every endpoint is joined onto. Always ends with `/`.
    pub base_url: Url,

    /// Request timeout. `None` keeps the HTTP client's default (no timeout).
    pub timeout: Option<Duration>,

    /// Page size sent as `count` on collection requests. `None` lets the
    /// API choose.
    pub page_size: Option<u32>,

    /// User agent string.
    pub user_agent: String,
}

impl Default for CalendlyConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(Self::DEFAULT_BASE_URL).expect("valid default base URL"),
            timeout: None,
            page_size: None,
            user_agent: format!("calendly-etl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CalendlyConfig {
    /// Production API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.calendly.com/";

    /// Largest page size the API accepts.
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Creates a configuration for the given base URL.
    ///
    /// A trailing `/` is added when missing so that endpoints join below
    /// the base path instead of replacing its last segment.
    pub fn new(base_url: impl AsRef<str>) -> EtlResult<Self> {
        let mut raw = base_url.as_ref().trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .map_err(|e| EtlError::config(format!("invalid API base URL `{}`: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(EtlError::config(format!(
                "API base URL `{}` cannot be used as a base",
                raw
            )));
        }

        Ok(Self {
            base_url,
            ..Default::default()
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size.clamp(1, Self::MAX_PAGE_SIZE));
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
