// Shared transport configuration for building the portal's reqwest::Client.
//
// Every request to the portal carries the same fixed header set (JSON
// content negotiation, origin/referer pair, user agent). Per-call timeouts
// live in `Timeouts` and are applied on each request builder.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use url::Url;

use crate::error::Error;

/// Web portal origin the API expects requests to come from.
pub const DEFAULT_ORIGIN: &str = "https://webportal.delios-srl.it";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://webportal.delios-srl.it";

/// User-Agent the portal knows its integration clients by.
pub const DEFAULT_USER_AGENT: &str = "HomeAssistant/DeliosIntegration";

/// Per-endpoint request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub login: Duration,
    pub daily: Duration,
    pub annual: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            login: Duration::from_secs(15),
            daily: Duration::from_secs(20),
            annual: Duration::from_secs(30),
        }
    }
}

/// Locations of the three portal endpoints.
///
/// Paths are joined onto `base_url`; an absolute URL in a path field
/// replaces the base entirely (standard `Url::join` semantics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: Url,
    pub login_path: String,
    pub daily_log_path: String,
    pub annual_log_path: String,
}

impl Endpoints {
    pub const DEFAULT_LOGIN_PATH: &'static str = "/api/login";
    pub const DEFAULT_DAILY_LOG_PATH: &'static str = "/api/log/daily";
    pub const DEFAULT_ANNUAL_LOG_PATH: &'static str = "/api/log/chart";

    /// Default paths rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            login_path: Self::DEFAULT_LOGIN_PATH.into(),
            daily_log_path: Self::DEFAULT_DAILY_LOG_PATH.into(),
            annual_log_path: Self::DEFAULT_ANNUAL_LOG_PATH.into(),
        }
    }

    pub fn login_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join(&self.login_path)?)
    }

    pub fn daily_log_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join(&self.daily_log_path)?)
    }

    pub fn annual_log_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join(&self.annual_log_path)?)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        // Constant literal, always parses.
        #[allow(clippy::unwrap_used)]
        Self::new(Url::parse(DEFAULT_BASE_URL).unwrap())
    }
}

/// Shared transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound for any request that does not set its own timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Value sent as `Origin`; `Referer` is the same URL with a trailing slash.
    pub origin: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.into(),
            origin: DEFAULT_ORIGIN.into(),
        }
    }
}

impl TransportConfig {
    /// The fixed header set attached to every portal request.
    pub fn default_headers(&self) -> Result<HeaderMap, Error> {
        let origin = self.origin.trim_end_matches('/');
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
        headers.insert(REFERER, HeaderValue::from_str(&format!("{origin}/"))?);
        Ok(headers)
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(self.default_headers()?)
            .build()?;
        Ok(client)
    }
}
