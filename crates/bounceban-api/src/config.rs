//! Client configuration: endpoints, credentials, and retry budget.

use std::time::Duration;

use pipeline::ApiKey;

/// Base URL of the verification endpoint.
pub const DEFAULT_VERIFY_BASE_URL: &str = "https://api-waterfall.bounceban.com";

/// Base URL of the account endpoint used for the credential test.
pub const DEFAULT_ACCOUNT_BASE_URL: &str = "https://api.bounceban.com";

/// Path of the single-address verification call.
pub const VERIFY_PATH: &str = "/v1/verify/single";

/// Path of the account-information call.
pub const ACCOUNT_PATH: &str = "/v1/account";

/// Retries after the first attempt when the service answers `408`.
pub const DEFAULT_MAX_RETRIES: u32 = 15;

/// Upper bound applied to a server-supplied `Retry-After`.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Settings for [`crate::BouncebanClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Key sent verbatim in the `Authorization` header.
    pub api_key: ApiKey,

    /// Base URL for `GET /v1/verify/single`.
    pub verify_base_url: String,

    /// Base URL for `GET /v1/account`.
    pub account_base_url: String,

    /// Retries after the first attempt for `408` responses.
    pub max_retries: u32,

    /// Delay between retries when the service sends no `Retry-After`.
    pub retry_delay: Duration,

    /// Client-side request timeout. `None` (the default) sets no limit.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Configuration with production endpoints and default retry budget.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            verify_base_url: DEFAULT_VERIFY_BASE_URL.to_string(),
            account_base_url: DEFAULT_ACCOUNT_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::ZERO,
            timeout: None,
        }
    }

    /// Points both endpoints at one base URL (test servers, proxies).
    pub fn with_base_url(self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.with_verify_base_url(url.clone()).with_account_base_url(url)
    }

    pub fn with_verify_base_url(mut self, url: impl Into<String>) -> Self {
        self.verify_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_account_base_url(mut self, url: impl Into<String>) -> Self {
        self.account_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn verify_url(&self) -> String {
        format!("{}{}", self.verify_base_url, VERIFY_PATH)
    }

    pub(crate) fn account_url(&self) -> String {
        format!("{}{}", self.account_base_url, ACCOUNT_PATH)
    }
}
