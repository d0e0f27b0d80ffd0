//! BounceBan API client.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use async_trait::async_trait;
use pipeline::{ApiError, EmailVerifier, VerifyQuery};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::http::HttpBackend;

const USER_AGENT_VALUE: &str = concat!("bounceban-node/", env!("CARGO_PKG_VERSION"));

/// Header identifying the calling integration to the service.
pub const SOURCE_HEADER: &str = "utc_source";

/// Value sent in [`SOURCE_HEADER`].
pub const SOURCE_VALUE: &str = "n8n_node";

/// Authenticated client for the BounceBan API.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct BouncebanClient {
    http: HttpBackend,
}

impl BouncebanClient {
    /// Builds the client.
    ///
    /// Every request carries `Authorization: <api-key>` and
    /// `utc_source: n8n_node`. TLS certificate validation is disabled.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut auth = HeaderValue::from_str(config.api_key.expose()).map_err(|e| {
            ApiError::Configuration {
                message: format!("API key is not a valid header value: {}", e),
            }
        })?;
        auth.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(AUTHORIZATION, auth);
        default_headers.insert(
            HeaderName::from_static(SOURCE_HEADER),
            HeaderValue::from_static(SOURCE_VALUE),
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers)
            .danger_accept_invalid_certs(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()
            .map_err(|e| ApiError::Configuration {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend { client, config },
        })
    }

    /// `GET /v1/verify/single` for one address.
    ///
    /// `408` responses are retried up to `max_retries` times; every other
    /// failure is returned immediately.
    pub async fn verify_single(&self, query: &VerifyQuery) -> Result<Value, ApiError> {
        let url = self.http.config.verify_url();
        debug!(url = %url, mode = ?query.fields.mode, "verifying address");

        self.http.get_json(&url, &query.query_pairs()).await
    }

    /// `GET /v1/account`: the credential test.
    pub async fn account_info(&self) -> Result<Value, ApiError> {
        let url = self.http.config.account_url();
        debug!(url = %url, "fetching account information");

        self.http.get_json(&url, &[]).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.http.config
    }
}

#[async_trait]
impl EmailVerifier for BouncebanClient {
    async fn verify(&self, query: &VerifyQuery) -> Result<Value, ApiError> {
        self.verify_single(query).await
    }

    async fn account(&self) -> Result<Value, ApiError> {
        self.account_info().await
    }
}
