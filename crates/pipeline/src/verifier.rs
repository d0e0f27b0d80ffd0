//! Port trait for the email-verification service.
//!
//! The node depends only on [`EmailVerifier`]; the HTTP adapter in the
//! `bounceban-api` crate implements it, and tests substitute in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;

use crate::{ApiError, VerifyQuery};

/// Verifies email addresses against a remote service.
///
/// Implementations own authentication, transport, and the retry policy for
/// transient failures. A returned error is final for that call.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    /// Verifies one address and returns the service's JSON result.
    async fn verify(&self, query: &VerifyQuery) -> Result<Value, ApiError>;

    /// Fetches account information. Used as the credential test: success
    /// means the configured API key is accepted.
    async fn account(&self) -> Result<Value, ApiError>;
}
