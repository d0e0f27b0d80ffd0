//! Error and retry-policy types for the verification node domain.
//!
//! [`ApiError`] covers a single failed call to the verification service. It is
//! the error embedded into an output item when a failure is isolated to that
//! item.
//!
//! [`NodeError`] covers conditions that halt the whole node invocation.
//!
//! [`RetryPolicy`] is a cross-cutting concern: infrastructure adapters ask the
//! error for its policy instead of matching on status codes themselves.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ItemIndex;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// ## Rules
///
/// - `Retryable`: the service answered `408 Request Timeout`.
/// - `NonRetryable`: everything else, including other 4xx/5xx statuses,
///   transport failures, and malformed responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt (e.g. from `Retry-After`).
        /// `None` means apply the caller's own delay.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Verification service errors
// ---------------------------------------------------------------------------

/// A failed call to the verification service.
///
/// The `Display` text is what ends up in an embedded `{"error": ...}` object,
/// so every message is written for the person reading the workflow output.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The service answered `408 Request Timeout`.
    ///
    /// Retried by the client; surfaces only once the retry budget is spent.
    #[error("The verification request timed out (HTTP 408) after {attempts} attempt(s)")]
    RequestTimeout {
        /// Total attempts made, including the first.
        attempts: u32,
        /// Delay requested by the service through `Retry-After`, if any.
        retry_after: Option<Duration>,
    },

    /// The API key was rejected.
    #[error("Authorization failed (HTTP {status}): {message}")]
    Unauthorized {
        /// HTTP status code (401 or 403).
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("The service was not able to process your request (HTTP {status}): {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Connection, TLS, or timeout failure before a response was received.
    #[error("Request failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// A success status with a body that is not JSON.
    #[error("Invalid response from the verification service: {message}")]
    InvalidResponse {
        /// Description of the decoding failure.
        message: String,
    },

    /// The client could not be constructed from its configuration.
    #[error("Client configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ApiError {
    /// Returns the retry policy for this error.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::RequestTimeout { retry_after, .. } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            _ => RetryPolicy::NonRetryable,
        }
    }

    /// HTTP status associated with the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestTimeout { .. } => Some(408),
            Self::Unauthorized { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Node-level errors
// ---------------------------------------------------------------------------

/// Errors that halt a node invocation.
///
/// Item-scoped failures only become a [`NodeError`] in sequential mode with
/// continue-on-failure disabled; otherwise they are embedded in the output.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The configured operation is not one this node implements.
    #[error("Unknown operation: {operation}")]
    UnknownOperation {
        /// The operation name as configured.
        operation: String,
    },

    /// Processing of one item failed and the invocation was aborted.
    #[error("Item {item} failed: {source}")]
    ItemFailed {
        /// Index of the failing input item.
        item: ItemIndex,
        /// The underlying service error.
        #[source]
        source: ApiError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_request_timeout_is_retryable() {
        let timeout = ApiError::RequestTimeout {
            attempts: 1,
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(
            timeout.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(2))
            }
        );

        let others = [
            ApiError::Http {
                status: 500,
                message: "boom".into(),
            },
            ApiError::Http {
                status: 429,
                message: "slow down".into(),
            },
            ApiError::Unauthorized {
                status: 401,
                message: "bad key".into(),
            },
            ApiError::Transport {
                message: "connection reset".into(),
            },
            ApiError::InvalidResponse {
                message: "eof".into(),
            },
        ];
        for err in others {
            assert!(!err.retry_policy().is_retryable(), "{err} must not retry");
        }
    }

    #[test]
    fn test_status_is_reported_for_http_errors() {
        let err = ApiError::Http {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.status(), Some(502));
        assert_eq!(
            ApiError::Transport {
                message: "dns".into()
            }
            .status(),
            None
        );
    }

    #[test]
    fn test_item_failed_mentions_index_and_cause() {
        let err = NodeError::ItemFailed {
            item: ItemIndex::new(3),
            source: ApiError::Http {
                status: 400,
                message: "invalid email".into(),
            },
        };
        let text = err.to_string();
        assert!(text.contains("Item 3"));
        assert!(text.contains("invalid email"));
    }

    #[test]
    fn test_node_errors_are_operation_or_item_scoped() {
        fn item_of(err: &NodeError) -> Option<ItemIndex> {
            match err {
                NodeError::UnknownOperation { .. } => None,
                NodeError::ItemFailed { item, .. } => Some(*item),
            }
        }

        let unknown = NodeError::UnknownOperation {
            operation: "deleteEmail".into(),
        };
        assert_eq!(item_of(&unknown), None);
        assert_eq!(unknown.to_string(), "Unknown operation: deleteEmail");

        let failed = NodeError::ItemFailed {
            item: ItemIndex::new(1),
            source: ApiError::RequestTimeout {
                attempts: 16,
                retry_after: None,
            },
        };
        assert_eq!(item_of(&failed), Some(ItemIndex::new(1)));
    }
}
