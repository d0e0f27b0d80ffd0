//! HTTP layer: status mapping and the 408 retry loop.
//!
//! This is the ONLY place for status code handling. `client.rs` never
//! interprets status codes.

use std::time::Duration;

use pipeline::{ApiError, RetryPolicy};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientConfig, MAX_RETRY_AFTER};

/// HTTP backend (holds the reqwest client and retry settings).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) config: ClientConfig,
}

impl HttpBackend {
    /// GET `url` and decode the JSON body, retrying while the error's
    /// [`RetryPolicy`] allows and the retry budget lasts.
    pub(crate) async fn get_json(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<Value, ApiError> {
        let max_retries = self.config.max_retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match self.get_once(url, query, attempt).await {
                Ok(body) => return Ok(body),
                Err(e) => match e.retry_policy() {
                    RetryPolicy::Retryable { after } if attempt <= max_retries => {
                        let backoff = after.unwrap_or(self.config.retry_delay);

                        warn!(
                            error = %e,
                            retry = attempt,
                            max_retries = max_retries,
                            backoff_ms = backoff.as_millis() as u64,
                            "retrying request"
                        );

                        if !backoff.is_zero() {
                            tokio::time::sleep(backoff).await;
                        }
                    }
                    _ => return Err(e),
                },
            }
        }
    }

    async fn get_once(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        attempt: u32,
    ) -> Result<Value, ApiError> {
        debug!(url = %url, attempt, "sending request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();

        match status.as_u16() {
            200..=299 => {
                let bytes = response.bytes().await.map_err(transport_error)?;
                serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse {
                    message: format!("failed to parse response body: {}", e),
                })
            }

            408 => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER));

                Err(ApiError::RequestTimeout {
                    attempts: attempt,
                    retry_after,
                })
            }

            401 | 403 => Err(ApiError::Unauthorized {
                status: status.as_u16(),
                message: error_message(status, response).await,
            }),

            _ => Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(status, response).await,
            }),
        }
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    let message = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };
    ApiError::Transport { message }
}

/// Human-readable message for an error response: the body's `message` or
/// `error` field when it is JSON, the raw body otherwise, the status reason
/// when the body is empty.
async fn error_message(status: StatusCode, response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    message_from_body(status, &body)
}

fn message_from_body(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = map.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }

    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefers_json_message_field() {
        let msg = message_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Invalid email format","code":40001}"#,
        );
        assert_eq!(msg, "Invalid email format");
    }

    #[test]
    fn test_message_falls_back_to_error_field_then_raw_body() {
        assert_eq!(
            message_from_body(StatusCode::PAYMENT_REQUIRED, r#"{"error":"no credits"}"#),
            "no credits"
        );
        assert_eq!(
            message_from_body(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
    }

    #[test]
    fn test_message_uses_reason_for_empty_body() {
        assert_eq!(
            message_from_body(StatusCode::INTERNAL_SERVER_ERROR, "  "),
            "Internal Server Error"
        );
    }
}
