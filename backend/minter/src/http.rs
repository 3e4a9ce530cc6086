//! Shared outbound HTTP helper.
//!
//! ## Resilience
//!
//! * Every call gets [`MAX_ATTEMPTS`] bounded attempts with exponential
//!   back-off starting at [`INITIAL_BACKOFF_MS`].
//! * Transient transport errors (timeout, connection failure) and 429/5xx
//!   statuses are retried; anything else fails immediately.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::warn;

const MAX_ATTEMPTS: usize = 3;
const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_ERROR_BODY_CHARS: usize = 400;

/// A failed outbound call, after retries were exhausted or skipped.
#[derive(Debug)]
pub struct CallError {
    /// HTTP status, when the server answered at all.
    pub status: Option<u16>,
    pub message: String,
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "HTTP {code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// POST a JSON payload and parse the JSON response body.
///
/// `headers` carries service-specific auth (`Authorization` bearer tokens,
/// `X-API-Key`, …).
pub async fn post_json(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    payload: &Value,
) -> Result<Value, CallError> {
    let mut backoff_ms = INITIAL_BACKOFF_MS;
    let mut attempt = 0usize;

    loop {
        attempt += 1;

        let mut request = client.post(url).json(payload);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        match request.send().await {
            Err(e) => {
                let transient = e.is_timeout() || e.is_connect();
                if transient && attempt < MAX_ATTEMPTS {
                    warn!("Request to {url} failed (will retry in {backoff_ms}ms): {e}");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                    continue;
                }
                return Err(CallError {
                    status: None,
                    message: e.to_string(),
                });
            }
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.json().await.map_err(|e| CallError {
                        status: Some(status.as_u16()),
                        message: format!("invalid JSON body: {e}"),
                    });
                }

                let retryable =
                    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
                if retryable && attempt < MAX_ATTEMPTS {
                    warn!(
                        "Request to {url} returned {status} (will retry in {backoff_ms}ms)",
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                    continue;
                }

                let body = response.text().await.unwrap_or_default();
                return Err(CallError {
                    status: Some(status.as_u16()),
                    message: truncate(&body),
                });
            }
        }
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_CHARS;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_error_display() {
        let with_status = CallError {
            status: Some(502),
            message: "bad gateway".to_string(),
        };
        assert_eq!(with_status.to_string(), "HTTP 502: bad gateway");

        let transport = CallError {
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.to_string(), "connection refused");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "é".repeat(MAX_ERROR_BODY_CHARS);
        let cut = truncate(&long);
        assert!(cut.ends_with('…'));
    }
}
