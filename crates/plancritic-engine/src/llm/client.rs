//! HTTP plumbing shared by the provider adapters: client construction,
//! retry with exponential backoff, and scrubbing of error bodies.

use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum length for error content in error messages
const MAX_ERROR_CONTENT_LEN: usize = 200;

const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;
const BACKOFF_MULTIPLIER: u64 = 2;
const MAX_BACKOFF_MS: u64 = 30_000;

/// Retry configuration for transient failures (429, 5xx, connect and
/// timeout errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
        }
    }

    /// Delay before retry number `retry_count` (1-based).
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let factor = BACKOFF_MULTIPLIER.saturating_pow(retry_count.saturating_sub(1));
        let ms = self.initial_backoff_ms.saturating_mul(factor).min(MAX_BACKOFF_MS);
        Duration::from_millis(ms)
    }
}

/// Sanitize API response content for error messages to prevent credential leakage.
pub(crate) fn sanitize_api_response(content: &str) -> String {
    const SECRET_PATTERNS: &[&str] = &[
        "api_key",
        "apikey",
        "x-api-key",
        "secret",
        "password",
        "credential",
        "bearer",
        "sk-",
    ];

    let truncated = truncate_str(content.trim(), MAX_ERROR_CONTENT_LEN);

    let lower = truncated.to_lowercase();
    for pattern in SECRET_PATTERNS {
        if lower.contains(pattern) {
            return "(response details redacted - may contain sensitive data)".to_string();
        }
    }

    truncated.to_string()
}

/// Truncate a string for display (Unicode-safe)
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

pub(crate) fn create_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow!("failed to create HTTP client: {}", e))
}

fn is_retryable_network_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn retry_after_header(response: &reqwest::Response) -> Option<Duration> {
    let secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;
    (secs > 0 && secs <= 60).then(|| Duration::from_secs(secs))
}

fn map_network_error(provider: &str, err: reqwest::Error) -> anyhow::Error {
    if err.is_timeout() {
        anyhow!("{}: request timed out", provider)
    } else if err.is_connect() {
        anyhow!("{}: could not connect: {}", provider, err)
    } else {
        anyhow!("{}: request failed: {}", provider, err)
    }
}

/// Send a request built by `build`, retrying transient failures.
///
/// Returns the body of the first 2xx response. Non-retryable statuses, and
/// retryable ones once the budget is spent, become an error naming the
/// provider and carrying a scrubbed excerpt of the body.
pub(crate) async fn send_with_retry<F>(
    provider: &str,
    policy: &RetryPolicy,
    build: F,
) -> Result<String>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut retry_count = 0;

    loop {
        let response = match build().send().await {
            Ok(response) => response,
            Err(err) => {
                if is_retryable_network_error(&err) && retry_count < policy.max_retries {
                    retry_count += 1;
                    warn!(provider, retry = retry_count, error = %err, "network error, retrying");
                    tokio::time::sleep(policy.backoff(retry_count)).await;
                    continue;
                }
                return Err(map_network_error(provider, err));
            }
        };

        let status = response.status();
        let retry_after = retry_after_header(&response);
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                if is_retryable_network_error(&err) && retry_count < policy.max_retries {
                    retry_count += 1;
                    tokio::time::sleep(policy.backoff(retry_count)).await;
                    continue;
                }
                return Err(map_network_error(provider, err));
            }
        };

        if status.is_success() {
            debug!(provider, bytes = text.len(), "received response");
            return Ok(text);
        }

        let retryable = status.as_u16() == 429 || status.is_server_error();
        if retryable && retry_count < policy.max_retries {
            retry_count += 1;
            let delay = retry_after.unwrap_or_else(|| policy.backoff(retry_count));
            warn!(
                provider,
                status = status.as_u16(),
                retry = retry_count,
                delay_ms = delay.as_millis() as u64,
                "transient API error, retrying"
            );
            tokio::time::sleep(delay).await;
            continue;
        }

        let detail = match status.as_u16() {
            401 | 403 => "authentication failed; check the API key".to_string(),
            429 => format!("rate limited after {} retries", retry_count),
            _ => sanitize_api_response(&text),
        };
        return Err(anyhow!(
            "{}: API returned {}: {}",
            provider,
            status.as_u16(),
            detail
        ));
    }
}
