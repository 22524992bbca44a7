use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Catalog, Error, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RETRY_AFTER: Duration = Duration::from_secs(10);
const TRANSIENT_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exp)
    }
}

#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Thin GET transport shared by both catalog clients: bounded timeout, bounded retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    catalog: Catalog,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(catalog: Catalog, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let user_agent = format!("cinemcp/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|source| Error::Transport { catalog, source })?;
        Ok(Self {
            client,
            catalog,
            retry,
        })
    }

    /// Issues one logical GET. Transient statuses, timeouts (including while the
    /// body is read) and connect failures are retried up to the policy's budget;
    /// every other outcome is handed back to the caller untouched.
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<RawResponse> {
        let mut attempt = 0u32;
        loop {
            let mut req = self.client.get(url).query(query);
            if let Some(token) = bearer {
                req = req.bearer_auth(token);
            }

            match req.send().await {
                Ok(res) => {
                    let status = res.status();
                    if is_transient(status) && attempt < self.retry.max_retries {
                        attempt += 1;
                        let wait = retry_after(res.headers())
                            .unwrap_or_else(|| self.retry.delay_for(attempt));
                        warn!(
                            catalog = %self.catalog,
                            status = status.as_u16(),
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            "Transient response, retrying"
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    match res.text().await {
                        Ok(body) => {
                            debug!(catalog = %self.catalog, status = status.as_u16(), url, "Response received");
                            return Ok(RawResponse { status, body });
                        }
                        Err(e) if self.is_retryable(&e, attempt) => {
                            attempt += 1;
                            self.back_off(attempt, e).await;
                        }
                        Err(e) => return Err(self.transport_error(e)),
                    }
                }
                Err(e) if self.is_retryable(&e, attempt) => {
                    attempt += 1;
                    self.back_off(attempt, e).await;
                }
                Err(e) => return Err(self.transport_error(e)),
            }
        }
    }

    fn is_retryable(&self, e: &reqwest::Error, attempt: u32) -> bool {
        (e.is_timeout() || e.is_connect()) && attempt < self.retry.max_retries
    }

    async fn back_off(&self, attempt: u32, e: reqwest::Error) {
        let wait = self.retry.delay_for(attempt);
        warn!(
            catalog = %self.catalog,
            attempt,
            wait_ms = wait.as_millis() as u64,
            "Request failed ({}), retrying",
            e.without_url()
        );
        tokio::time::sleep(wait).await;
    }

    /// The request URL carries the ratings catalog's API key, so it is stripped
    /// before the error can reach a caller.
    fn transport_error(&self, source: reqwest::Error) -> Error {
        if source.is_timeout() {
            Error::Timeout {
                catalog: self.catalog,
            }
        } else {
            Error::Transport {
                catalog: self.catalog,
                source: source.without_url(),
            }
        }
    }
}

pub fn is_transient(status: StatusCode) -> bool {
    TRANSIENT_STATUSES.contains(&status.as_u16())
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn transient_set_matches_documented_statuses() {
        for code in [408u16, 429, 500, 502, 503, 504] {
            assert!(is_transient(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [400u16, 401, 403, 404, 422, 501] {
            assert!(!is_transient(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(300));
        assert_eq!(policy.delay_for(2), Duration::from_millis(600));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1200));
    }

    #[test]
    fn retry_after_is_capped() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3600"));
        assert_eq!(retry_after(&headers), Some(MAX_RETRY_AFTER));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
    }
}
