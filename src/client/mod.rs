//! platform API client (C5): paginated, rate-limited, retrying HTTP client
pub mod posts;

use crate::error::{AppError, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRY_ATTEMPTS: u32 = 5;

/// bundles the two HTTP sessions §5 requires: one scoped to the API base
/// URL with auth headers, one for direct media downloads sharing the same
/// headers and cookie jar but with no base URL and no request timeout
#[derive(Clone)]
pub struct PlatformClient {
    api: Client,
    pub download: Client,
    base_url: String,
}

impl PlatformClient {
    pub fn new(base_url: &str, cookie: &str, auth_header: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if !cookie.is_empty() {
            headers.insert(reqwest::header::COOKIE, cookie.parse().map_err(|_| {
                AppError::ConfigError("auth.cookie is not a valid header value".to_string())
            })?);
        }
        if !auth_header.is_empty() {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                auth_header.parse().map_err(|_| {
                    AppError::ConfigError("auth.auth_header is not a valid header value".to_string())
                })?,
            );
        }

        let api = Client::builder()
            .user_agent(crate::USER_AGENT)
            .default_headers(headers.clone())
            .cookie_store(true)
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        let download = Client::builder()
            .user_agent(crate::USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api,
            download,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn api_client(&self) -> &Client {
        &self.api
    }

    /// retries transient network errors with exponential backoff (5
    /// attempts, §4.5/§7); non-transient failures (bad status, validation)
    /// propagate immediately
    pub async fn execute_with_retry<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < MAX_RETRY_ATTEMPTS => {
                    attempt += 1;
                    let delay = Duration::from_millis(200 * 2_u64.pow(attempt.min(5)));
                    debug!(attempt, ?delay, "retrying after transient network error: {err}");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
