//! HTTP client with connection pooling and retry logic

use futures::StreamExt;
use reqwest::{Client, Response};
use std::time::Duration;
use stowage_config::NetworkConfig;
use stowage_errors::{Error, NetworkError, UserFacingError};

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry_count: u32,
    /// Delay before the first retry; doubled for each further attempt
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: config.timeout(),
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 16,
            retry_count: config.retries,
            retry_delay: config.retry_delay(),
            user_agent: format!("stowage/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Download the full body of `url`, retrying transient failures
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt fails or the server answers with a
    /// non-retryable error status.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, Error> {
        let mut attempt = 0;
        loop {
            match self.try_get_bytes(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.config.retry_count && e.is_retryable() => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    tracing::debug!(
                        url,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "retrying download"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_get_bytes(&self, url: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::convert_error(url, &e))?;
        let response = Self::check_status(response)?;

        let mut body = Vec::with_capacity(
            usize::try_from(response.content_length().unwrap_or(0)).unwrap_or(0),
        );
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Self::convert_error(url, &e))?;
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn check_status(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(NetworkError::HttpError {
                status: status.as_u16(),
                message: status.to_string(),
            }
            .into())
        }
    }

    fn convert_error(url: &str, error: &reqwest::Error) -> Error {
        if error.is_timeout() {
            NetworkError::Timeout {
                url: url.to_string(),
            }
            .into()
        } else if error.is_connect() {
            NetworkError::ConnectionRefused(error.to_string()).into()
        } else if let Some(status) = error.status() {
            NetworkError::HttpError {
                status: status.as_u16(),
                message: error.to_string(),
            }
            .into()
        } else {
            NetworkError::DownloadFailed(error.to_string()).into()
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.config
            .retry_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}
