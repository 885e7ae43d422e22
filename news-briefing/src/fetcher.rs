use crate::types::{BriefingError, FetchConfig, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff, SystemClock};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const BYTES_PER_MB: usize = 1024 * 1024;

/// HTTP client for feed documents, with size limits and retry on transient failures.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn retry_backoff(&self) -> ExponentialBackoff<SystemClock> {
        let initial = Duration::from_millis(self.config.retry_delay_ms);
        ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            max_interval: initial * 8,
            multiplier: 2.0,
            randomization_factor: 0.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// Downloads a feed document, retrying transient failures with exponential backoff.
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>> {
        Url::parse(url)?;

        let mut backoff = self.retry_backoff();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_once(url).await {
                Ok(body) => {
                    info!("Fetched feed {} ({} bytes)", url, body.len());
                    return Ok(body);
                }
                Err(e) if e.is_transient() && attempt <= self.config.max_retries => {
                    match backoff.next_backoff() {
                        Some(delay) => {
                            warn!("Attempt {} failed for {}: {}, retrying in {:?}", attempt, url, e, delay);
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(e),
                    }
                }
                Err(e) => {
                    debug!("Giving up on {} after {} attempt(s)", url, attempt);
                    return Err(e);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(BriefingError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(content_length) = response.content_length() {
            self.check_size(content_length as usize)?;
        }

        let body = response.bytes().await?;
        self.check_size(body.len())?;
        Ok(body.to_vec())
    }

    fn check_size(&self, bytes: usize) -> Result<()> {
        let size_mb = bytes / BYTES_PER_MB;
        if size_mb > self.config.max_feed_size_mb {
            return Err(BriefingError::FeedTooLarge { size_mb });
        }
        Ok(())
    }
}
