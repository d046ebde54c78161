use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::models::{FeedResponse, QueryWindow};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source of raw feed responses.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetches every object with a close approach inside `window`.
    async fn fetch(&self, window: &QueryWindow) -> Result<FeedResponse, FeedError>;
}

/// Client for the NASA NeoWs `feed` endpoint.
pub struct NeoWsClient {
    client: Client,
    base_url: String,
    api_key: String,
    retries: u32,
}

impl NeoWsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            retries,
        })
    }

    pub fn from_config(feed: &FeedConfig, api_key: String) -> Result<Self, reqwest::Error> {
        Self::new(
            feed.base_url.clone(),
            api_key,
            Duration::from_secs(feed.timeout_seconds),
            feed.retries,
        )
    }

    async fn fetch_once(&self, window: &QueryWindow) -> Result<FeedResponse, reqwest::Error> {
        let [start, end] = window.query_params();

        self.client
            .get(&self.base_url)
            .query(&[start, end, ("api_key", self.api_key.clone())])
            .send()
            .await?
            .error_for_status()?
            .json::<FeedResponse>()
            .await
    }
}

#[async_trait]
impl FeedClient for NeoWsClient {
    async fn fetch(&self, window: &QueryWindow) -> Result<FeedResponse, FeedError> {
        let mut attempt = 0;
        loop {
            debug!("Fetching NEO feed for {} (attempt {})", window, attempt + 1);
            match self.fetch_once(window).await {
                Ok(response) => {
                    info!(
                        "NEO feed for {} returned {} date(s)",
                        window,
                        response.near_earth_objects.len()
                    );
                    return Ok(response);
                }
                Err(e) if attempt < self.retries => {
                    // Never log the request URL: it carries the credential.
                    warn!("NEO feed request failed: {}. Retrying.", e.without_url());
                    attempt += 1;
                }
                Err(e) => return Err(FeedError::unavailable(*window, e.without_url())),
            }
        }
    }
}
