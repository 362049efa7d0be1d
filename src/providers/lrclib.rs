//! lrclib.net lyric retrieval client
//!
//! Queries the public lrclib catalog for the plain (unsynced) lyric text
//! of a song. Requests are rate limited to stay polite with the shared
//! public instance.

use super::{LyricProvider, ProviderError};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

const LRCLIB_BASE_URL: &str = "https://lrclib.net/api";
const USER_AGENT: &str = concat!(
    "cantoria/",
    env!("CARGO_PKG_VERSION"),
    " (karaoke scoring backend)"
);
const RATE_LIMIT_MS: u64 = 500;

/// lrclib track record (only the fields we consume)
#[derive(Debug, Deserialize)]
struct LrclibTrack {
    #[serde(rename = "plainLyrics")]
    plain_lyrics: Option<String>,
    #[serde(default)]
    instrumental: bool,
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

pub struct LrclibClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
}

impl LrclibClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(LRCLIB_BASE_URL)
    }

    /// Point the client at a different instance (used by tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
            base_url: base_url.into(),
        })
    }
}

#[async_trait::async_trait]
impl LyricProvider for LrclibClient {
    async fn search_lyrics(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/get", self.base_url);
        debug!(title = %title, artist = %artist, "Querying lrclib");

        let response = self
            .http_client
            .get(&url)
            .query(&[("track_name", title), ("artist_name", artist)])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            debug!(title = %title, "No lrclib match");
            return Ok(None);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let track: LrclibTrack = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if track.instrumental {
            debug!(title = %title, "Track is instrumental, no lyric text");
            return Ok(None);
        }

        match track.plain_lyrics.filter(|text| !text.trim().is_empty()) {
            Some(lyrics) => {
                info!(title = %title, chars = lyrics.len(), "Retrieved lyrics from lrclib");
                Ok(Some(lyrics))
            }
            None => Ok(None),
        }
    }
}
