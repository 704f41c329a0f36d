use crate::error::{FetchError, Result};
use crate::record::ProfileRecord;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users/1";

/// Fetches the remote profile record and probes image sources.
///
/// Cheap to clone; clones share the underlying connection pool, so overlapping
/// fetches can be issued from separate tasks.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    client: Client,
    endpoint: Url,
}

impl ProfileClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    /// `None` leaves requests unbounded; they last as long as the network allows.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent("Vitrine/0.1 (https://github.com/trapdoorsec/vitrine)")
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;
        let endpoint = Url::parse(DEFAULT_ENDPOINT)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", DEFAULT_ENDPOINT, e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// One GET against the profile endpoint. No retry.
    pub async fn fetch_profile(&self) -> Result<ProfileRecord> {
        debug!("Fetching {}", self.endpoint);

        let start = Instant::now();
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        debug!("{} answered {} in {:?}", self.endpoint, status, start.elapsed());

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let record = serde_json::from_str(&body)?;
        Ok(record)
    }

    /// Checks that an image source can be loaded.
    ///
    /// `data:` URIs carry their payload inline and always load.
    pub async fn probe(&self, src: &str) -> Result<()> {
        if src.starts_with("data:") {
            return Ok(());
        }

        let url = Url::parse(src).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", src, e)))?;
        debug!("Probing {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(())
    }
}
