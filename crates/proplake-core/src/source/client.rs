//! HTTP extractor for the upstream listing API.

use super::window::ExtractionWindow;
use crate::config::SourceConfig;
use crate::model::Listing;
use crate::{Result, SourceError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Seam between the pipeline and the upstream source. Tests swap in an
/// in-memory implementation.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch all listings published within the window.
    async fn fetch(&self, window: &ExtractionWindow) -> Result<Vec<Listing>>;
}

/// Response envelope returned by the listing API.
#[derive(Debug, Deserialize)]
struct ListingEnvelope {
    #[allow(dead_code)]
    message: Option<String>,
    #[serde(default)]
    total_properties: usize,
    #[serde(default)]
    properties: Vec<Listing>,
}

/// Extractor backed by the real HTTP listing API.
pub struct HttpListingSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpListingSource {
    /// Build a source from configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| SourceError::Request {
                url: config.base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn window_url(&self, window: &ExtractionWindow) -> String {
        format!(
            "{}/houses/{}/{}",
            self.base_url,
            window.from_param(),
            window.to_param()
        )
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, window: &ExtractionWindow) -> Result<Vec<Listing>> {
        let url = self.window_url(window);
        debug!(url = %url, "Fetching listings");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            }
            .into());
        }

        let envelope: ListingEnvelope = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        debug!(
            total = envelope.total_properties,
            returned = envelope.properties.len(),
            "Listings fetched"
        );

        Ok(envelope.properties)
    }
}
