//! Fetch module - retrieves source image bytes from temporary locators

pub mod content_type;
pub mod data_url;

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::debug;

use crate::config::FetchConfig;
use crate::error::{AppError, Result};
use crate::synthesis::TemporaryImageLocator;

/// Raw bytes of a fetched image, owned by a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Trait for retrieving source assets
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, locator: &TemporaryImageLocator) -> Result<SourceAsset>;
}

/// Fetches assets over HTTP with a browser-like identification
pub struct HttpAssetFetcher {
    client: Client,
    user_agent: String,
}

impl HttpAssetFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }

    fn decode_inline(locator: &str) -> Result<SourceAsset> {
        let (bytes, declared) = data_url::decode(locator)?;
        if bytes.is_empty() {
            return Err(AppError::AssetUnavailable("Data URL payload is empty".to_string()));
        }
        let content_type = content_type::resolve(declared.as_deref(), &bytes);
        Ok(SourceAsset { bytes, content_type })
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    // Signed locators embed credentials in the query string.
    if e.is_timeout() {
        AppError::AssetFetchTimeout(e.without_url().to_string())
    } else {
        AppError::AssetUnavailable(e.without_url().to_string())
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, locator: &TemporaryImageLocator) -> Result<SourceAsset> {
        if data_url::is_data_url(locator.as_str()) {
            return Self::decode_inline(locator.as_str());
        }

        let response = self
            .client
            .get(locator.as_str())
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::AssetUnavailable(format!(
                "Source image host returned {}",
                status
            )));
        }

        let declared = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(transport_error)?;
        if bytes.is_empty() {
            return Err(AppError::AssetUnavailable(
                "Source image host returned an empty body".to_string(),
            ));
        }

        let content_type = content_type::resolve(declared.as_deref(), &bytes);
        debug!(size = bytes.len(), content_type = %content_type, "Fetched source asset");

        Ok(SourceAsset {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
