use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    client::ProxyApi,
    codec::encode_base64,
    error::{GenPixError, Result},
    logger,
};

/// Fetches remote images server-side and re-serves them as base64.
#[derive(Clone)]
pub struct ProxyFetcher {
    client: Client,
}

impl ProxyFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenPixError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let _timer = logger::timer(&format!("fetch {}", url));

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenPixError::UpstreamError {
                status: status.as_u16(),
                message: format!("Image host answered {} for {}", status, url),
            });
        }

        let bytes = response.bytes().await?;
        log::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    pub async fn fetch_base64(&self, url: &str) -> Result<String> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(encode_base64(&bytes))
    }
}

#[async_trait]
impl ProxyApi for ProxyFetcher {
    async fn fetch_base64(&self, image_url: &str) -> Result<String> {
        ProxyFetcher::fetch_base64(self, image_url).await
    }
}

/// Turns a raw, percent-encoded path tail into the image address it names.
pub fn decode_path_segment(raw: &str) -> Result<String> {
    let trimmed = raw.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(GenPixError::ValidationError("Image URL is required".into()));
    }

    let decoded = urlencoding::decode(trimmed)
        .map_err(|e| GenPixError::InvalidResource(format!("Malformed image URL: {}", e)))?;
    if decoded.trim().is_empty() {
        return Err(GenPixError::ValidationError("Image URL is required".into()));
    }
    Ok(decoded.into_owned())
}

/// Prefixes a scheme-less host/path with `https://`.
pub fn with_https_scheme(segment: &str) -> String {
    format!("https://{}", segment)
}
