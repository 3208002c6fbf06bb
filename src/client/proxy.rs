use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{client::check_status, error::Result};

/// Something that can hand back the bytes behind an image URL as base64.
#[async_trait]
pub trait ProxyApi: Send + Sync {
    async fn fetch_base64(&self, image_url: &str) -> Result<String>;
}

/// Calls the authenticated download proxy route over HTTP.
#[derive(Clone)]
pub struct HttpProxyApi {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl HttpProxyApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: None,
        })
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn download_url(&self, image_url: &str) -> String {
        format!(
            "{}/api/download/{}",
            self.base_url,
            urlencoding::encode(image_url)
        )
    }
}

#[async_trait]
impl ProxyApi for HttpProxyApi {
    async fn fetch_base64(&self, image_url: &str) -> Result<String> {
        let mut request = self.client.get(self.download_url(image_url));
        if let Some(token) = &self.session_token {
            request = request.bearer_auth(token);
        }

        let response = check_status(request.send().await?).await?;
        let payload: String = response.json().await?;
        log::debug!("Proxy returned {} base64 characters", payload.len());
        Ok(payload)
    }
}
