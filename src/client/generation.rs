use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    client::check_status,
    error::Result,
    models::{FormValues, GenerationRequest, ImageResult},
};

/// Remote service that turns a prompt into image URLs.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    async fn generate(&self, values: &FormValues) -> Result<Vec<ImageResult>>;
}

#[derive(Clone)]
pub struct HttpGenerationApi {
    client: Client,
    url: String,
    session_token: Option<String>,
}

impl HttpGenerationApi {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.into(),
            session_token: None,
        })
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

#[async_trait]
impl GenerationApi for HttpGenerationApi {
    async fn generate(&self, values: &FormValues) -> Result<Vec<ImageResult>> {
        log::info!(
            "🎨 Requesting {} image(s) at {}",
            values.amount.count(),
            values.resolution
        );

        let mut request = self
            .client
            .post(&self.url)
            .json(&GenerationRequest::from(values));
        if let Some(token) = &self.session_token {
            request = request.bearer_auth(token);
        }

        let response = check_status(request.send().await?).await?;
        let images: Vec<ImageResult> = response.json().await?;

        log::info!("✅ Generation returned {} image(s)", images.len());
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenPixError;
    use crate::models::{Amount, Resolution};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_generate_posts_form_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/image"))
            .and(header("authorization", "Bearer sess_1"))
            .and(body_json(json!({
                "prompt": "A red circle",
                "amount": "2",
                "resolution": "256x256"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"url": "https://x/1.png"},
                {"url": "https://x/2.png"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpGenerationApi::new(format!("{}/api/image", server.uri()), TIMEOUT)
            .unwrap()
            .with_session_token("sess_1");
        let values = FormValues::new("A red circle")
            .with_amount(Amount::Two)
            .with_resolution(Resolution::Small);

        let images = api.generate(&values).await.unwrap();
        let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/1.png", "https://x/2.png"]);
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Free trial has expired."))
            .mount(&server)
            .await;

        let api =
            HttpGenerationApi::new(format!("{}/api/image", server.uri()), TIMEOUT).unwrap();
        let err = api.generate(&FormValues::new("cat")).await.unwrap_err();
        assert!(matches!(err, GenPixError::QuotaExceeded(ref m) if m == "Free trial has expired."));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api =
            HttpGenerationApi::new(format!("{}/api/image", server.uri()), TIMEOUT).unwrap();
        let err = api.generate(&FormValues::new("cat")).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_stalled_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let api = HttpGenerationApi::new(server.uri(), Duration::from_millis(100)).unwrap();
        let err = api.generate(&FormValues::new("cat")).await.unwrap_err();
        assert!(matches!(err, GenPixError::RequestError(_)));
    }
}
