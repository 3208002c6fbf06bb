use std::time::Duration;

use genpix::{
    encode_base64,
    page::{HostEvent, RecordingHost},
    Amount, FormValues, GenPixError, HttpGenerationApi, HttpPage, Page, PageConfig, ProxyFetcher,
    Resolution,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &[u8] = b"\x89PNG\r\n\x1a\nred-circle";

fn page_config(server: &MockServer) -> PageConfig {
    PageConfig::new()
        .with_endpoints(format!("{}/api/image", server.uri()), server.uri())
        .with_session_token("sess_1")
        .with_reset_delay(50)
}

#[tokio::test]
async fn red_circle_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/image"))
        .and(body_json(json!({
            "prompt": "A red circle",
            "amount": "1",
            "resolution": "512x512"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"url": "https://x/1.png"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/download/https%3A%2F%2Fx%2F1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(encode_base64(FIXTURE)))
        .expect(1)
        .mount(&server)
        .await;

    let page = HttpPage::from_config(&page_config(&server), RecordingHost::new()).unwrap();

    let values = FormValues::new("A red circle")
        .with_amount(Amount::One)
        .with_resolution(Resolution::Medium);
    let images = page.submit(values).await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(page.images().unwrap()[0].url, "https://x/1.png");

    let receipt = page.request_download("image.png", 0).await.unwrap();
    assert_eq!(receipt.bytes, FIXTURE.len());
    assert_eq!(
        page.host().saved(),
        vec![("image.png".to_string(), FIXTURE.to_vec())]
    );

    let slots = page.slots().unwrap();
    assert!(slots[0].downloaded);
    assert_eq!(slots[0].label(), "Downloaded");

    receipt.reset.await.unwrap();
    assert!(page.slots().unwrap().iter().all(|s| s.is_idle()));

    let state = page.state().snapshot().unwrap();
    assert_eq!(state.form, FormValues::default());
}

#[tokio::test]
async fn download_through_in_process_fetcher() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gen/1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FIXTURE.to_vec()))
        .mount(&upstream)
        .await;
    let image_url = format!("{}/gen/1.png", upstream.uri());
    Mock::given(method("POST"))
        .and(path("/api/image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "url": image_url }])))
        .mount(&upstream)
        .await;

    let config = page_config(&upstream);
    let page = Page::new(
        &config,
        HttpGenerationApi::new(&config.generation_url, config.request_timeout()).unwrap(),
        ProxyFetcher::new(Duration::from_secs(5)).unwrap(),
        RecordingHost::new(),
    );

    page.submit(FormValues::new("A red circle")).await.unwrap();
    page.download(0).await.unwrap();
    assert_eq!(page.host().saved()[0].0, "image.png");

    let state = page.state().snapshot().unwrap();
    assert!(state.board.is_fetched());
}

#[tokio::test]
async fn quota_failure_leaves_page_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/image"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let page = HttpPage::from_config(&page_config(&server), RecordingHost::new()).unwrap();
    let err = page.submit(FormValues::new("A red circle")).await.unwrap_err();
    assert!(matches!(err, GenPixError::QuotaExceeded(_)));
    assert!(page.images().unwrap().is_empty());
    assert_eq!(page.host().events(), vec![HostEvent::Upsell, HostEvent::Refresh]);

    let err = page.request_download("image.png", 0).await.unwrap_err();
    assert!(matches!(err, GenPixError::InvalidResource(_)));
}

#[tokio::test]
async fn stalled_generation_times_out_and_unlocks_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/image"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"url": "https://x/1.png"}]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = page_config(&server).with_request_timeout(1);
    let page = HttpPage::from_config(&config, RecordingHost::new()).unwrap();

    let err = page.submit(FormValues::new("A red circle")).await.unwrap_err();
    assert!(matches!(err, GenPixError::RequestError(_)));
    assert!(!page.form().is_submitting().unwrap());
    assert_eq!(
        page.host().events(),
        vec![
            HostEvent::Error("Something went wrong".into()),
            HostEvent::Refresh
        ]
    );
}
