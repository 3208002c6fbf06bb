//! actix-web routes for the download proxy.
//!
//! `GET /api/download/{url}` is the authenticated route the page uses. The
//! unauthenticated `/api/imageDownload` variants are mounted only when
//! [`ProxyConfig::public_routes`] is set.

use actix_web::{
    http::{header, StatusCode},
    middleware, web, App, HttpRequest, HttpResponse, HttpServer, ResponseError,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    config::ProxyConfig,
    error::GenPixError,
    models::ImageDataRequest,
    proxy::fetcher::{decode_path_segment, with_https_scheme, ProxyFetcher},
};

pub const ERROR_TAG: &str = "DOWNLOADS_ERROR";
pub const SESSION_COOKIE: &str = "__session";

const DOWNLOAD_PREFIX: &str = "/api/download";
const PUBLIC_PREFIX: &str = "/api/imageDownload";

pub struct ProxyState {
    pub fetcher: ProxyFetcher,
    pub config: ProxyConfig,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> crate::Result<Self> {
        Ok(Self {
            fetcher: ProxyFetcher::new(config.upstream_timeout())?,
            config,
        })
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    MissingUrl(&'static str),
    #[error("Internal Error")]
    Internal(GenPixError),
}

impl ProxyError {
    /// An empty tail is a 400. A tail that fails to decode is a 500.
    fn from_path(err: GenPixError) -> Self {
        match err {
            GenPixError::ValidationError(_) => ProxyError::MissingUrl("Image URL is required"),
            other => ProxyError::Internal(other),
        }
    }
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::MissingUrl(_) => StatusCode::BAD_REQUEST,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

/// Logs a failed proxy request under [`ERROR_TAG`] and hands it back.
fn logged(err: ProxyError) -> ProxyError {
    match &err {
        ProxyError::Internal(cause) => log::error!("{} {}", ERROR_TAG, cause),
        other => log::warn!("{} {}", ERROR_TAG, other),
    }
    err
}

pub fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
}

/// Raw path tail after `prefix`, with the query string re-attached.
fn path_tail(req: &HttpRequest, prefix: &str) -> String {
    let tail = req
        .uri()
        .path()
        .strip_prefix(prefix)
        .unwrap_or_default()
        .trim_start_matches('/');
    match req.uri().query() {
        Some(query) if !tail.is_empty() => format!("{}?{}", tail, query),
        _ => tail.to_string(),
    }
}

async fn proxy_response(state: &ProxyState, url: &str) -> Result<HttpResponse, ProxyError> {
    let encoded = state
        .fetcher
        .fetch_base64(url)
        .await
        .map_err(|e| logged(ProxyError::Internal(e)))?;
    Ok(HttpResponse::Ok().json(encoded))
}

pub async fn download(
    req: HttpRequest,
    state: web::Data<ProxyState>,
) -> Result<HttpResponse, ProxyError> {
    let authorized = session_token(&req).map_or(false, |token| state.config.accepts(&token));
    if !authorized {
        return Err(logged(ProxyError::Unauthorized));
    }

    let url = decode_path_segment(&path_tail(&req, DOWNLOAD_PREFIX))
        .map_err(|e| logged(ProxyError::from_path(e)))?;

    log::info!("⬇️  Proxying {}", url);
    proxy_response(&state, &url).await
}

pub async fn public_download(
    req: HttpRequest,
    state: web::Data<ProxyState>,
) -> Result<HttpResponse, ProxyError> {
    let segment = decode_path_segment(&path_tail(&req, PUBLIC_PREFIX))
        .map_err(|e| logged(ProxyError::from_path(e)))?;
    let url = with_https_scheme(&segment);

    log::info!("⬇️  Proxying {} (public)", url);
    proxy_response(&state, &url).await
}

pub async fn public_download_body(
    body: web::Json<ImageDataRequest>,
    state: web::Data<ProxyState>,
) -> Result<HttpResponse, ProxyError> {
    let url = body
        .into_inner()
        .image_data_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| logged(ProxyError::MissingUrl("URL is required.")))?;

    log::info!("⬇️  Proxying {} (public, body)", url);
    proxy_response(&state, &url).await
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Registers the proxy routes. The state must be added as app data.
pub fn configure(cfg: &mut web::ServiceConfig, public_routes: bool) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("{} {}", ERROR_TAG, err);
        ProxyError::MissingUrl("URL is required.").into()
    }))
    .route("/health", web::get().to(health))
    .route(DOWNLOAD_PREFIX, web::get().to(download))
    .route("/api/download/{url:.*}", web::get().to(download));

    if public_routes {
        cfg.route(PUBLIC_PREFIX, web::post().to(public_download_body))
            .route("/api/imageDownload/{url:.*}", web::get().to(public_download));
    }
}

pub async fn run(config: ProxyConfig) -> std::io::Result<()> {
    let address = config.bind_address();
    let public_routes = config.public_routes;
    let state = web::Data::new(
        ProxyState::new(config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );

    if public_routes {
        log::warn!("⚠️  Unauthenticated download routes are enabled");
    }
    log::info!("🌐 Download proxy listening on http://{}", address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(|cfg| configure(cfg, public_routes))
    })
    .bind(address)?
    .run()
    .await
}
