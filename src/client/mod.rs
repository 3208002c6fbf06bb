pub mod generation;
pub mod proxy;

pub use generation::{GenerationApi, HttpGenerationApi};
pub use proxy::{HttpProxyApi, ProxyApi};

use crate::error::{GenPixError, Result};

/// Maps a non-success response to an error, keeping the body for context.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 => GenPixError::Unauthorized,
        403 => GenPixError::QuotaExceeded(message),
        code => GenPixError::UpstreamError {
            status: code,
            message,
        },
    })
}
