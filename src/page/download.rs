use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::client::ProxyApi;
use crate::codec::decode_blob;
use crate::error::{GenPixError, Result};
use crate::page::slots::{DownloadToken, SlotAction, SlotOutcome};
use crate::page::{PageHost, SharedState, GENERIC_ERROR_MESSAGE};

pub const MISSING_URL_MESSAGE: &str = "Resource URL not provided! You need to provide one";

/// Result of a finished download.
#[derive(Debug)]
pub struct DownloadReceipt {
    pub token: DownloadToken,
    pub bytes: usize,
    /// Delayed task returning the slot to idle.
    pub reset: JoinHandle<()>,
}

pub struct DownloadController<P, H> {
    proxy: Arc<P>,
    host: Arc<H>,
    state: SharedState,
    content_type: String,
    reset_delay: Duration,
}

impl<P, H> DownloadController<P, H>
where
    P: ProxyApi + 'static,
    H: PageHost + 'static,
{
    pub fn new(
        proxy: Arc<P>,
        host: Arc<H>,
        state: SharedState,
        content_type: impl Into<String>,
        reset_delay: Duration,
    ) -> Self {
        Self {
            proxy,
            host,
            state,
            content_type: content_type.into(),
            reset_delay,
        }
    }

    /// Downloads the image at `index` through the proxy and saves it as
    /// `display_name`.
    pub async fn request_download(
        &self,
        display_name: &str,
        index: usize,
    ) -> Result<DownloadReceipt> {
        let (url, token) = {
            let mut state = self.state.lock()?;
            let url = state
                .images
                .get(index)
                .map(|image| image.url.clone())
                .filter(|url| !url.is_empty())
                .ok_or_else(|| GenPixError::InvalidResource(MISSING_URL_MESSAGE.into()))?;
            let token = state.board.begin(index)?;
            (url, token)
        };

        log::info!("⬇️  Downloading image {} from {}", index, url);

        let payload = match self.proxy.fetch_base64(&url).await {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("❌ Download of image {} failed: {}", index, e);
                self.host.notify_error(GENERIC_ERROR_MESSAGE);
                self.settle(SlotAction::Fail(token));
                return Err(e);
            }
        };

        let Some(blob) = decode_blob(&payload, &self.content_type, self.host.as_ref()) else {
            self.settle(SlotAction::Fail(token));
            return Err(GenPixError::EncodingError(format!(
                "Payload for image {} is not valid base64",
                index
            )));
        };

        if let Err(e) = self.host.save(&blob, display_name) {
            log::error!("❌ Saving {} failed: {}", display_name, e);
            self.host.notify_error(GENERIC_ERROR_MESSAGE);
            self.settle(SlotAction::Fail(token));
            return Err(e);
        }

        self.settle(SlotAction::Complete(token));
        log::info!("✅ Saved image {} as {} ({} bytes)", index, display_name, blob.size());

        Ok(DownloadReceipt {
            token,
            bytes: blob.size(),
            reset: self.schedule_reset(token),
        })
    }

    fn schedule_reset(&self, token: DownloadToken) -> JoinHandle<()> {
        let state = self.state.clone();
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match state.lock() {
                Ok(mut state) => {
                    if let Ok(SlotOutcome::Stale) = state.board.apply(SlotAction::Reset(token)) {
                        log::debug!("Skipped stale reset for slot {}", token.index);
                    }
                }
                Err(e) => log::error!("❌ Reset of slot {} failed: {}", token.index, e),
            }
        })
    }

    fn settle(&self, action: SlotAction) {
        let outcome = self
            .state
            .lock()
            .and_then(|mut state| state.board.apply(action));
        match outcome {
            Ok(SlotOutcome::Stale) => log::debug!("Ignored stale {:?}", action),
            Ok(_) => {}
            Err(e) => log::error!("❌ Could not update download slot: {}", e),
        }
    }
}
