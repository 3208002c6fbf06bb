//! Controllers behind the image generation page.
//!
//! [`Page`] wires a [`FormController`] and a [`DownloadController`] to one
//! shared [`PageState`]. Both controllers only touch the state between
//! suspension points, so the lock is never held across an `.await`.

pub mod download;
pub mod form;
pub mod host;
pub mod slots;

use std::sync::{Arc, Mutex, MutexGuard};

pub use download::{DownloadController, DownloadReceipt};
pub use form::FormController;
pub use host::{DirectoryHost, HostEvent, PageHost, RecordingHost};
pub use slots::{DownloadToken, SlotAction, SlotBoard, SlotOutcome};

use crate::client::{GenerationApi, HttpGenerationApi, HttpProxyApi, ProxyApi};
use crate::config::PageConfig;
use crate::error::{GenPixError, Result};
use crate::models::{DownloadSlot, FormValues, ImageResult};

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone)]
pub struct PageState {
    pub images: Vec<ImageResult>,
    pub board: SlotBoard,
    pub form: FormValues,
    pub submitting: bool,
}

impl PageState {
    pub fn new(slot_count: usize) -> Self {
        Self {
            images: Vec::new(),
            board: SlotBoard::new(slot_count),
            form: FormValues::default(),
            submitting: false,
        }
    }
}

#[derive(Clone)]
pub struct SharedState(Arc<Mutex<PageState>>);

impl SharedState {
    pub fn new(state: PageState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, PageState>> {
        self.0
            .lock()
            .map_err(|_| GenPixError::InternalError("Page state lock poisoned".into()))
    }

    pub fn snapshot(&self) -> Result<PageState> {
        Ok(self.lock()?.clone())
    }
}

pub struct Page<G, P, H> {
    state: SharedState,
    host: Arc<H>,
    display_name: String,
    form: FormController<G, H>,
    downloads: DownloadController<P, H>,
}

pub type HttpPage<H> = Page<HttpGenerationApi, HttpProxyApi, H>;

impl<G, P, H> Page<G, P, H>
where
    G: GenerationApi + 'static,
    P: ProxyApi + 'static,
    H: PageHost + 'static,
{
    pub fn new(config: &PageConfig, generation: G, proxy: P, host: H) -> Self {
        let state = SharedState::new(PageState::new(config.slot_count));
        let host = Arc::new(host);
        Self {
            form: FormController::new(
                Arc::new(generation),
                host.clone(),
                state.clone(),
                config.slot_count,
            ),
            downloads: DownloadController::new(
                Arc::new(proxy),
                host.clone(),
                state.clone(),
                config.content_type.clone(),
                config.reset_delay(),
            ),
            state,
            host,
            display_name: config.display_name.clone(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn form(&self) -> &FormController<G, H> {
        &self.form
    }

    pub fn downloads(&self) -> &DownloadController<P, H> {
        &self.downloads
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub async fn submit(&self, values: FormValues) -> Result<Vec<ImageResult>> {
        self.form.submit(values).await
    }

    pub async fn request_download(
        &self,
        display_name: &str,
        index: usize,
    ) -> Result<DownloadReceipt> {
        self.downloads.request_download(display_name, index).await
    }

    /// Downloads the image at `index` under the configured display name.
    pub async fn download(&self, index: usize) -> Result<DownloadReceipt> {
        self.request_download(&self.display_name, index).await
    }

    pub fn images(&self) -> Result<Vec<ImageResult>> {
        Ok(self.state.lock()?.images.clone())
    }

    pub fn slots(&self) -> Result<Vec<DownloadSlot>> {
        Ok(self.state.lock()?.board.slots())
    }
}

impl<H> HttpPage<H>
where
    H: PageHost + 'static,
{
    /// Builds a page that talks to the generation endpoint and the download
    /// proxy over HTTP.
    pub fn from_config(config: &PageConfig, host: H) -> Result<Self> {
        let timeout = config.request_timeout();
        let mut generation = HttpGenerationApi::new(&config.generation_url, timeout)?;
        let mut proxy = HttpProxyApi::new(&config.proxy_base_url, timeout)?;
        if let Some(token) = &config.session_token {
            generation = generation.with_session_token(token);
            proxy = proxy.with_session_token(token);
        }
        Ok(Self::new(config, generation, proxy, host))
    }
}
