use serde::{Deserialize, Serialize};

/// Progress of a single image's download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    #[default]
    Idle,
    Loading,
    Downloaded,
}

/// Flattened per-slot record the page renders a download button from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DownloadSlot {
    pub loading: bool,
    pub downloaded: bool,
    pub disabled: bool,
}

impl DownloadSlot {
    pub fn is_idle(&self) -> bool {
        !self.loading && !self.downloaded && !self.disabled
    }

    pub fn label(&self) -> &'static str {
        match (self.loading, self.downloaded) {
            (true, false) => "Downloading...",
            (false, true) => "Downloaded",
            _ => "Download",
        }
    }
}

/// Body accepted by the POST download proxy route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageDataRequest {
    #[serde(rename = "imageDataUrl", default)]
    pub image_data_url: Option<String>,
}
