use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::codec::Blob;
use crate::error::{GenPixError, Result};

/// Side effects the page controllers ask their surroundings to perform.
pub trait PageHost: Send + Sync {
    /// Show a transient error notification.
    fn notify_error(&self, message: &str);

    /// Open the upgrade prompt shown when the quota is exhausted.
    fn open_upsell(&self);

    /// Re-fetch server-derived page data such as usage counters.
    fn refresh(&self);

    /// Save `blob` under `file_name` on the user's side.
    fn save(&self, blob: &Blob, file_name: &str) -> Result<()>;
}

/// Host that writes saved blobs into a directory and logs everything else.
pub struct DirectoryHost {
    dir: PathBuf,
}

impl DirectoryHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PageHost for DirectoryHost {
    fn notify_error(&self, message: &str) {
        log::error!("❌ {}", message);
    }

    fn open_upsell(&self) {
        log::warn!("⚠️  Free generations exhausted, upgrade required");
    }

    fn refresh(&self) {
        log::debug!("Page data refresh requested");
    }

    fn save(&self, blob: &Blob, file_name: &str) -> Result<()> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| GenPixError::InvalidResource(format!("Bad file name: {}", file_name)))?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| GenPixError::InternalError(e.to_string()))?;
        let path = self.dir.join(name);
        std::fs::write(&path, blob.to_bytes())
            .map_err(|e| GenPixError::InternalError(e.to_string()))?;
        log::info!("💾 Saved {} bytes to {}", blob.size(), path.display());
        Ok(())
    }
}

/// Event captured by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Error(String),
    Upsell,
    Refresh,
    Saved {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// In-memory host for headless runs; records every request in order.
#[derive(Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
    fail_saves: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `save` call fail.
    pub fn failing_saves() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_saves: true,
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Saved {
                    file_name, bytes, ..
                } => Some((file_name, bytes)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl PageHost for RecordingHost {
    fn notify_error(&self, message: &str) {
        self.push(HostEvent::Error(message.to_string()));
    }

    fn open_upsell(&self) {
        self.push(HostEvent::Upsell);
    }

    fn refresh(&self) {
        self.push(HostEvent::Refresh);
    }

    fn save(&self, blob: &Blob, file_name: &str) -> Result<()> {
        if self.fail_saves {
            return Err(GenPixError::InternalError("save rejected".into()));
        }
        self.push(HostEvent::Saved {
            file_name: file_name.to_string(),
            content_type: blob.content_type().to_string(),
            bytes: blob.to_bytes(),
        });
        Ok(())
    }
}
