//! Prompt-to-image page controllers and a base64 download proxy.
//!
//! The [`page`] module holds the client-side flow: submitting a prompt to the
//! generation endpoint and downloading each returned image through the proxy,
//! one at a time. The [`proxy`] module is the server side that fetches a
//! remote image and returns it as a base64 JSON string so a browser can save
//! it despite cross-origin restrictions.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod page;
pub mod proxy;

pub use client::{GenerationApi, HttpGenerationApi, HttpProxyApi, ProxyApi};
pub use codec::{decode_blob, encode_base64, try_decode_blob, Blob};
pub use config::{Config, PageConfig, ProxyConfig};
pub use error::{GenPixError, Result};
pub use models::*;
pub use page::{
    DirectoryHost, DownloadController, FormController, HttpPage, Page, PageHost, RecordingHost,
    SlotBoard,
};
pub use proxy::ProxyFetcher;
