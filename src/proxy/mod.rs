pub mod fetcher;
#[cfg(feature = "server")]
pub mod server;

pub use fetcher::{decode_path_segment, with_https_scheme, ProxyFetcher};
