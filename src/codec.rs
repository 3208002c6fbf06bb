//! Base64 <-> binary conversion for proxied image downloads.
//!
//! The proxy ships image bytes as a JSON string holding standard base64. The
//! page turns that string back into a [`Blob`] before handing it to the save
//! action. Decoding streams through the input and emits the blob in
//! [`SLICE_SIZE`] parts so the full decoded buffer never has to exist twice.

use std::io::{ErrorKind, Read};

use base64::{engine::general_purpose::STANDARD, read::DecoderReader, Engine as _};

use crate::error::{GenPixError, Result};
use crate::page::PageHost;

pub const SLICE_SIZE: usize = 512;

pub const ENCODING_FAILED_MESSAGE: &str = "Something went wrong with encoding image download";

/// Binary object tagged with a content type, assembled from byte slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    content_type: String,
    parts: Vec<Vec<u8>>,
    size: usize,
}

impl Blob {
    pub fn new(parts: Vec<Vec<u8>>, content_type: impl Into<String>) -> Self {
        let size = parts.iter().map(Vec::len).sum();
        Self {
            content_type: content_type.into(),
            parts,
            size,
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn parts(&self) -> &[Vec<u8>] {
        &self.parts
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size);
        for part in &self.parts {
            bytes.extend_from_slice(part);
        }
        bytes
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes `base64_data` into a blob, failing on malformed input.
pub fn try_decode_blob(base64_data: &str, content_type: &str) -> Result<Blob> {
    let mut input = base64_data.trim().as_bytes();
    let mut reader = DecoderReader::new(&mut input, &STANDARD);
    let mut parts = Vec::new();

    loop {
        let mut slice = vec![0u8; SLICE_SIZE];
        let mut filled = 0;
        while filled < SLICE_SIZE {
            match reader.read(&mut slice[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(GenPixError::EncodingError(e.to_string())),
            }
        }

        if filled == 0 {
            break;
        }
        slice.truncate(filled);
        parts.push(slice);
        if filled < SLICE_SIZE {
            break;
        }
    }

    Ok(Blob::new(parts, content_type))
}

/// Decodes `base64_data` for download. Malformed input is reported to the
/// user through `host` and yields `None`.
pub fn decode_blob<H>(base64_data: &str, content_type: &str, host: &H) -> Option<Blob>
where
    H: PageHost + ?Sized,
{
    match try_decode_blob(base64_data, content_type) {
        Ok(blob) => Some(blob),
        Err(e) => {
            log::error!("Error creating blob: {}", e);
            host.notify_error(ENCODING_FAILED_MESSAGE);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::host::RecordingHost;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn test_round_trip_odd_lengths() {
        for len in [0, 1, 2, 3, 511, 512, 513, 1024, 1537, 4099] {
            let bytes = sample(len);
            let blob = try_decode_blob(&encode_base64(&bytes), "image/png").unwrap();
            assert_eq!(blob.size(), len);
            assert_eq!(blob.to_bytes(), bytes);
            assert_eq!(encode_base64(&blob.to_bytes()), encode_base64(&bytes));
        }
    }

    #[test]
    fn test_parts_are_bounded() {
        let bytes = sample(1300);
        let blob = try_decode_blob(&encode_base64(&bytes), "image/png").unwrap();
        let sizes: Vec<usize> = blob.parts().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![512, 512, 276]);
        assert_eq!(blob.content_type(), "image/png");
    }

    #[test]
    fn test_empty_payload_is_empty_blob() {
        let blob = try_decode_blob("", "image/png").unwrap();
        assert_eq!(blob.size(), 0);
        assert!(blob.parts().is_empty());
    }

    #[test]
    fn test_malformed_input_notifies() {
        let host = RecordingHost::default();
        assert!(decode_blob("not*base64!", "image/png", &host).is_none());
        assert_eq!(host.errors(), vec![ENCODING_FAILED_MESSAGE.to_string()]);
    }

    #[test]
    fn test_valid_input_is_silent() {
        let host = RecordingHost::default();
        let blob = decode_blob("aGVsbG8=", "text/plain", &host).unwrap();
        assert_eq!(blob.to_bytes(), b"hello");
        assert!(host.errors().is_empty());
    }
}
