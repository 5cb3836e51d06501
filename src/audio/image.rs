//! Image reading and inline-transport encoding
//!
//! The reasoning service takes images as base64 inline data with a declared
//! MIME type. The type is sniffed from the leading bytes; unknown formats
//! fall back to the historical JPEG assumption.

use crate::types::EncodedImage;
use anyhow::{Context, Result};
use base64::Engine;
use std::path::Path;

/// Fallback MIME type when the payload is not recognized.
const FALLBACK_MIME: &str = "image/jpeg";

/// Read an image file and encode it for inline transport.
pub fn encode_image(path: &Path) -> Result<EncodedImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image at {}", path.display()))?;
    Ok(encode_image_bytes(&bytes))
}

/// Encode already-loaded image bytes for inline transport.
pub fn encode_image_bytes(bytes: &[u8]) -> EncodedImage {
    EncodedImage {
        base64: base64::engine::general_purpose::STANDARD.encode(bytes),
        mime_type: sniff_mime(bytes).to_string(),
    }
}

/// Detect the image MIME type from magic bytes.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        "image/png"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else {
        FALLBACK_MIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_jpeg() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), "image/jpeg");
    }

    #[test]
    fn test_sniff_png() {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        assert_eq!(sniff_mime(&bytes), "image/png");
    }

    #[test]
    fn test_sniff_webp() {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(b"WEBP");
        assert_eq!(sniff_mime(&bytes), "image/webp");
    }

    #[test]
    fn test_unknown_falls_back_to_jpeg() {
        assert_eq!(sniff_mime(b"definitely not an image"), "image/jpeg");
    }

    #[test]
    fn test_encode_bytes_round_trip() {
        let encoded = encode_image_bytes(&[0xFF, 0xD8, 0xFF, 0x01, 0x02]);
        assert_eq!(encoded.mime_type, "image/jpeg");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&encoded.base64)
            .unwrap();
        assert_eq!(decoded, vec![0xFF, 0xD8, 0xFF, 0x01, 0x02]);
    }
}
