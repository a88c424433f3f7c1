//! Asynchronous decode step: the infrastructure layer.
//!
//! Reads a selected file without blocking the caller's thread and turns its
//! bytes into a `data:` URI. Optionally sniffs the header with the `image`
//! crate so a `.png` that is really a text file fails here instead of
//! reaching the data sink.

use super::selection::{FileSource, SelectedFile};
use super::EncodedImage;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Reads and encodes `file`.
///
/// With `verify_content` set, the sniffed format must match the declared
/// MIME type and the image dimensions must be readable.
pub async fn decode_file(file: SelectedFile, verify_content: bool) -> Result<EncodedImage, DecodeError> {
    let start = std::time::Instant::now();

    let bytes = match file.source {
        FileSource::Memory(bytes) => bytes,
        FileSource::Path(path) => tokio::fs::read(&path).await?,
    };

    let mime = file.mime_type.trim();
    if verify_content {
        let (width, height) = sniff_image(mime, &bytes)?;
        log::debug!("[CAPTURE] {} is a {}x{} {}", file.name, width, height, mime);
    }

    let encoded = encode_data_uri(mime, &bytes);

    log::info!(
        "[CAPTURE] Decoded {} in {}ms, {} bytes",
        file.name,
        start.elapsed().as_millis(),
        bytes.len()
    );

    Ok(encoded)
}

/// Encodes raw bytes as `data:<mime>;base64,<payload>`.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> EncodedImage {
    EncodedImage::new(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// Checks the header of `bytes` against the declared type.
/// Returns the image dimensions on success.
fn sniff_image(declared: &str, bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;

    let expected = ImageFormat::from_mime_type(declared);
    let detected = reader.format();
    if expected.is_none() || expected != detected {
        return Err(DecodeError::ContentMismatch {
            declared: declared.to_string(),
            detected: detected
                .map(|f| f.to_mime_type().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        });
    }

    reader
        .into_dimensions()
        .map_err(|e| DecodeError::UnreadableImage(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("File content ({detected}) does not match declared type {declared}")]
    ContentMismatch { declared: String, detected: String },

    #[error("Image header could not be read: {0}")]
    UnreadableImage(String),

    #[error("Decode task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(8, 6));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn data_uri_has_mime_prefix() {
        let uri = encode_data_uri("image/png", &[1, 2, 3]);
        assert_eq!(uri.as_str(), "data:image/png;base64,AQID");
    }

    #[test]
    fn sniff_reads_dimensions() {
        assert_eq!(sniff_image("image/png", &png_bytes()).unwrap(), (8, 6));
    }

    #[test]
    fn sniff_rejects_mismatched_content() {
        let result = sniff_image("image/jpeg", &png_bytes());
        assert!(matches!(
            result,
            Err(DecodeError::ContentMismatch { ref detected, .. }) if detected == "image/png"
        ));
    }

    #[test]
    fn sniff_rejects_text() {
        let result = sniff_image("image/png", b"hello, not an image");
        assert!(matches!(result, Err(DecodeError::ContentMismatch { .. })));
    }

    #[tokio::test]
    async fn missing_path_is_a_read_error() {
        let file = SelectedFile::from_path("/definitely/not/here.png", "image/png");
        let result = decode_file(file, true).await;
        assert!(matches!(result, Err(DecodeError::Read(_))));
    }

    #[tokio::test]
    async fn memory_source_without_verification() {
        let file = SelectedFile::from_bytes("x.png", "image/png", b"anything".to_vec());
        let encoded = decode_file(file, false).await.unwrap();
        assert!(encoded.as_str().starts_with("data:image/png;base64,"));
    }
}
