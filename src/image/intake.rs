//! Reading user photos into [`UploadedImage`]s.

use crate::error::{DeemgError, Result};
use crate::image::types::{ImageFormat, UploadedImage};
use std::path::Path;

/// Media type used when neither extension nor content identify the file.
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Reads a photo from disk.
///
/// The media type comes from the file extension, the way a browser file
/// picker declares it, falling back to magic-byte sniffing. No size or type
/// validation happens here; a read error or an empty file is the only failure.
pub async fn load(path: impl AsRef<Path>) -> Result<UploadedImage> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(DeemgError::Decode(format!("{} is empty", path.display())));
    }
    let mime_type = declared_mime_type(path, &bytes);

    tracing::debug!(
        path = %path.display(),
        size_bytes = bytes.len(),
        mime_type,
        "loaded upload"
    );

    Ok(UploadedImage::from_bytes(&bytes, mime_type))
}

fn declared_mime_type(path: &Path, bytes: &[u8]) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .or_else(|| ImageFormat::from_magic_bytes(bytes))
        .map_or(FALLBACK_MIME_TYPE, |f| f.mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[tokio::test]
    async fn test_load_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.JPG");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        let image = load(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.data(), "iVBORw0KGgoAAAAA");
    }

    #[tokio::test]
    async fn test_load_sniffs_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partner");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        let image = load(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/png");
    }

    #[tokio::test]
    async fn test_load_unknown_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let image = load(&path).await.unwrap();
        assert_eq!(image.mime_type(), FALLBACK_MIME_TYPE);
    }

    #[tokio::test]
    async fn test_load_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(load(&path).await, Err(DeemgError::Decode(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path().join("missing.png")).await.is_err());
    }
}
