//! Uploaded image bytes with a sniffed format.

use bytes::Bytes;
use domains::{DomainError, Result};

/// An uploaded image. The content type and extension come from the bytes,
/// never from what the client declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    data: Bytes,
    content_type: &'static str,
    extension: &'static str,
}

impl Photo {
    /// Rejects anything that is not a recognised image format.
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let format = image::guess_format(&data)
            .map_err(|_| DomainError::Validation("file is not a recognised image".to_string()))?;
        Ok(Self {
            content_type: format.to_mime_type(),
            extension: format.extensions_str().first().copied().unwrap_or("img"),
            data,
        })
    }

    /// Cheap clone of the underlying buffer.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_png_and_jpeg() {
        let png = Photo::from_bytes(Bytes::from_static(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR")).unwrap();
        assert_eq!(png.content_type(), "image/png");
        assert_eq!(png.extension(), "png");

        let jpeg = Photo::from_bytes(Bytes::from_static(b"\xFF\xD8\xFF\xE0\0\x10JFIF")).unwrap();
        assert_eq!(jpeg.content_type(), "image/jpeg");
        assert_eq!(jpeg.extension(), "jpg");
    }

    #[test]
    fn rejects_non_images() {
        let err = Photo::from_bytes(Bytes::from_static(b"<html>nope</html>")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
