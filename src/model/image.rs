//! Embedded image model.

use super::TextAlignment;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Raster formats recognised by their leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl ImageFormat {
    /// Identify a payload by its signature.
    ///
    /// WebP needs both the `RIFF` container tag at offset 0 and the `WEBP`
    /// form type at offset 8.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF") {
            Some(ImageFormat::Gif)
        } else if data.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP".as_slice()) {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Webp => "webp",
        }
    }
}

/// An image referenced from a drawing.
///
/// The payload is absent when the relationship or media entry is missing,
/// when the entry exceeds the size cap, or when image extraction is disabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Relationship id (`r:embed`) pointing at the media part
    pub relationship_id: String,

    /// Width in EMUs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,

    /// Height in EMUs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Alt text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Alignment of the paragraph a standalone picture was lifted from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,

    /// Archive path the payload was loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Detected format of the payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,

    /// Raw bytes
    #[serde(skip)]
    pub payload: Option<Vec<u8>>,
}

impl Image {
    /// Create an image reference with no payload.
    pub fn new(relationship_id: impl Into<String>) -> Self {
        Self {
            relationship_id: relationship_id.into(),
            ..Default::default()
        }
    }

    /// Attach a payload, detecting its format.
    pub fn set_payload(&mut self, data: Vec<u8>) {
        self.format = ImageFormat::detect(&data);
        self.payload = Some(data);
    }

    /// Whether the bytes were loaded.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Payload size in bytes (0 when absent).
    pub fn size(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }

    /// Payload encoded as standard base64.
    pub fn to_base64(&self) -> Option<String> {
        self.payload.as_ref().map(|data| STANDARD.encode(data))
    }

    /// A `data:` URI for the payload. Unknown formats use
    /// `application/octet-stream`.
    pub fn data_uri(&self) -> Option<String> {
        let mime = self
            .format
            .map_or("application/octet-stream", |f| f.mime_type());
        self.to_base64()
            .map(|encoded| format!("data:{};base64,{}", mime, encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(PNG), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"BM\x00\x00"), Some(ImageFormat::Bmp));
        assert_eq!(
            ImageFormat::detect(b"RIFF\x10\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
    }

    #[test]
    fn test_webp_needs_secondary_marker() {
        assert_eq!(ImageFormat::detect(b"RIFF\x10\x00\x00\x00WAVEfmt "), None);
        assert_eq!(ImageFormat::detect(b"RIFF"), None);
    }

    #[test]
    fn test_png_matches_only_png() {
        for _ in 0..2 {
            assert_eq!(ImageFormat::detect(PNG), Some(ImageFormat::Png));
        }
        assert_ne!(ImageFormat::detect(PNG), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::detect(&[0x00, 0x01, 0x02]), None);
        assert_eq!(ImageFormat::detect(&[]), None);
    }

    #[test]
    fn test_data_uri() {
        let mut image = Image::new("rId5");
        assert!(image.data_uri().is_none());

        image.set_payload(PNG.to_vec());
        assert_eq!(image.format, Some(ImageFormat::Png));
        assert_eq!(image.size(), 8);
        let uri = image.data_uri().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        image.set_payload(vec![1, 2, 3]);
        assert!(image.format.is_none());
        assert_eq!(
            image.data_uri().unwrap(),
            "data:application/octet-stream;base64,AQID"
        );
    }

    #[test]
    fn test_payload_not_serialized() {
        let mut image = Image::new("rId1");
        image.set_payload(PNG.to_vec());
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("\"format\":\"png\""));
        assert!(!json.contains("payload"));
    }
}
