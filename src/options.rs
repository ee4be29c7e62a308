//! Decoding options configuration.

/// Default cap on a single embedded image payload (10 MiB).
pub const DEFAULT_MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;

/// Options controlling which optional parts are decoded.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Largest image payload (in bytes) that will be loaded.
    pub max_image_size: u64,

    /// Load image payloads from the archive. When false, images keep their
    /// reference data (id, size, title, path) without bytes.
    pub extract_images: bool,

    /// Decode header and footer parts.
    pub include_headers_footers: bool,

    /// Decode footnote and endnote parts.
    pub include_notes: bool,

    /// Collect bookmarks from the main body.
    pub include_bookmarks: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
            extract_images: true,
            include_headers_footers: true,
            include_notes: true,
            include_bookmarks: true,
        }
    }
}

impl DecodeOptions {
    /// Create new decode options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image size cap in bytes.
    pub fn with_max_image_size(mut self, bytes: u64) -> Self {
        self.max_image_size = bytes;
        self
    }

    /// Enable or disable loading image payloads.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable header/footer decoding.
    pub fn with_headers_footers(mut self, include: bool) -> Self {
        self.include_headers_footers = include;
        self
    }

    /// Enable or disable footnote/endnote decoding.
    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    /// Enable or disable bookmark collection.
    pub fn with_bookmarks(mut self, include: bool) -> Self {
        self.include_bookmarks = include;
        self
    }
}
