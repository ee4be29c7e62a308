//! # undocx
//!
//! Decode Word (DOCX) packages into a semantically rich document model.
//!
//! The decoder opens the package, resolves numbering, styles and
//! relationships once, then walks the main body (and optionally headers,
//! footers and notes) into an ordered list of [`Element`]s: paragraphs with
//! formatted runs and fields, headings, tables with merge geometry, images,
//! bookmarks and page breaks.
//!
//! ## Quick Start
//!
//! ```no_run
//! // Simple text extraction
//! let text = undocx::extract_text("document.docx")?;
//! println!("{}", text);
//!
//! // Full decode with access to structure
//! let doc = undocx::decode_file("document.docx")?;
//! println!("Elements: {}", doc.elements.len());
//! println!("Words: {}", doc.word_count);
//! # Ok::<(), undocx::Error>(())
//! ```
//!
//! ## Options
//!
//! ```no_run
//! use undocx::{decode_file_with_options, DecodeOptions};
//!
//! let options = DecodeOptions::default()
//!     .with_images(false)
//!     .with_notes(false);
//! let doc = decode_file_with_options("report.docx", &options)?;
//! # Ok::<(), undocx::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: [`decode_file_async`] reads the file with Tokio

pub mod container;
pub mod docx;
pub mod error;
pub mod model;
pub mod options;
pub mod relationships;
pub mod units;
pub mod xml;

// Re-exports
pub use container::OoxmlContainer;
pub use docx::DocxParser;
pub use error::{Error, ErrorCategory, Result};
pub use model::{
    Bookmark, Cell, Document, Element, Field, FieldType, Heading, HeaderFooter, HeaderFooterKind,
    Image, ImageFormat, ListInfo, Metadata, Note, NumberingDefinition, Paragraph, Row, Table,
    TextRun, TextStyle,
};
pub use options::DecodeOptions;
pub use relationships::{Relationship, Relationships};

use std::path::Path;

/// Decode a DOCX package held in memory.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("document.docx")?;
/// let doc = undocx::decode_bytes(&data)?;
/// # Ok::<(), undocx::Error>(())
/// ```
pub fn decode_bytes(data: &[u8]) -> Result<Document> {
    decode_bytes_with_options(data, &DecodeOptions::default())
}

/// Decode a DOCX package held in memory with options.
pub fn decode_bytes_with_options(data: &[u8], options: &DecodeOptions) -> Result<Document> {
    DocxParser::from_bytes(data.to_vec())?
        .with_options(options.clone())
        .parse()
}

/// Decode a DOCX file.
///
/// # Example
///
/// ```no_run
/// let doc = undocx::decode_file("document.docx")?;
/// for heading in doc.headings() {
///     println!("{} {}", "#".repeat(heading.level as usize), heading.plain_text());
/// }
/// # Ok::<(), undocx::Error>(())
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<Document> {
    decode_file_with_options(path, &DecodeOptions::default())
}

/// Decode a DOCX file with options.
pub fn decode_file_with_options(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<Document> {
    DocxParser::open(path)?
        .with_options(options.clone())
        .parse()
}

/// Extract plain text from a document.
///
/// # Example
///
/// ```no_run
/// use undocx::extract_text;
///
/// let text = extract_text("document.docx")?;
/// println!("{}", text);
/// # Ok::<(), undocx::Error>(())
/// ```
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let doc = decode_file(path)?;
    Ok(doc.plain_text())
}

/// Decode a DOCX file, reading it asynchronously.
///
/// The decode itself runs on the calling task once the bytes are loaded.
#[cfg(feature = "async")]
pub async fn decode_file_async(path: impl AsRef<Path>) -> Result<Document> {
    let data = tokio::fs::read(path).await?;
    decode_bytes(&data)
}
