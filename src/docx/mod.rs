//! DOCX (Word) document decoder.
//!
//! [`DocxParser`] drives the decode: it loads the shared lookups (theme,
//! styles, numbering, relationships, field values), walks the main body
//! through a [`PartParser`] and then the optional parts (headers, footers,
//! notes).

pub mod bookmark;
pub mod field;
pub mod field_lookup;
pub mod header_footer;
pub mod image;
pub mod metadata;
pub mod notes;
pub mod numbering;
mod parser;
pub mod part;
pub mod properties;
pub mod run;
pub mod styles;
pub mod table;
pub mod theme;

pub use field::FieldTracker;
pub use field_lookup::{FieldLookup, FormulaScope};
pub use image::ImageExtractor;
pub use numbering::{parse_numbering, ListCounters};
pub use parser::{DocxParser, DOCUMENT_PART};
pub use part::{DecodeContext, PartParser};
pub use run::InlineContent;
pub use styles::StyleMap;
pub use theme::Theme;
