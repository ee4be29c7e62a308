//! Document model produced by the decoder.
//!
//! These structures are the read-only output of a decode. Parsers in
//! [`crate::docx`] build them once; consumers walk `Document::elements` in
//! reading order.

mod border;
mod document;
mod image;
mod numbering;
mod paragraph;
mod run;
mod table;

pub use border::*;
pub use document::*;
pub use image::*;
pub use numbering::*;
pub use paragraph::*;
pub use run::*;
pub use table::*;
