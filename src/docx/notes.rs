//! Footnotes and endnotes.

use super::part::{DecodeContext, PartParser};
use crate::model::{NoteKind, Note};
use crate::xml::{ns, XmlDocument};

/// Note types that only carry layout (separator lines), not content.
const LAYOUT_TYPES: &[&str] = &["separator", "continuationSeparator", "continuationNotice"];

/// Default part path of each notes kind.
pub fn default_part(kind: NoteKind) -> &'static str {
    match kind {
        NoteKind::Footnote => "word/footnotes.xml",
        NoteKind::Endnote => "word/endnotes.xml",
    }
}

/// Parse the notes of one notes part. Each note body is decoded like the
/// main body, against the notes part's own relationships.
pub fn parse_notes(
    ctx: &DecodeContext<'_>,
    part_path: &str,
    doc: &XmlDocument,
    kind: NoteKind,
) -> Vec<Note> {
    let local = match kind {
        NoteKind::Footnote => "footnote",
        NoteKind::Endnote => "endnote",
    };
    let mut parser = PartParser::for_part(ctx, part_path);

    doc.root()
        .children_named(ns::W, local)
        .into_iter()
        .filter(|note| {
            !note
                .attr(ns::W, "type")
                .is_some_and(|t| LAYOUT_TYPES.contains(&t))
        })
        .filter_map(|note| {
            let id = note.attr(ns::W, "id").filter(|id| !id.is_empty())?;
            Some(Note {
                id: id.to_string(),
                content: parser.parse_blocks(note),
            })
        })
        .collect()
}
