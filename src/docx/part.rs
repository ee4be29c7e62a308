//! Block content of one part: body, header, footer or note.

use super::field_lookup::{FieldLookup, FormulaScope};
use super::image::ImageExtractor;
use super::numbering::ListCounters;
use super::properties::{apply_paragraph_properties, child_val, list_reference, num};
use super::styles::{outline_to_heading, StyleMap};
use super::theme::Theme;
use crate::container::OoxmlContainer;
use crate::model::{Element, Heading, NumberingDefinition, Paragraph};
use crate::options::DecodeOptions;
use crate::relationships::Relationships;
use crate::xml::{ns, Node};

/// Shared lookups of a decode, built once before any part is walked.
pub struct DecodeContext<'a> {
    pub container: &'a OoxmlContainer,
    pub options: &'a DecodeOptions,
    pub styles: &'a StyleMap,
    pub numbering: Option<&'a NumberingDefinition>,
    pub theme: Option<&'a Theme>,
    /// Stand-in values for fields without a cached result
    pub fields: FieldLookup,
}

impl<'a> DecodeContext<'a> {
    /// A context with no numbering, no theme and an empty field lookup.
    pub fn new(
        container: &'a OoxmlContainer,
        options: &'a DecodeOptions,
        styles: &'a StyleMap,
    ) -> Self {
        Self {
            container,
            options,
            styles,
            numbering: None,
            theme: None,
            fields: FieldLookup::default(),
        }
    }
}

/// Walks the block content of a single part.
///
/// Holds the part's own relationship manifest, so hyperlinks and images
/// resolve against the right targets, and its own list counters.
pub struct PartParser<'a> {
    pub(super) ctx: &'a DecodeContext<'a>,
    pub(super) part_path: &'a str,
    pub(super) rels: Relationships,
    counters: ListCounters,
    /// Neighbour values of the table cells being walked, innermost last
    pub(super) formula_scopes: Vec<FormulaScope>,
}

impl<'a> PartParser<'a> {
    pub fn new(ctx: &'a DecodeContext<'a>, part_path: &'a str, rels: Relationships) -> Self {
        Self {
            ctx,
            part_path,
            rels,
            counters: ListCounters::new(),
            formula_scopes: Vec::new(),
        }
    }

    /// Load the part's relationship manifest, degrading to an empty one when
    /// it is malformed.
    pub fn for_part(ctx: &'a DecodeContext<'a>, part_path: &'a str) -> Self {
        let rels = Relationships::load(ctx.container, part_path).unwrap_or_else(|e| {
            log::warn!("{}: ignoring relationships: {}", part_path, e);
            Relationships::new()
        });
        Self::new(ctx, part_path, rels)
    }

    pub fn relationships(&self) -> &Relationships {
        &self.rels
    }

    pub(super) fn images(&self) -> ImageExtractor<'_> {
        ImageExtractor::new(
            self.ctx.container,
            &self.rels,
            self.part_path,
            self.ctx.options,
        )
    }

    /// Paragraphs, tables and breaks of a block container, in order.
    ///
    /// Block-level `w:sdt` and `w:customXml` wrappers are transparent. A
    /// `w:sectPr` that is not the container's last element marks a section
    /// break.
    pub fn parse_blocks(&mut self, container: Node<'_>) -> Vec<Element> {
        let mut elements = Vec::new();
        self.collect_blocks(container, &mut elements);
        elements
    }

    fn collect_blocks(&mut self, container: Node<'_>, out: &mut Vec<Element>) {
        let last = container.children().last();
        for child in container.children() {
            if child.is(ns::W, "p") {
                self.push_paragraph(child, out);
            } else if child.is(ns::W, "tbl") {
                out.push(Element::Table(self.parse_table(child)));
            } else if child.is(ns::W, "sdt") {
                if let Some(content) = child.child(ns::W, "sdtContent") {
                    self.collect_blocks(content, out);
                }
            } else if child.is(ns::W, "customXml") {
                self.collect_blocks(child, out);
            } else if child.is(ns::W, "sectPr") && Some(child) != last {
                out.push(Element::PageBreak);
            }
        }
    }

    /// Decode one paragraph and append what it becomes: a paragraph, a
    /// heading, or one image element per picture, followed by a page break
    /// when it carries one.
    ///
    /// Properties are the paragraph style's (over the document defaults)
    /// with the paragraph's own `w:pPr` on top. List membership comes from
    /// the paragraph's `w:numPr`, or from its style when it has none.
    pub(super) fn push_paragraph(&mut self, p: Node<'_>, out: &mut Vec<Element>) {
        let ppr = p.child(ns::W, "pPr");
        let style_id = ppr.and_then(|pr| child_val(pr, "pStyle"));

        let mut properties = self.ctx.styles.paragraph_properties(style_id);
        if let Some(pr) = ppr {
            apply_paragraph_properties(&mut properties, pr);
        }
        let inline = self.parse_inline(p);

        let list_ref = match ppr.filter(|pr| pr.child(ns::W, "numPr").is_some()) {
            Some(pr) => list_reference(pr),
            None => self.ctx.styles.style_numbering(style_id),
        };
        let list_info = list_ref.and_then(|(num_id, level)| {
            let numbering = self.ctx.numbering?;
            self.counters.next(numbering, &num_id, level)
        });

        let heading_level = style_id
            .and_then(|id| self.ctx.styles.heading_level(id))
            .or_else(|| {
                ppr.and_then(|pr| num::<u8>(child_val(pr, "outlineLvl")))
                    .and_then(outline_to_heading)
            });

        let section_break = ppr.is_some_and(|pr| pr.child(ns::W, "sectPr").is_some());

        let paragraph = Paragraph {
            runs: inline.runs,
            fields: inline.fields,
            properties,
            list_info,
        };

        // A list item keeps its paragraph so the numbering is not lost.
        if paragraph.is_image_only() && paragraph.list_info.is_none() {
            let alignment = paragraph.properties.alignment;
            out.extend(
                paragraph
                    .runs
                    .into_iter()
                    .filter_map(|run| run.image)
                    .map(|mut image| {
                        image.alignment = alignment;
                        Element::Image(image)
                    }),
            );
        } else if let Some(level) = heading_level {
            out.push(Element::Heading(Heading::new(level, paragraph)));
        } else {
            out.push(Element::Paragraph(paragraph));
        }

        if inline.page_break || section_break {
            out.push(Element::PageBreak);
        }
    }
}
