//! Headers and footers referenced from the body's section properties.

use super::part::{DecodeContext, PartParser};
use crate::container::OoxmlContainer;
use crate::model::{Element, HeaderFooter, HeaderFooterKind};
use crate::relationships::{kind, Relationships};
use crate::xml::{ns, parse_xml, Node};

/// Which side of the page a part belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Header,
    Footer,
}

impl Side {
    fn reference(self) -> &'static str {
        match self {
            Side::Header => "headerReference",
            Side::Footer => "footerReference",
        }
    }

    fn rel_kind(self) -> &'static str {
        match self {
            Side::Header => kind::HEADER,
            Side::Footer => kind::FOOTER,
        }
    }
}

/// Decode the headers or footers named by a `w:sectPr`.
///
/// Parts that are missing, malformed or unreachable through the document
/// relationships are skipped with a warning.
pub fn parse_side(
    ctx: &DecodeContext<'_>,
    sect_pr: Node<'_>,
    doc_rels: &Relationships,
    document_path: &str,
    side: Side,
) -> Vec<Element> {
    let mut elements = Vec::new();

    for reference in sect_pr.children_named(ns::W, side.reference()) {
        let Some(id) = reference.attr(ns::R, "id") else {
            continue;
        };
        let Some(rel) = doc_rels.get_of_kind(id, side.rel_kind()) else {
            log::warn!(
                "{}: {} reference {} has no relationship",
                document_path,
                side.reference(),
                id
            );
            continue;
        };
        let part_path = OoxmlContainer::resolve_path(document_path, &rel.target);
        let kind = reference
            .attr(ns::W, "type")
            .map(HeaderFooterKind::parse)
            .unwrap_or_default();

        let xml = match ctx.container.read_xml_optional(&part_path) {
            Ok(Some(xml)) => xml,
            Ok(None) => {
                log::warn!("{}: part is missing", part_path);
                continue;
            }
            Err(e) => {
                log::warn!("{}: {}", part_path, e);
                continue;
            }
        };
        let doc = match parse_xml(&xml) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("{}", e.in_part(&part_path));
                continue;
            }
        };

        log::debug!("{}: decoding {:?} {:?}", part_path, kind, side);
        let mut parser = PartParser::for_part(ctx, &part_path);
        let part = HeaderFooter {
            kind,
            content: parser.parse_blocks(doc.root()),
        };
        elements.push(match side {
            Side::Header => Element::Header(part),
            Side::Footer => Element::Footer(part),
        });
    }

    elements
}

#[cfg(test)]
mod tests {
    use super::super::part::test_support::*;
    use super::super::styles::StyleMap;
    use super::*;
    use crate::options::DecodeOptions;

    const RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
        <Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
        <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
        <Relationship Id="rId10" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header2.xml"/>
    </Relationships>"#;

    #[test]
    fn test_headers_and_footers() {
        let header = format!(r#"<w:hdr {}><w:p><w:r><w:t>Confidential</w:t></w:r></w:p></w:hdr>"#, W_NS);
        let footer = format!(r#"<w:ftr {}><w:p><w:r><w:t>Page</w:t></w:r></w:p></w:ftr>"#, W_NS);
        let container = container(&[
            ("word/_rels/document.xml.rels", RELS),
            ("word/header1.xml", header.as_str()),
            ("word/footer1.xml", footer.as_str()),
        ]);
        let options = DecodeOptions::default();
        let styles = StyleMap::default();
        let ctx = DecodeContext::new(&container, &options, &styles);
        let rels = Relationships::load(&container, "word/document.xml").unwrap();
        let sect_xml = format!(
            r#"<w:sectPr {}>
                <w:headerReference w:type="first" r:id="rId8"/>
                <w:headerReference w:type="default" r:id="rId10"/>
                <w:footerReference w:type="default" r:id="rId9"/>
                <w:footerReference w:type="even" r:id="rId77"/>
            </w:sectPr>"#,
            W_NS
        );
        let sect = crate::xml::parse_xml(&sect_xml).unwrap();

        let headers = parse_side(&ctx, sect.root(), &rels, "word/document.xml", Side::Header);
        assert_eq!(headers.len(), 1);
        match &headers[0] {
            Element::Header(h) => {
                assert_eq!(h.kind, HeaderFooterKind::First);
                assert_eq!(h.content[0].plain_text(), "Confidential");
            }
            other => panic!("expected header, got {:?}", other),
        }

        let footers = parse_side(&ctx, sect.root(), &rels, "word/document.xml", Side::Footer);
        assert_eq!(footers.len(), 1);
        assert_eq!(footers[0].plain_text(), "Page");
    }
}
