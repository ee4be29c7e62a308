//! Navigable, namespace-aware XML trees for package parts.
//!
//! Parts are parsed with `roxmltree` and walked through cheap [`Node`]
//! handles. Lookups are namespace-first: an element or attribute matches
//! when its resolved namespace equals the requested one. When nothing
//! matches, the lookup falls back to unqualified nodes with the same local
//! name, which some producers emit inside otherwise namespaced parts.

use crate::error::Result;

/// Namespace URIs used across WordprocessingML packages.
pub mod ns {
    /// WordprocessingML main namespace (`w:`).
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    /// Office document relationships (`r:`).
    pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// Package relationship manifests.
    pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    /// Word drawing placement (`wp:`).
    pub const WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
    /// DrawingML main (`a:`).
    pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    /// Legacy VML (`v:`).
    pub const VML: &str = "urn:schemas-microsoft-com:vml";
    /// Legacy VML office extensions (`o:`).
    pub const OFFICE: &str = "urn:schemas-microsoft-com:office:office";
    /// Core properties (`cp:`).
    pub const CP: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
    /// Dublin Core elements (`dc:`).
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// Dublin Core terms (`dcterms:`).
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    /// Extended (application) properties.
    pub const EXT_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
}

/// Capability to turn XML text into a navigable tree.
///
/// Decoding logic only depends on this trait, so the backing parser can be
/// swapped without touching the part parsers. The tree borrows the text it
/// was parsed from.
pub trait XmlTreeParser {
    /// Parse `text` into a tree, failing with [`crate::Error::XmlParse`] on malformed input.
    fn parse<'input>(&self, text: &'input str) -> Result<XmlDocument<'input>>;
}

/// [`XmlTreeParser`] backed by `roxmltree`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoxmlTreeParser;

impl XmlTreeParser for RoxmlTreeParser {
    fn parse<'input>(&self, text: &'input str) -> Result<XmlDocument<'input>> {
        let inner = roxmltree::Document::parse(text)?;
        Ok(XmlDocument { inner })
    }
}

/// Parse XML text with the default parser.
pub fn parse_xml(text: &str) -> Result<XmlDocument<'_>> {
    RoxmlTreeParser.parse(text)
}

/// A parsed XML part.
#[derive(Debug)]
pub struct XmlDocument<'input> {
    inner: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    /// The document element.
    pub fn root(&self) -> Node<'_> {
        Node(self.inner.root_element())
    }

    /// Number of element and text nodes below the document root.
    pub fn len(&self) -> usize {
        self.inner
            .root()
            .descendants()
            .filter(|n| n.is_element() || n.is_text())
            .count()
    }

    /// A parsed document always has a root element, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A handle to one node of an [`XmlDocument`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a>(roxmltree::Node<'a, 'a>);

impl<'a> Node<'a> {
    /// Whether this node is an element (as opposed to character data).
    pub fn is_element(&self) -> bool {
        self.0.is_element()
    }

    /// Local (unprefixed) element name; empty for text nodes.
    pub fn local_name(&self) -> &'a str {
        if self.0.is_element() {
            self.0.tag_name().name()
        } else {
            ""
        }
    }

    /// Resolved namespace URI of an element, if it has one.
    pub fn namespace(&self) -> Option<&'a str> {
        self.0.tag_name().namespace()
    }

    /// Character data of a text node.
    pub fn text_value(&self) -> Option<&'a str> {
        if self.0.is_text() {
            self.0.text()
        } else {
            None
        }
    }

    /// Exact match on namespace and local name.
    pub fn has_name(&self, namespace: &str, local: &str) -> bool {
        self.is_element() && self.local_name() == local && self.namespace() == Some(namespace)
    }

    /// Match on namespace and local name, also accepting an unqualified
    /// element with the same local name.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.is_element()
            && self.local_name() == local
            && self.namespace().is_none_or(|n| n == namespace)
    }

    fn is_unqualified(&self, local: &str) -> bool {
        self.is_element() && self.namespace().is_none() && self.local_name() == local
    }

    /// Parent node.
    pub fn parent(&self) -> Option<Node<'a>> {
        self.0.parent().map(Node)
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.0.children().filter(|n| n.is_element()).map(Node)
    }

    /// First child element with the given name.
    pub fn child(&self, namespace: &str, local: &str) -> Option<Node<'a>> {
        self.children()
            .find(|n| n.has_name(namespace, local))
            .or_else(|| self.children().find(|n| n.is_unqualified(local)))
    }

    /// All child elements with the given name.
    pub fn children_named(&self, namespace: &str, local: &str) -> Vec<Node<'a>> {
        let exact: Vec<Node<'a>> = self
            .children()
            .filter(|n| n.has_name(namespace, local))
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        self.children().filter(|n| n.is_unqualified(local)).collect()
    }

    /// Descendant elements in document order, excluding this node.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.0
            .descendants()
            .skip(1)
            .filter(|n| n.is_element())
            .map(Node)
    }

    /// First descendant element with the given name.
    pub fn descendant(&self, namespace: &str, local: &str) -> Option<Node<'a>> {
        self.descendants()
            .find(|n| n.has_name(namespace, local))
            .or_else(|| self.descendants().find(|n| n.is_unqualified(local)))
    }

    /// All descendant elements with the given name, in document order.
    pub fn descendants_named(&self, namespace: &str, local: &str) -> Vec<Node<'a>> {
        let exact: Vec<Node<'a>> = self
            .descendants()
            .filter(|n| n.has_name(namespace, local))
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        self.descendants()
            .filter(|n| n.is_unqualified(local))
            .collect()
    }

    /// Following sibling nodes (text included), nearest first.
    pub fn following_siblings(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.0
            .next_siblings()
            .skip(1)
            .filter(|n| n.is_element() || n.is_text())
            .map(Node)
    }

    /// Namespaced attribute value, falling back to the unprefixed attribute
    /// with the same local name.
    pub fn attr(&self, namespace: &str, local: &str) -> Option<&'a str> {
        self.0
            .attribute((namespace, local))
            .or_else(|| self.0.attribute(local))
    }

    /// Unprefixed attribute value (e.g. `Id` in a relationship manifest).
    pub fn plain_attr(&self, name: &str) -> Option<&'a str> {
        self.0.attribute(name)
    }

    /// Concatenated character data of this node and all its descendants.
    pub fn text(&self) -> String {
        self.0
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect()
    }
}

/// Declare the `w:` and `r:` prefixes on the first tag of a fragment.
#[cfg(test)]
pub(crate) fn with_ns(fragment: &str) -> String {
    let decl = format!(r#" xmlns:w="{}" xmlns:r="{}""#, ns::W, ns::R);
    let end = fragment
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_whitespace() || *c == '>' || *c == '/')
        .map_or(fragment.len(), |(i, _)| i);
    format!("{}{}{}", &fragment[..end], decl, &fragment[end..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>&amp; world</w:t></w:r></w:p>
    <w:p w:rsidR="00AB"><w:pPr><w:jc w:val="center"/></w:pPr></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_namespaced_lookup() {
        let doc = parse_xml(SAMPLE).unwrap();
        let root = doc.root();
        assert!(root.has_name(ns::W, "document"));

        let body = root.child(ns::W, "body").unwrap();
        let paragraphs = body.children_named(ns::W, "p");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text(), "Hello & world");

        let jc = paragraphs[1].descendant(ns::W, "jc").unwrap();
        assert_eq!(jc.attr(ns::W, "val"), Some("center"));
        assert_eq!(paragraphs[1].attr(ns::W, "rsidR"), Some("00AB"));
        assert_eq!(jc.parent().and_then(|p| p.parent()), Some(paragraphs[1]));
    }

    #[test]
    fn test_unqualified_fallback() {
        let xml = format!(
            r#"<w:p xmlns:w="{}"><r><t>bare</t></r><w:pPr><jc val="right"/></w:pPr></w:p>"#,
            ns::W
        );
        let doc = parse_xml(&xml).unwrap();
        let p = doc.root();
        assert!(p.has_name(ns::W, "p"));

        let run = p.child(ns::W, "r").unwrap();
        assert!(run.namespace().is_none());
        assert!(run.is(ns::W, "r"));
        assert!(!run.has_name(ns::W, "r"));
        assert_eq!(run.text(), "bare");
        let jc = p.descendant(ns::W, "jc").unwrap();
        assert_eq!(jc.attr(ns::W, "val"), Some("right"));
    }

    #[test]
    fn test_fragment_declarations() {
        let xml = with_ns(r#"<w:shd w:fill="FF0000"/>"#);
        let doc = parse_xml(&xml).unwrap();
        assert!(doc.root().has_name(ns::W, "shd"));
        assert_eq!(doc.root().attr(ns::W, "fill"), Some("FF0000"));
        assert!(with_ns("<w:rPr>").starts_with("<w:rPr xmlns:w="));
    }

    #[test]
    fn test_following_siblings() {
        let doc = parse_xml("<a><b/>text<c/><d/></a>").unwrap();
        let b = doc.root().children().next().unwrap();
        let names: Vec<&str> = b
            .following_siblings()
            .filter(|n| n.is_element())
            .map(|n| n.local_name())
            .collect();
        assert_eq!(names, vec!["c", "d"]);
        assert_eq!(b.following_siblings().count(), 3);
        let text = b.following_siblings().next().unwrap();
        assert_eq!(text.text_value(), Some("text"));
    }

    #[test]
    fn test_descendants_preorder() {
        let doc = parse_xml("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<&str> = doc.root().descendants().map(|n| n.local_name()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = parse_xml("<a><b></a>").unwrap_err();
        assert!(matches!(err, Error::XmlParse { .. }));

        match parse_xml("<a>\n<b>").unwrap_err() {
            Error::XmlParse { line, message, .. } => {
                assert!(line >= 1);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(parse_xml("   ").is_err());
        assert!(parse_xml("<w:p/>").is_err());
    }

    #[test]
    fn test_cdata_and_entities() {
        let doc = parse_xml("<a><![CDATA[x < y]]> &lt;z&gt;</a>").unwrap();
        assert_eq!(doc.root().text(), "x < y <z>");
    }
}
