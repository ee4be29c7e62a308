//! Document properties (`docProps/core.xml`, `docProps/app.xml`).

use crate::model::Metadata;
use crate::xml::{ns, Node, XmlDocument};

pub const CORE_PART: &str = "docProps/core.xml";
pub const APP_PART: &str = "docProps/app.xml";

fn text_of(root: Node<'_>, namespace: &str, local: &str) -> Option<String> {
    root.child(namespace, local)
        .map(|n| n.text().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Fill core properties into `meta`. Keywords are split on `,` and `;`.
pub fn apply_core(meta: &mut Metadata, doc: &XmlDocument) {
    let root = doc.root();
    meta.title = text_of(root, ns::DC, "title");
    meta.creator = text_of(root, ns::DC, "creator");
    meta.subject = text_of(root, ns::DC, "subject");
    meta.description = text_of(root, ns::DC, "description");
    meta.language = text_of(root, ns::DC, "language");
    meta.created = text_of(root, ns::DCTERMS, "created");
    meta.modified = text_of(root, ns::DCTERMS, "modified");
    meta.last_modified_by = text_of(root, ns::CP, "lastModifiedBy");
    meta.revision = text_of(root, ns::CP, "revision");
    meta.keywords = text_of(root, ns::CP, "keywords")
        .map(|k| {
            k.split([',', ';'])
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
}

/// Fill application properties (producer, page count) into `meta`.
pub fn apply_app(meta: &mut Metadata, doc: &XmlDocument) {
    let root = doc.root();
    meta.application = text_of(root, ns::EXT_PROPS, "Application");
    meta.page_count = text_of(root, ns::EXT_PROPS, "Pages").and_then(|p| p.parse().ok());
}
