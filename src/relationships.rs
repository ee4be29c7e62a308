//! Relationship manifests (`*.rels` parts).
//!
//! A manifest maps relationship ids to targets. Parts refer to images,
//! hyperlinks, headers and notes by id; the maps built here resolve them.

use crate::container::OoxmlContainer;
use crate::error::Result;
use crate::xml::{ns, XmlDocument};
use std::collections::HashMap;

/// Type URI suffixes of the relationship kinds the decoder resolves.
pub mod kind {
    pub const HYPERLINK: &str = "/hyperlink";
    pub const IMAGE: &str = "/image";
    pub const HEADER: &str = "/header";
    pub const FOOTER: &str = "/footer";
    pub const FOOTNOTES: &str = "/footnotes";
    pub const ENDNOTES: &str = "/endnotes";
    pub const NUMBERING: &str = "/numbering";
    pub const STYLES: &str = "/styles";
    pub const THEME: &str = "/theme";
}

/// A relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute) or URL
    pub target: String,
    /// `TargetMode` attribute, if written
    pub target_mode: Option<String>,
}

impl Relationship {
    /// Whether the target lies outside the package (e.g., a web URL).
    pub fn is_external(&self) -> bool {
        self.target_mode.as_deref() == Some("External")
    }

    /// Whether the relationship type ends with the given kind suffix.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.rel_type.ends_with(kind)
    }
}

/// Collection of relationships parsed from a .rels file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Map from relationship ID to relationship data
    pub by_id: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed manifest. Entries without `Id` or `Target` are
    /// dropped.
    pub fn parse(doc: &XmlDocument) -> Self {
        let mut rels = Relationships::new();
        for node in doc.root().children_named(ns::PKG_REL, "Relationship") {
            let (Some(id), Some(target)) = (node.plain_attr("Id"), node.plain_attr("Target"))
            else {
                continue;
            };
            rels.add(Relationship {
                id: id.to_string(),
                rel_type: node.plain_attr("Type").unwrap_or_default().to_string(),
                target: target.to_string(),
                target_mode: node.plain_attr("TargetMode").map(str::to_string),
            });
        }
        rels
    }

    /// Load the manifest belonging to `part_path`.
    ///
    /// A missing manifest is an empty collection; a malformed one is an
    /// error for the caller to absorb.
    pub fn load(container: &OoxmlContainer, part_path: &str) -> Result<Self> {
        let rels_path = OoxmlContainer::rels_path_for(part_path);
        match container.read_xml_optional(&rels_path)? {
            Some(xml) => {
                let doc = crate::xml::parse_xml(&xml).map_err(|e| e.in_part(&rels_path))?;
                Ok(Self::parse(&doc))
            }
            None => Ok(Self::new()),
        }
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// Get a relationship by ID only if it has the given kind.
    pub fn get_of_kind(&self, id: &str, kind: &str) -> Option<&Relationship> {
        self.get(id).filter(|r| r.is_kind(kind))
    }

    /// All relationships of one kind.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.by_id.values().filter(move |r| r.is_kind(kind))
    }

    /// The id → target map for hyperlink relationships.
    pub fn hyperlink_targets(&self) -> HashMap<String, String> {
        self.targets_of(kind::HYPERLINK)
    }

    /// The id → target map for image relationships.
    pub fn image_targets(&self) -> HashMap<String, String> {
        self.targets_of(kind::IMAGE)
    }

    fn targets_of(&self, kind: &str) -> HashMap<String, String> {
        self.of_kind(kind)
            .map(|r| (r.id.clone(), r.target.clone()))
            .collect()
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
