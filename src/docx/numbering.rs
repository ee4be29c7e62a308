//! DOCX numbering (list) parsing.

use crate::model::{AbstractFormat, LevelFormat, ListInfo, NumberingDefinition};
use crate::xml::{ns, Node, XmlDocument};
use std::collections::HashMap;

/// Parse `word/numbering.xml` into a resolved [`NumberingDefinition`].
///
/// Abstract formats are read first, then every format that came out empty
/// but names a list style (`w:styleLink`, else `w:numStyleLink`) borrows the
/// levels of another format that publishes that name through its own
/// `w:styleLink`.
pub fn parse_numbering(doc: &XmlDocument) -> NumberingDefinition {
    let root = doc.root();
    let mut def = NumberingDefinition::default();

    for node in root.children_named(ns::W, "abstractNum") {
        let id = match node.attr(ns::W, "abstractNumId") {
            Some(id) if !id.is_empty() => id,
            _ => continue,
        };
        def.abstract_formats
            .insert(id.to_string(), parse_abstract(node));
    }

    for node in root.children_named(ns::W, "num") {
        let num_id = node.attr(ns::W, "numId");
        let abstract_id = node
            .child(ns::W, "abstractNumId")
            .and_then(|a| a.attr(ns::W, "val"));
        if let (Some(num_id), Some(abstract_id)) = (num_id, abstract_id) {
            def.instances
                .insert(num_id.to_string(), abstract_id.to_string());
        }
    }

    resolve_style_links(&mut def);
    def
}

fn parse_abstract(node: Node<'_>) -> AbstractFormat {
    let val = |local: &str| {
        node.child(ns::W, local)
            .and_then(|n| n.attr(ns::W, "val"))
            .map(str::to_string)
    };

    let mut format = AbstractFormat {
        style_link: val("styleLink"),
        num_style_link: val("numStyleLink"),
        ..Default::default()
    };

    for lvl in node.children_named(ns::W, "lvl") {
        let Some(index) = lvl.attr(ns::W, "ilvl").and_then(|v| v.parse::<u8>().ok()) else {
            continue;
        };
        let lvl_val = |local: &str| {
            lvl.child(ns::W, local)
                .and_then(|n| n.attr(ns::W, "val"))
        };
        format.levels.insert(
            index,
            LevelFormat {
                number_format: lvl_val("numFmt")
                    .unwrap_or(LevelFormat::DEFAULT_FORMAT)
                    .to_string(),
                level_text: lvl_val("lvlText")
                    .unwrap_or(LevelFormat::DEFAULT_TEXT)
                    .to_string(),
                start: lvl_val("start").and_then(|v| v.parse().ok()),
            },
        );
    }

    format
}

/// Copy levels into formats that only alias a named list style.
fn resolve_style_links(def: &mut NumberingDefinition) {
    let pending: Vec<(String, String)> = def
        .abstract_formats
        .iter()
        .filter(|(_, f)| f.levels.is_empty())
        .filter_map(|(id, f)| {
            f.style_link
                .as_ref()
                .or(f.num_style_link.as_ref())
                .map(|link| (id.clone(), link.clone()))
        })
        .collect();

    for (id, link) in pending {
        let source = def
            .abstract_formats
            .iter()
            .find(|(other_id, f)| {
                **other_id != id
                    && f.style_link.as_deref() == Some(link.as_str())
                    && !f.levels.is_empty()
            })
            .map(|(_, f)| f.levels.clone());

        match source {
            Some(levels) => {
                if let Some(format) = def.abstract_formats.get_mut(&id) {
                    format.levels = levels;
                }
            }
            None => log::warn!(
                "numbering: abstract format {} links to list style {:?} which has no levels",
                id,
                link
            ),
        }
    }
}

/// Running item numbers for one part's lists.
///
/// Counts per list instance and level. Advancing a level restarts every
/// deeper level of the same instance.
#[derive(Debug, Default)]
pub struct ListCounters {
    counters: HashMap<(String, u8), u32>,
}

impl ListCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// List info for a paragraph, advancing the counter of its level.
    pub fn next(
        &mut self,
        numbering: &NumberingDefinition,
        num_id: &str,
        level: u8,
    ) -> Option<ListInfo> {
        let format = numbering.level(num_id, level)?;
        let start = format.start.unwrap_or(1);

        let key = (num_id.to_string(), level);
        let number = match self.counters.get(&key) {
            Some(current) => current + 1,
            None => start,
        };
        self.counters.insert(key, number);
        self.counters
            .retain(|(id, lvl), _| id != num_id || *lvl <= level);

        Some(ListInfo {
            num_id: num_id.to_string(),
            level,
            list_type: format.list_type(),
            level_text: format.level_text.clone(),
            number_format: format.number_format.clone(),
            number: Some(number),
        })
    }

    /// Reset counters (e.g., at the start of another part).
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}
