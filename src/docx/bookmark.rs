//! Bookmarks of the main body.

use crate::model::Bookmark;
use crate::xml::{ns, Node};

/// Every named bookmark under `body`, in document order.
///
/// The captured text is that of the runs following the start marker up to
/// its end marker, among the start marker's siblings. A start without a
/// matching end keeps no text.
pub fn parse_bookmarks(body: Node<'_>) -> Vec<Bookmark> {
    let ends = body.descendants_named(ns::W, "bookmarkEnd");

    body.descendants_named(ns::W, "bookmarkStart")
        .into_iter()
        .filter_map(|start| {
            let id = start.attr(ns::W, "id")?;
            let name = start.attr(ns::W, "name").filter(|n| !n.is_empty())?;
            let text = ends
                .iter()
                .find(|end| end.attr(ns::W, "id") == Some(id))
                .map(|end| text_between(start, *end));
            Some(Bookmark {
                id: id.to_string(),
                name: name.to_string(),
                text,
            })
        })
        .collect()
}

fn text_between(start: Node<'_>, end: Node<'_>) -> String {
    let mut text = String::new();
    for sibling in start.following_siblings() {
        if sibling == end {
            break;
        }
        if sibling.is(ns::W, "r") {
            for t in sibling.descendants_named(ns::W, "t") {
                text.push_str(&t.text());
            }
        }
    }
    text.trim().to_string()
}
