//! Image references in drawings and VML shapes.

use crate::container::OoxmlContainer;
use crate::error::Error;
use crate::model::Image;
use crate::options::DecodeOptions;
use crate::relationships::{kind, Relationships};
use crate::xml::{ns, Node};

/// Media root of the main document.
const MEDIA_ROOT: &str = "word/media/";

/// Resolves image references of one part and loads their payloads.
///
/// Every failure is confined to the image at hand: the image keeps its
/// reference data and simply lacks a payload.
pub struct ImageExtractor<'a> {
    container: &'a OoxmlContainer,
    rels: &'a Relationships,
    part_path: &'a str,
    options: &'a DecodeOptions,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(
        container: &'a OoxmlContainer,
        rels: &'a Relationships,
        part_path: &'a str,
        options: &'a DecodeOptions,
    ) -> Self {
        Self {
            container,
            rels,
            part_path,
            options,
        }
    }

    /// Image of a `w:drawing` element. Drawings without a picture fill
    /// (charts, shapes) yield nothing.
    pub fn from_drawing(&self, drawing: Node<'_>) -> Option<Image> {
        let blip = drawing.descendant(ns::A, "blip")?;
        let id = blip
            .attr(ns::R, "embed")
            .or_else(|| blip.attr(ns::R, "link"))?;

        let mut image = Image::new(id);
        if let Some(extent) = drawing.descendant(ns::WP, "extent") {
            let dimension = |local: &str| {
                extent
                    .plain_attr(local)
                    .and_then(|v| v.parse::<i64>().ok())
                    .filter(|v| *v > 0)
            };
            image.width = dimension("cx");
            image.height = dimension("cy");
        }
        if let Some(doc_pr) = drawing.descendant(ns::WP, "docPr") {
            let text = |local: &str| {
                doc_pr
                    .plain_attr(local)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };
            image.title = text("title").or_else(|| text("name"));
            image.description = text("descr");
        }

        self.load(&mut image);
        Some(image)
    }

    /// Image of a legacy `v:imagedata` element.
    pub fn from_vml(&self, imagedata: Node<'_>) -> Option<Image> {
        let id = imagedata.attr(ns::R, "id")?;
        let mut image = Image::new(id);
        image.title = imagedata
            .attr(ns::OFFICE, "title")
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self.load(&mut image);
        Some(image)
    }

    /// Resolve the relationship and, unless disabled, read the payload.
    fn load(&self, image: &mut Image) {
        let Some(rel) = self
            .rels
            .get_of_kind(&image.relationship_id, kind::IMAGE)
        else {
            log::warn!(
                "{}: {}",
                self.part_path,
                Error::ReferenceNotFound(image.relationship_id.clone())
            );
            return;
        };
        if rel.is_external() {
            log::debug!("{}: image {} is linked externally", self.part_path, rel.id);
            return;
        }

        let candidates = candidate_paths(self.part_path, &rel.target);

        if !self.options.extract_images {
            image.file_path = candidates
                .iter()
                .find(|p| self.container.exists(p))
                .cloned();
            return;
        }

        for path in &candidates {
            match self
                .container
                .read_binary_limited(path, self.options.max_image_size)
            {
                Ok(data) => {
                    image.set_payload(data);
                    image.file_path = Some(path.clone());
                    return;
                }
                Err(Error::ResourceNotFound(_)) => continue,
                Err(e) => {
                    image.file_path = Some(path.clone());
                    log::warn!("{}: skipping image {}: {}", self.part_path, rel.id, e);
                    return;
                }
            }
        }

        log::warn!(
            "{}: skipping image {}: {}",
            self.part_path,
            rel.id,
            Error::ResourceNotFound(rel.target.clone())
        );
    }
}

/// Archive paths where an image target may live, most likely first.
///
/// Producers disagree on how targets are written: relative to the part,
/// relative to `word/`, verbatim from the package root, or with a stray
/// `media/` prefix.
pub fn candidate_paths(part_path: &str, target: &str) -> Vec<String> {
    let bare = target.trim_start_matches('/');
    let mut paths = vec![
        OoxmlContainer::resolve_path(part_path, target),
        format!("word/{}", bare),
        bare.to_string(),
        format!(
            "{}{}",
            MEDIA_ROOT,
            bare.strip_prefix("word/")
                .unwrap_or(bare)
                .trim_start_matches("media/")
        ),
    ];
    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
    paths
}
