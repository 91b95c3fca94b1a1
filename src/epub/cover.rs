//! Cover image lookup.

use std::io::{Read, Seek};

use tracing::debug;

use super::Epub;
use crate::book::Item;
use crate::error::Result;
use crate::util::ImageFormat;

/// Manifest ids tried, in order, before any package-level cover hint.
pub const COVER_IDS: [&str; 3] = ["cover", "cover-image", "cover-img"];

fn is_image(item: &Item) -> bool {
    item.media_type.starts_with("image/") || ImageFormat::from_path(&item.href).is_some()
}

impl<R: Read + Seek> Epub<R> {
    /// The manifest item used as cover, without opening it.
    ///
    /// Tries the conventional ids in [`COVER_IDS`], then the
    /// `<meta name="cover">` target, then the item with the `cover-image`
    /// property. A candidate counts only if it looks like an image.
    pub fn cover_item(&self) -> Option<&Item> {
        COVER_IDS
            .iter()
            .filter_map(|id| self.item_by_id(id))
            .find(|item| is_image(item))
            .or_else(|| {
                self.cover_id
                    .as_deref()
                    .and_then(|id| self.item_by_id(id))
                    .filter(|item| is_image(item))
            })
            .or_else(|| {
                self.manifest
                    .iter()
                    .find(|item| item.has_property("cover-image") && is_image(item))
            })
    }

    /// Media type of the cover image.
    ///
    /// The declared type when it is an `image/` type, otherwise the type
    /// implied by the href's extension.
    pub fn cover_media_type(&self) -> Option<&str> {
        let item = self.cover_item()?;
        if item.media_type.starts_with("image/") {
            Some(item.media_type.as_str())
        } else {
            ImageFormat::from_path(&item.href).map(ImageFormat::mime_type)
        }
    }

    /// Stream the cover image, or `None` when the book declares no cover.
    ///
    /// The href is looked up relative to the package directory first, then
    /// from the archive root. A declared cover missing from both places is an
    /// error.
    pub fn cover<'a>(&'a mut self) -> Result<Option<impl Read + use<'a, R>>> {
        let Some(item) = self.cover_item() else {
            debug!("no cover image declared");
            return Ok(None);
        };

        let resolved = self.resolve_href(&item.href);
        let path = if self.archive.contains(&resolved) || !self.archive.contains(&item.href) {
            resolved
        } else {
            item.href.clone()
        };

        debug!(path = %path, "opening cover image");
        self.archive.open_entry(&path).map(Some)
    }
}
