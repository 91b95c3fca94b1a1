//! Chapter extraction: walking the spine against the manifest.

use std::io::{Cursor, Read, Seek};

use tracing::{debug, trace, warn};

use super::Epub;
use crate::book::{Chapter, Item};
use crate::error::{Error, Result};
use crate::options::ReadOptions;
use crate::util::decode_text;

/// The cancel token is polled every this many spine entries.
const CANCEL_CHECK_STRIDE: usize = 5;

impl<R: Read + Seek> Epub<R> {
    /// Materialize the HTML documents of the spine as chapters, in reading order.
    ///
    /// Spine entries whose item is missing, not HTML, unreadable, over the
    /// content limit, or rejected by the chapter filter are skipped. Each
    /// chapter's `order` is its 1-based spine position, so skipped entries
    /// leave gaps.
    ///
    /// Titles come from the NCX by position: spine entry `i` takes the label
    /// of top-level nav point `i`, falling back to `"Chapter {i + 1}"`. This
    /// mislabels books whose TOC is nested or ordered differently from the
    /// spine.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] if the cancel token fires before or during the
    /// walk; chapters gathered so far are discarded.
    pub fn chapters(&mut self, options: &ReadOptions<'_>) -> Result<Vec<Chapter>> {
        options.check_cancelled()?;

        let mut chapters = Vec::new();

        for (i, itemref) in self.spine.iter().enumerate() {
            if i % CANCEL_CHECK_STRIDE == 0 && options.is_cancelled() {
                debug!(index = i, "chapter extraction cancelled");
                return Err(Error::Cancelled);
            }

            let idref = &itemref.idref;
            let Some(item) = self.item_by_id(idref) else {
                trace!(index = i, idref = %idref, "spine entry has no manifest item");
                continue;
            };

            if !item.is_html() {
                trace!(index = i, media_type = %item.media_type, "skipping non-HTML spine entry");
                continue;
            }

            let path = self.resolve_href(&item.href);
            let content = match self.archive.read_bytes(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path, error = %e, "skipping unreadable chapter");
                    continue;
                }
            };

            if options.exceeds_limit(content.len() as u64) {
                trace!(path = %path, len = content.len(), "skipping chapter over content limit");
                continue;
            }

            let chapter = Chapter {
                title: self.positional_title(i),
                content: decode_text(&content).into_owned(),
                order: i + 1,
                path,
            };

            if !options.accepts(&chapter) {
                trace!(order = chapter.order, "chapter rejected by filter");
                continue;
            }

            chapters.push(chapter);
        }

        Ok(chapters)
    }

    /// Content of the spine entry at `index` (0-based) as text.
    ///
    /// Unlike [`chapters`](Epub::chapters), every problem is reported:
    /// [`Error::OutOfRange`], [`Error::NotFound`] for a dangling idref,
    /// [`Error::UnsupportedContent`] for non-HTML items, archive errors, and
    /// [`Error::ContentTooLarge`] when the content limit is exceeded.
    pub fn chapter_content(&mut self, index: usize, options: &ReadOptions<'_>) -> Result<String> {
        let bytes = self.chapter_bytes(index, options)?;
        Ok(decode_text(&bytes).into_owned())
    }

    /// Like [`chapter_content`](Epub::chapter_content), as an in-memory reader
    /// over the raw bytes.
    pub fn chapter_reader(
        &mut self,
        index: usize,
        options: &ReadOptions<'_>,
    ) -> Result<Cursor<Vec<u8>>> {
        self.chapter_bytes(index, options).map(Cursor::new)
    }

    fn chapter_bytes(&mut self, index: usize, options: &ReadOptions<'_>) -> Result<Vec<u8>> {
        options.check_cancelled()?;

        let item = self.spine_item(index)?;
        if !item.is_html() {
            return Err(Error::UnsupportedContent {
                id: item.id.clone(),
                media_type: item.media_type.clone(),
            });
        }

        let path = self.resolve_href(&item.href);
        let content = self.archive.read_bytes(&path)?;

        let len = content.len() as u64;
        if options.exceeds_limit(len) {
            return Err(Error::ContentTooLarge {
                len,
                max: options.max_content_length(),
            });
        }

        Ok(content)
    }

    /// Manifest item referenced by spine entry `index`.
    fn spine_item(&self, index: usize) -> Result<&Item> {
        let itemref = self.spine.get(index).ok_or(Error::OutOfRange {
            index,
            len: self.spine.len(),
        })?;

        self.item_by_id(&itemref.idref)
            .ok_or_else(|| Error::NotFound(format!("manifest item '{}'", itemref.idref)))
    }

    fn positional_title(&self, index: usize) -> String {
        self.toc
            .as_ref()
            .and_then(|toc| toc.nav_map.get(index))
            .map(|point| point.label.clone())
            .unwrap_or_else(|| format!("Chapter {}", index + 1))
    }
}
