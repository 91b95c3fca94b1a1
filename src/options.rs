//! Per-call options for chapter queries.
//!
//! A [`ReadOptions`] value starts from defaults and is adjusted by chained
//! `with_*` calls, applied in order (a later call overrides an earlier one):
//!
//! ```
//! use epubkit::{CancelFlag, ReadOptions};
//!
//! let flag = CancelFlag::new();
//! let options = ReadOptions::new()
//!     .with_cancel(&flag)
//!     .with_max_content_length(64 * 1024)
//!     .with_chapter_filter(|chapter| !chapter.content.is_empty());
//! assert_eq!(options.max_content_length(), 64 * 1024);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::book::Chapter;
use crate::error::{Error, Result};

/// Cooperative cancellation signal polled by long-running queries.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

/// Token that never fires. The default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Shared flag that can be fired from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl CancelToken for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Fires once its instant has passed.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }
}

impl CancelToken for Deadline {
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.0
    }
}

type ChapterFilter<'a> = Box<dyn Fn(&Chapter) -> bool + 'a>;

/// Options for [`Epub::chapters`](crate::Epub::chapters) and the
/// single-chapter queries.
pub struct ReadOptions<'a> {
    cancel: &'a dyn CancelToken,
    include_cover: bool,
    include_metadata: bool,
    chapter_filter: Option<ChapterFilter<'a>>,
    max_content_length: u64,
}

impl Default for ReadOptions<'_> {
    fn default() -> Self {
        Self {
            cancel: &NeverCancel,
            include_cover: false,
            include_metadata: false,
            chapter_filter: None,
            max_content_length: 0,
        }
    }
}

impl fmt::Debug for ReadOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("include_cover", &self.include_cover)
            .field("include_metadata", &self.include_metadata)
            .field("chapter_filter", &self.chapter_filter.is_some())
            .field("max_content_length", &self.max_content_length)
            .finish()
    }
}

impl<'a> ReadOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, cancel: &'a dyn CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reserved: no query reads this flag yet.
    pub fn with_cover(mut self) -> Self {
        self.include_cover = true;
        self
    }

    /// Reserved: no query reads this flag yet.
    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }

    /// Keep only chapters for which `filter` returns true.
    pub fn with_chapter_filter(mut self, filter: impl Fn(&Chapter) -> bool + 'a) -> Self {
        self.chapter_filter = Some(Box::new(filter));
        self
    }

    /// Limit chapter content to `max` bytes. `0` means unlimited.
    pub fn with_max_content_length(mut self, max: u64) -> Self {
        self.max_content_length = max;
        self
    }

    pub fn include_cover(&self) -> bool {
        self.include_cover
    }

    pub fn include_metadata(&self) -> bool {
        self.include_metadata
    }

    pub fn max_content_length(&self) -> u64 {
        self.max_content_length
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// True when a limit is set and `len` exceeds it.
    pub(crate) fn exceeds_limit(&self, len: u64) -> bool {
        self.max_content_length > 0 && len > self.max_content_length
    }

    pub(crate) fn accepts(&self, chapter: &Chapter) -> bool {
        self.chapter_filter
            .as_ref()
            .is_none_or(|filter| filter(chapter))
    }
}
