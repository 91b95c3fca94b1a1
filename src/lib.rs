//! # epubkit
//!
//! A small, synchronous EPUB reader: open a zip container, resolve its package
//! document, and query metadata, manifest, spine, table of contents, chapters
//! and cover image.
//!
//! ## Features
//!
//! - EPUB 2 and EPUB 3 package documents
//! - NCX table of contents (EPUB 3 navigation documents are detected only)
//! - Chapter extraction in spine order with filters, size limits and
//!   cooperative cancellation
//! - Raw access to any archive entry
//!
//! ## Quick Start
//!
//! ```no_run
//! use epubkit::{Deadline, Epub, ReadOptions};
//! use std::time::Duration;
//!
//! let mut book = Epub::open("input.epub")?;
//! println!("{} by {}", book.title(), book.author());
//!
//! let deadline = Deadline::after(Duration::from_secs(5));
//! let options = ReadOptions::new()
//!     .with_cancel(&deadline)
//!     .with_max_content_length(1 << 20);
//!
//! for chapter in book.chapters(&options)? {
//!     println!("{:>3}. {} ({} bytes)", chapter.order, chapter.title, chapter.content.len());
//! }
//!
//! if let Some(mut cover) = book.cover()? {
//!     let mut out = std::fs::File::create("cover.img")?;
//!     std::io::copy(&mut cover, &mut out)?;
//! }
//! # Ok::<(), epubkit::Error>(())
//! ```
//!
//! ## Working with the Model
//!
//! Parsed data is exposed as plain structs:
//!
//! ```
//! use epubkit::{Metadata, NavPoint};
//!
//! let metadata = Metadata::new("My Book")
//!     .with_creator("Author Name")
//!     .with_language("en");
//! assert_eq!(metadata.creator, "Author Name");
//!
//! let part = NavPoint::new("Part I", "part1.xhtml")
//!     .with_child(NavPoint::new("Chapter 1", "ch1.xhtml"));
//! assert_eq!(part.node_count(), 2);
//! ```

pub mod book;
pub mod epub;
pub mod error;
pub mod io;
pub mod options;
pub mod util;

pub use book::{Chapter, Item, ItemRef, Metadata, NavPoint, Ncx};
pub use epub::{COVER_IDS, Epub, TocSource};
pub use error::{Error, Result};
pub use options::{CancelFlag, CancelToken, Deadline, NeverCancel, ReadOptions};
pub use util::ImageFormat;
