//! The [`Epub`] aggregate and its open pipeline.

mod chapters;
pub mod container;
mod cover;
pub mod package;
pub mod toc;
mod xml;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::book::{Item, ItemRef, Metadata, Ncx};
use crate::error::Result;
use crate::io::{Archive, normalize_separators, parent_dir, resolve_href};

pub use cover::COVER_IDS;
pub use toc::TocSource;

/// An opened EPUB: parsed package data plus the archive it came from.
///
/// Construction runs container → package → table of contents. If any stage
/// fails the partially built value, including the archive handle, is dropped
/// before the error is returned.
///
/// Queries that read archive entries take `&mut self`; the archive is owned
/// exclusively. [`close`](Epub::close) consumes the value, so nothing can be
/// read from a closed book.
///
/// # Example
///
/// ```no_run
/// use epubkit::{Epub, ReadOptions};
///
/// let mut book = Epub::open("book.epub")?;
/// println!("Title: {}", book.title());
/// for chapter in book.chapters(&ReadOptions::new())? {
///     println!("{}: {}", chapter.order, chapter.title);
/// }
/// book.close();
/// # Ok::<(), epubkit::Error>(())
/// ```
pub struct Epub<R = BufReader<File>> {
    archive: Archive<R>,
    root_file: String,
    metadata: Metadata,
    manifest: Vec<Item>,
    spine: Vec<ItemRef>,
    toc: Option<Ncx>,
    cover_id: Option<String>,
}

impl Epub<BufReader<File>> {
    /// Open an EPUB file from disk. The file is owned by the returned value.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Epub<R> {
    /// Open an EPUB from any [`Read`] + [`Seek`] source.
    ///
    /// Pass a borrowed source (`&File`, `&mut Cursor<Vec<u8>>`) to keep
    /// ownership of the underlying handle with the caller.
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::build(Archive::new(reader)?)
    }

    /// Open an EPUB from an already opened zip archive.
    pub fn from_archive(zip: ZipArchive<R>) -> Result<Self> {
        Self::build(Archive::from_zip(zip))
    }

    fn build(mut archive: Archive<R>) -> Result<Self> {
        let root_file = container::resolve(&mut archive)?;
        debug!(root_file = %root_file, "resolved package document");

        let package = package::load(&mut archive, &root_file)?;
        debug!(
            items = package.manifest.len(),
            spine = package.spine.len(),
            "parsed package document"
        );

        let toc = toc::resolve(&mut archive, &root_file, &package.manifest)?;

        Ok(Self {
            archive,
            root_file,
            metadata: package.metadata,
            manifest: package.manifest,
            spine: package.spine,
            toc,
            cover_id: package.cover_id,
        })
    }

    /// Book title, empty when the package declares none.
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Last `dc:creator`, empty when absent.
    pub fn author(&self) -> &str {
        &self.metadata.creator
    }

    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Manifest items in document order.
    pub fn items(&self) -> &[Item] {
        &self.manifest
    }

    /// Spine entries in reading order.
    pub fn spine(&self) -> &[ItemRef] {
        &self.spine
    }

    /// The NCX table of contents, if the book has one.
    pub fn toc(&self) -> Option<&Ncx> {
        self.toc.as_ref()
    }

    /// Which table of contents the manifest declares.
    pub fn toc_source(&self) -> Option<TocSource<'_>> {
        TocSource::locate(&self.manifest)
    }

    /// Archive path of the package document.
    pub fn root_file(&self) -> &str {
        &self.root_file
    }

    /// First manifest item with the given id.
    pub fn item_by_id(&self, id: &str) -> Option<&Item> {
        self.manifest.iter().find(|item| item.id == id)
    }

    /// First manifest item whose href matches, comparing normalized separators.
    pub fn item_by_href(&self, href: &str) -> Option<&Item> {
        let wanted = normalize_separators(href);
        self.manifest
            .iter()
            .find(|item| normalize_separators(&item.href) == wanted)
    }

    /// Archive path of a manifest href (resolved against the package directory).
    pub fn resolve_href(&self, href: &str) -> String {
        resolve_href(parent_dir(&self.root_file), href)
    }

    /// Names of all archive entries, in archive order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.archive.entry_names()
    }

    /// Stream any archive entry by its path from the archive root.
    pub fn file_reader<'a>(&'a mut self, path: &str) -> Result<impl Read + use<'a, R>> {
        self.archive.open_entry(path)
    }

    /// Read any archive entry by its path from the archive root.
    pub fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        self.archive.read_bytes(path)
    }

    /// Release the archive.
    pub fn close(self) {
        debug!(root_file = %self.root_file, "closing EPUB");
    }

    /// Release the parsed data and hand back the zip archive.
    pub fn into_archive(self) -> ZipArchive<R> {
        self.archive.into_zip()
    }
}
