use std::io::{Read, Seek};

use percent_encoding::percent_decode_str;
use zip::ZipArchive;
use zip::result::ZipError;

use super::path::normalize_separators;
use crate::error::{Error, Result};

/// Name-based access to the entries of an opened zip container.
///
/// Lookups are case-sensitive. A name is resolved by exact match first, then
/// by a linear scan comparing separator-normalized entry names, and finally
/// by retrying with the percent-decoded name (handles malformed EPUBs whose
/// hrefs are URL-encoded but whose entries are not).
pub struct Archive<R> {
    zip: ZipArchive<R>,
}

impl<R: Read + Seek> Archive<R> {
    /// Read the zip central directory from `reader`.
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self::from_zip(ZipArchive::new(reader)?))
    }

    pub fn from_zip(zip: ZipArchive<R>) -> Self {
        Self { zip }
    }

    /// Give the underlying zip archive back.
    pub fn into_zip(self) -> ZipArchive<R> {
        self.zip
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.is_empty()
    }

    /// Entry names in central-directory order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        (0..self.zip.len()).filter_map(|i| self.zip.name_for_index(i))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Read a whole entry into memory.
    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut entry = self.open_entry(path)?;
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Open a decompressing stream over an entry.
    ///
    /// The stream borrows the archive; drop it to release the entry.
    pub fn open_entry<'a>(&'a mut self, path: &str) -> Result<impl Read + use<'a, R>> {
        let index = self
            .find(path)
            .ok_or_else(|| Error::NotFound(format!("file not found in archive: {path}")))?;

        match self.zip.by_index(index) {
            Ok(entry) => Ok(entry),
            Err(ZipError::FileNotFound) => {
                Err(Error::NotFound(format!("file not found in archive: {path}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find(&self, path: &str) -> Option<usize> {
        let wanted = normalize_separators(path);

        if let Some(index) = self.zip.index_for_name(&wanted) {
            return Some(index);
        }

        if let Some(index) = self.scan(&wanted) {
            return Some(index);
        }

        let decoded = percent_decode_str(&wanted).decode_utf8().ok()?;
        if decoded == wanted {
            return None;
        }
        self.zip
            .index_for_name(&decoded)
            .or_else(|| self.scan(&decoded))
    }

    fn scan(&self, wanted: &str) -> Option<usize> {
        (0..self.zip.len()).find(|&i| {
            self.zip
                .name_for_index(i)
                .is_some_and(|name| normalize_separators(name) == wanted)
        })
    }
}
