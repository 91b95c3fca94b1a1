//! Error types for epubkit operations.

use thiserror::Error;

/// Errors that can occur while opening or querying an EPUB.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A required archive entry, manifest item or rootfile is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed XML in the container, package document or NCX.
    #[error("malformed XML in {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("chapter index {index} out of range (spine has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    /// The spine entry resolved to an item that is not an HTML document.
    #[error("item '{id}' is not an HTML document ({media_type})")]
    UnsupportedContent { id: String, media_type: String },

    #[error("content is {len} bytes, exceeding the {max} byte limit")]
    ContentTooLarge { len: u64, max: u64 },

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn decode(path: impl Into<String>, source: quick_xml::Error) -> Self {
        Error::Decode {
            path: path.into(),
            source,
        }
    }

    /// Returns true for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
