//! Archive access: entry lookup and path handling.

mod archive;
mod path;

pub use archive::Archive;
pub use path::{normalize_separators, parent_dir, resolve_href};
