//! Archive path helpers.
//!
//! Zip entry names always use `/`, but archives produced on Windows sometimes
//! carry `\` separators. Lookups compare separator-normalized names.

use std::borrow::Cow;

/// Convert `\` separators to `/`.
pub fn normalize_separators(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}

/// Directory part of an archive path (`"OEBPS/content.opf"` -> `"OEBPS"`).
///
/// Returns an empty string for a path at the archive root.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Join `href` onto `base_dir` and clean the result.
///
/// `.` segments are dropped and `..` pops the previous segment; a `..` that
/// would climb above the archive root is discarded. Empty segments collapse.
pub fn resolve_href(base_dir: &str, href: &str) -> String {
    let base = normalize_separators(base_dir);
    let href = normalize_separators(href);

    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(href.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
