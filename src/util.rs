//! Text decoding and format sniffing helpers.

use std::borrow::Cow;

use memchr::memmem;

/// Decode entry bytes to a string without altering valid UTF-8.
///
/// This function:
/// 1. Returns valid UTF-8 untouched (a leading BOM is kept, markup stays verbatim)
/// 2. If malformed, tries the encoding named by the `<?xml encoding="..."?>` declaration
/// 3. Falls back to Windows-1252 (common in old ebooks)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, malformed) = encoding_rs::UTF_8.decode_without_bom_handling(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = extract_xml_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
        && encoding != encoding_rs::UTF_8
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Decode an XML document for parsing: like [`decode_text`] but drops a UTF-8 BOM.
pub fn decode_xml(bytes: &[u8]) -> Cow<'_, str> {
    decode_text(strip_bom(bytes))
}

/// Strip UTF-8 BOM if present.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// Extract the encoding name from an XML declaration.
///
/// Only the first 100 bytes are checked.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = memmem::find(prefix, b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let (&quote, rest) = after_enc.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = memchr::memchr(quote, rest)?;
    std::str::from_utf8(&rest[..value_end]).ok()
}

/// Raster formats recognized when sniffing cover candidates by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect the format from a path's extension, ignoring case.
    pub fn from_path(path: &str) -> Option<Self> {
        let path_lower = path.to_ascii_lowercase();

        if path_lower.ends_with(".jpg") || path_lower.ends_with(".jpeg") {
            Some(ImageFormat::Jpeg)
        } else if path_lower.ends_with(".png") {
            Some(ImageFormat::Png)
        } else if path_lower.ends_with(".gif") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }
}
