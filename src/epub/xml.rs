//! Small helpers shared by the container, package and NCX parsers.

use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// Extract local name from namespaced XML name (e.g., "dc:title" -> "title").
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Value of attribute `key` on `element`, with entity references resolved.
pub(crate) fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .map(|attr| unescape(&String::from_utf8_lossy(&attr.value)))
}

/// Append the character data carried by `event` to `buf`.
///
/// Handles text, CDATA and entity references; returns false for any other event.
pub(crate) fn append_text(buf: &mut String, event: &Event<'_>) -> bool {
    match event {
        Event::Text(e) => buf.push_str(&String::from_utf8_lossy(e.as_ref())),
        Event::CData(e) => buf.push_str(&String::from_utf8_lossy(e.as_ref())),
        Event::GeneralRef(e) => {
            let entity = String::from_utf8_lossy(e.as_ref());
            if let Some(resolved) = resolve_entity(&entity) {
                buf.push_str(&resolved);
            }
        }
        _ => return false,
    }
    true
}

/// Names of the elements opened but not yet closed.
///
/// The reader checks that end tags match, but stops quietly at end of input
/// with elements still open; [`finish`](OpenElements::finish) reports that.
#[derive(Debug, Default)]
pub(crate) struct OpenElements(Vec<String>);

impl OpenElements {
    pub(crate) fn track(&mut self, event: &Event<'_>) {
        match event {
            Event::Start(e) => self
                .0
                .push(String::from_utf8_lossy(e.name().as_ref()).into_owned()),
            Event::End(_) => {
                self.0.pop();
            }
            _ => {}
        }
    }

    /// Fail with a decode error for `path` if any element is left open.
    pub(crate) fn finish(&self, path: &str) -> Result<()> {
        match self.0.last() {
            Some(name) => Err(Error::decode(
                path,
                quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name.clone())),
            )),
            None => Ok(()),
        }
    }
}

/// Resolve the entity references inside an attribute value.
fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        match tail.find(';').and_then(|semi| Some((resolve_entity(&tail[..semi])?, semi))) {
            Some((resolved, semi)) => {
                out.push_str(&resolved);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code).map(|c| c.to_string())
}
