//! Table of contents resolution.
//!
//! Two sources exist: the legacy NCX document (EPUB 2) and the XHTML
//! navigation document (EPUB 3). Only the NCX form is parsed; a navigation
//! document is recognized and reported but yields no tree.

use std::io::{Read, Seek};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::xml::{OpenElements, append_text, attribute, local_name};
use crate::book::{Item, NavPoint, Ncx};
use crate::error::{Error, Result};
use crate::io::{Archive, parent_dir, resolve_href};
use crate::util::decode_xml;

/// Media type identifying an NCX manifest item.
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Where the table of contents lives, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocSource<'a> {
    /// Legacy NCX document.
    Ncx(&'a Item),
    /// EPUB 3 navigation document (`properties="nav"`). Not parsed.
    Navigation(&'a Item),
}

impl<'a> TocSource<'a> {
    /// Pick the TOC source from the manifest: the first NCX item, else the
    /// first HTML item carrying the `nav` property.
    pub fn locate(manifest: &'a [Item]) -> Option<Self> {
        if let Some(item) = manifest.iter().find(|item| item.media_type == NCX_MEDIA_TYPE) {
            return Some(TocSource::Ncx(item));
        }

        manifest
            .iter()
            .find(|item| item.is_html() && item.has_property("nav"))
            .map(TocSource::Navigation)
    }
}

/// Resolve the table of contents for a package.
///
/// A declared NCX that is missing or malformed is an error. No TOC at all,
/// or only a navigation document, is `Ok(None)`.
pub fn resolve<R: Read + Seek>(
    archive: &mut Archive<R>,
    root_file: &str,
    manifest: &[Item],
) -> Result<Option<Ncx>> {
    match TocSource::locate(manifest) {
        Some(TocSource::Ncx(item)) => {
            let path = resolve_href(parent_dir(root_file), &item.href);
            let bytes = archive.read_bytes(&path)?;
            let ncx = parse_ncx(&decode_xml(&bytes), &path)?;
            debug!(path = %path, entries = ncx.nav_map.len(), "parsed NCX table of contents");
            Ok(Some(ncx))
        }
        Some(TocSource::Navigation(item)) => {
            debug!(href = %item.href, "EPUB 3 navigation document found; not parsed");
            Ok(None)
        }
        None => {
            debug!("no table of contents declared");
            Ok(None)
        }
    }
}

/// Parse an NCX document. `path` only labels decode errors.
///
/// Every `<navPoint>` becomes a node, even without a label or target, so
/// positions in `nav_map` match positions in the document. A document cut off
/// before its elements are closed is a decode error.
pub fn parse_ncx(content: &str, path: &str) -> Result<Ncx> {
    let mut reader = Reader::from_str(content);

    let mut title = String::new();
    // stack[0] collects the top-level navMap entries
    let mut stack: Vec<NavPoint> = vec![NavPoint::default()];
    let mut in_doc_title = false;
    let mut in_nav_label = false;
    let mut in_text = false;
    let mut open = OpenElements::default();

    loop {
        let event = reader.read_event().map_err(|e| Error::decode(path, e))?;
        open.track(&event);

        if in_text {
            let target = if in_doc_title {
                Some(&mut title)
            } else if in_nav_label && stack.len() > 1 {
                stack.last_mut().map(|point| &mut point.label)
            } else {
                None
            };
            if let Some(target) = target
                && append_text(target, &event)
            {
                continue;
            }
        }

        match event {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"navPoint" => stack.push(nav_point(&e)),
                b"docTitle" => in_doc_title = true,
                b"navLabel" => in_nav_label = true,
                b"text" => in_text = true,
                b"content" => set_src(&mut stack, &e),
                _ => {}
            },
            Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"navPoint" => {
                    let point = nav_point(&e);
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(point);
                    }
                }
                b"content" => set_src(&mut stack, &e),
                _ => {}
            },
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"navPoint" if stack.len() > 1 => {
                    if let Some(mut point) = stack.pop() {
                        point.label = point.label.trim().to_string();
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(point);
                        }
                    }
                }
                b"docTitle" => in_doc_title = false,
                b"navLabel" => in_nav_label = false,
                b"text" => in_text = false,
                _ => {}
            },
            Event::Eof => {
                open.finish(path)?;
                break;
            }
            _ => {}
        }
    }

    Ok(Ncx {
        title: title.trim().to_string(),
        nav_map: stack.pop().map(|root| root.children).unwrap_or_default(),
    })
}

fn nav_point(e: &BytesStart<'_>) -> NavPoint {
    NavPoint {
        id: attribute(e, b"id").unwrap_or_default(),
        play_order: attribute(e, b"playOrder").and_then(|order| order.trim().parse().ok()),
        ..Default::default()
    }
}

fn set_src(stack: &mut [NavPoint], e: &BytesStart<'_>) {
    if stack.len() > 1
        && let Some(point) = stack.last_mut()
        && point.src.is_empty()
        && let Some(src) = attribute(e, b"src")
    {
        point.src = src;
    }
}
