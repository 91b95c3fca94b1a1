//! `META-INF/container.xml`: locating the package document.

use std::io::{Read, Seek};

use quick_xml::Reader;
use quick_xml::events::Event;

use super::xml::{OpenElements, attribute, local_name};
use crate::error::{Error, Result};
use crate::io::Archive;
use crate::util::decode_xml;

/// Fixed location of the container descriptor.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Read the container descriptor and return the first rootfile's path.
pub fn resolve<R: Read + Seek>(archive: &mut Archive<R>) -> Result<String> {
    let bytes = archive.read_bytes(CONTAINER_PATH)?;
    parse_container_xml(&bytes)
}

/// Parse container.xml to find the package document path.
///
/// The whole document is read so malformed or truncated XML is reported even
/// after the first `<rootfile>`. Only the first rootfile counts: an empty
/// `full-path` there is `NotFound`, later rootfiles are not consulted.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = decode_xml(bytes);
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut root_file: Option<String> = None;
    let mut open = OpenElements::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::decode(CONTAINER_PATH, e))?;
        open.track(&event);

        match event {
            Event::Empty(e) | Event::Start(e)
                if root_file.is_none() && local_name(e.name().as_ref()) == b"rootfile" =>
            {
                root_file = Some(attribute(&e, b"full-path").unwrap_or_default());
            }
            Event::Eof => {
                open.finish(CONTAINER_PATH)?;
                break;
            }
            _ => {}
        }
    }

    root_file
        .filter(|path| !path.is_empty())
        .ok_or_else(|| Error::NotFound(format!("rootfile in {CONTAINER_PATH}")))
}
