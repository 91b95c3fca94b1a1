//! OPF package document: metadata, manifest and spine.

use std::io::{Read, Seek};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::xml::{OpenElements, append_text, attribute, local_name};
use crate::book::{Item, ItemRef, Metadata};
use crate::error::{Error, Result};
use crate::io::Archive;
use crate::util::decode_xml;

/// Parsed OPF package data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    pub metadata: Metadata,
    /// Manifest items in document order.
    pub manifest: Vec<Item>,
    /// Spine references in reading order.
    pub spine: Vec<ItemRef>,
    /// Target of `<meta name="cover" content="..."/>` (EPUB 2 cover hint).
    pub cover_id: Option<String>,
}

/// Read and parse the package document at `root_file`.
pub fn load<R: Read + Seek>(archive: &mut Archive<R>, root_file: &str) -> Result<Package> {
    let bytes = archive.read_bytes(root_file)?;
    parse_opf(&decode_xml(&bytes), root_file)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Metadata,
    Manifest,
    Spine,
}

/// Parse an OPF package document. `path` only labels decode errors.
///
/// No semantic validation happens here: unknown media types, dangling
/// idrefs and hrefs pointing nowhere are all kept as written. A document cut
/// off before its elements are closed is a decode error.
pub fn parse_opf(content: &str, path: &str) -> Result<Package> {
    let mut reader = Reader::from_str(content);

    let mut package = Package::default();
    let mut section = Section::Other;
    let mut open = OpenElements::default();
    // Local name of the Dublin Core element being read, with its text so far
    let mut current: Option<(Vec<u8>, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| Error::decode(path, e))?;
        open.track(&event);

        if let Some((_, text)) = current.as_mut()
            && append_text(text, &event)
        {
            continue;
        }

        match event {
            Event::Start(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match local {
                    b"metadata" => section = Section::Metadata,
                    b"manifest" => section = Section::Manifest,
                    b"spine" => section = Section::Spine,
                    _ if section == Section::Metadata
                        && current.is_none()
                        && package.metadata.field_mut(local).is_some() =>
                    {
                        current = Some((local.to_vec(), String::new()));
                    }
                    _ => read_entry(section, local, &e, &mut package),
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                read_entry(section, local_name(name.as_ref()), &e, &mut package);
            }
            Event::End(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if let Some((element, text)) = current.take_if(|(element, _)| element.as_slice() == local)
                    && let Some(field) = package.metadata.field_mut(&element)
                {
                    *field = text.trim().to_string();
                }

                if matches!(local, b"metadata" | b"manifest" | b"spine") {
                    section = Section::Other;
                }
            }
            Event::Eof => {
                open.finish(path)?;
                break;
            }
            _ => {}
        }
    }

    Ok(package)
}

/// Handle a manifest item, spine itemref or cover meta element.
fn read_entry(section: Section, local: &[u8], e: &BytesStart<'_>, package: &mut Package) {
    match (section, local) {
        (Section::Manifest, b"item") => package.manifest.push(Item {
            id: attribute(e, b"id").unwrap_or_default(),
            href: attribute(e, b"href").unwrap_or_default(),
            media_type: attribute(e, b"media-type").unwrap_or_default(),
            properties: attribute(e, b"properties"),
        }),
        (Section::Spine, b"itemref") => package.spine.push(ItemRef {
            idref: attribute(e, b"idref").unwrap_or_default(),
            linear: attribute(e, b"linear").is_none_or(|linear| linear.trim() != "no"),
        }),
        (Section::Metadata, b"meta") => {
            if package.cover_id.is_none()
                && attribute(e, b"name").as_deref() == Some("cover")
                && let Some(content) = attribute(e, b"content").filter(|c| !c.is_empty())
            {
                package.cover_id = Some(content);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Test Book</dc:title>
    <dc:creator>Author One</dc:creator>
    <dc:creator>Author Two</dc:creator>
    <dc:subject>Fiction</dc:subject>
    <dc:description><![CDATA[A <b>bold</b> description.]]></dc:description>
    <dc:publisher>Tom &amp; Jerry Press</dc:publisher>
    <dc:contributor>Editor</dc:contributor>
    <dc:date>2024-01-15</dc:date>
    <dc:type>Text</dc:type>
    <dc:format>application/epub+zip</dc:format>
    <dc:identifier id="uid">urn:isbn:1234567890</dc:identifier>
    <dc:language>en</dc:language>
    <dc:rights>Public Domain</dc:rights>
    <meta name="cover" content="cover-id"/>
  </metadata>
  <manifest>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="cover-id" href="images/c.png" media-type="image/png" properties="cover-image"></item>
    <item id="ch2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="ch2"/>
    <itemref idref="ch1" linear="no"/>
  </spine>
</package>"#;

    #[test]
    fn test_parse_opf_metadata() {
        let package = parse_opf(OPF, "content.opf").unwrap();
        let meta = &package.metadata;

        assert_eq!(meta.title, "Test Book");
        assert_eq!(meta.creator, "Author Two");
        assert_eq!(meta.subject, "Fiction");
        assert_eq!(meta.description, "A <b>bold</b> description.");
        assert_eq!(meta.publisher, "Tom & Jerry Press");
        assert_eq!(meta.contributor, "Editor");
        assert_eq!(meta.date, "2024-01-15");
        assert_eq!(meta.kind, "Text");
        assert_eq!(meta.format, "application/epub+zip");
        assert_eq!(meta.identifier, "urn:isbn:1234567890");
        assert_eq!(meta.language, "en");
        assert_eq!(meta.rights, "Public Domain");
        assert_eq!(package.cover_id.as_deref(), Some("cover-id"));
    }

    #[test]
    fn test_parse_opf_manifest_keeps_document_order() {
        let package = parse_opf(OPF, "content.opf").unwrap();
        let ids: Vec<_> = package.manifest.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["ch1", "ncx", "cover-id", "ch2"]);

        let cover = &package.manifest[2];
        assert_eq!(cover.href, "images/c.png");
        assert_eq!(cover.media_type, "image/png");
        assert_eq!(cover.properties.as_deref(), Some("cover-image"));
    }

    #[test]
    fn test_parse_opf_spine() {
        let package = parse_opf(OPF, "content.opf").unwrap();
        assert_eq!(
            package.spine,
            vec![
                ItemRef::new("ch2"),
                ItemRef {
                    idref: "ch1".into(),
                    linear: false
                }
            ]
        );
    }

    #[test]
    fn test_missing_metadata_is_empty() {
        let opf = r#"<package><metadata/><manifest/><spine/></package>"#;
        let package = parse_opf(opf, "content.opf").unwrap();
        assert_eq!(package.metadata, Metadata::default());
        assert!(package.manifest.is_empty());
        assert!(package.spine.is_empty());
        assert_eq!(package.cover_id, None);
    }

    #[test]
    fn test_item_outside_manifest_ignored() {
        let opf = r#"<package>
  <metadata><dc:title xmlns:dc="http://purl.org/dc/elements/1.1/">  Spaced  </dc:title></metadata>
  <guide><item id="stray" href="x.xhtml" media-type="text/html"/></guide>
  <manifest><item id="a" href="a.xhtml" media-type="text/html"/></manifest>
</package>"#;
        let package = parse_opf(opf, "content.opf").unwrap();
        assert_eq!(package.metadata.title, "Spaced");
        assert_eq!(package.manifest.len(), 1);
        assert_eq!(package.manifest[0].id, "a");
    }

    #[test]
    fn test_repeated_metadata_last_wins() {
        let opf = r#"<package><metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>First Title</dc:title>
  <dc:title>Final Title</dc:title>
  <dc:language>en</dc:language>
</metadata></package>"#;
        let package = parse_opf(opf, "content.opf").unwrap();
        assert_eq!(package.metadata.title, "Final Title");
        assert_eq!(package.metadata.language, "en");
    }

    #[test]
    fn test_truncated_opf() {
        let opf = r#"<package><metadata><dc:title>X</dc:title></metadata><manifest><item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>"#;
        match parse_opf(opf, "OEBPS/content.opf") {
            Err(Error::Decode { path, .. }) => assert_eq!(path, "OEBPS/content.opf"),
            other => panic!("expected decode error, got {other:?}"),
        }

        assert!(matches!(
            parse_opf("<package><metadata><dc:title>Cut", "content.opf"),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn test_malformed_opf() {
        let opf = r#"<package><metadata><dc:title>Broken</dc:creator></metadata></package>"#;
        match parse_opf(opf, "OEBPS/content.opf") {
            Err(Error::Decode { path, .. }) => assert_eq!(path, "OEBPS/content.opf"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
