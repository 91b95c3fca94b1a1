//! In-memory EPUB fixtures.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use epubkit::Epub;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

struct ManifestEntry {
    id: String,
    href: String,
    media_type: String,
    properties: Option<String>,
    content: Option<Vec<u8>>,
}

/// Builds a zipped EPUB with a configurable package layout.
pub struct EpubBuilder {
    opf_dir: String,
    metadata: Vec<(String, String)>,
    manifest: Vec<ManifestEntry>,
    spine: Vec<String>,
    ncx: Option<Vec<(String, String)>>,
    ncx_file: bool,
    meta_cover: Option<String>,
    container: bool,
    extra: Vec<(String, Vec<u8>)>,
}

impl Default for EpubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self {
            opf_dir: "OEBPS".into(),
            metadata: Vec::new(),
            manifest: Vec::new(),
            spine: Vec::new(),
            ncx: None,
            ncx_file: true,
            meta_cover: None,
            container: true,
            extra: Vec::new(),
        }
    }

    /// Directory of the package document; empty puts it at the archive root.
    pub fn opf_dir(mut self, dir: &str) -> Self {
        self.opf_dir = dir.into();
        self
    }

    /// Add a Dublin Core element, e.g. `("title", "Test Book")`.
    pub fn dc(mut self, element: &str, value: &str) -> Self {
        self.metadata.push((element.into(), value.into()));
        self
    }

    /// Add a manifest item. `content` is stored next to the package document.
    pub fn item(mut self, id: &str, href: &str, media_type: &str, content: Option<&[u8]>) -> Self {
        self.manifest.push(ManifestEntry {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
            content: content.map(<[u8]>::to_vec),
        });
        self
    }

    /// Set the properties attribute of the last added item.
    pub fn properties(mut self, properties: &str) -> Self {
        if let Some(entry) = self.manifest.last_mut() {
            entry.properties = Some(properties.into());
        }
        self
    }

    pub fn spine(mut self, idref: &str) -> Self {
        self.spine.push(idref.into());
        self
    }

    /// Add an XHTML item and reference it from the spine.
    pub fn chapter(self, id: &str, href: &str, content: &[u8]) -> Self {
        self.item(id, href, "application/xhtml+xml", Some(content))
            .spine(id)
    }

    /// Declare an NCX with one top-level navPoint per `(label, src)`.
    pub fn ncx(mut self, points: &[(&str, &str)]) -> Self {
        self.ncx = Some(
            points
                .iter()
                .map(|(label, src)| (label.to_string(), src.to_string()))
                .collect(),
        );
        self
    }

    /// Declare the NCX in the manifest but leave it out of the archive.
    pub fn without_ncx_file(mut self) -> Self {
        self.ncx_file = false;
        self
    }

    pub fn meta_cover(mut self, id: &str) -> Self {
        self.meta_cover = Some(id.into());
        self
    }

    pub fn without_container(mut self) -> Self {
        self.container = false;
        self
    }

    /// Store an arbitrary entry at an archive path.
    pub fn entry(mut self, path: &str, content: &[u8]) -> Self {
        self.extra.push((path.into(), content.to_vec()));
        self
    }

    pub fn opf_path(&self) -> String {
        self.package_path("content.opf")
    }

    fn package_path(&self, href: &str) -> String {
        if self.opf_dir.is_empty() {
            href.to_string()
        } else {
            format!("{}/{}", self.opf_dir, href)
        }
    }

    fn opf(&self) -> String {
        let mut opf = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
        );
        for (element, value) in &self.metadata {
            opf.push_str(&format!("    <dc:{element}>{value}</dc:{element}>\n"));
        }
        if let Some(id) = &self.meta_cover {
            opf.push_str(&format!("    <meta name=\"cover\" content=\"{id}\"/>\n"));
        }
        opf.push_str("  </metadata>\n  <manifest>\n");
        if self.ncx.is_some() {
            opf.push_str(
                "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
            );
        }
        for entry in &self.manifest {
            let properties = entry
                .properties
                .as_ref()
                .map(|p| format!(" properties=\"{p}\""))
                .unwrap_or_default();
            opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{properties}/>\n",
                entry.id, entry.href, entry.media_type
            ));
        }
        opf.push_str("  </manifest>\n  <spine>\n");
        for idref in &self.spine {
            opf.push_str(&format!("    <itemref idref=\"{idref}\"/>\n"));
        }
        opf.push_str("  </spine>\n</package>\n");
        opf
    }

    fn ncx_document(points: &[(String, String)]) -> String {
        let mut ncx = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <docTitle><text>Fixture</text></docTitle>
  <navMap>
"#,
        );
        for (i, (label, src)) in points.iter().enumerate() {
            ncx.push_str(&format!(
                "    <navPoint id=\"np{n}\" playOrder=\"{n}\"><navLabel><text>{label}</text></navLabel><content src=\"{src}\"/></navPoint>\n",
                n = i + 1
            ));
        }
        ncx.push_str("  </navMap>\n</ncx>\n");
        ncx
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        zip.start_file("mimetype", options).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        if self.container {
            zip.start_file("META-INF/container.xml", options).unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
                    self.opf_path()
                )
                .as_bytes(),
            )
            .unwrap();
        }

        zip.start_file(self.opf_path(), options).unwrap();
        zip.write_all(self.opf().as_bytes()).unwrap();

        if let Some(points) = &self.ncx
            && self.ncx_file
        {
            zip.start_file(self.package_path("toc.ncx"), options).unwrap();
            zip.write_all(Self::ncx_document(points).as_bytes()).unwrap();
        }

        for entry in &self.manifest {
            if let Some(content) = &entry.content {
                zip.start_file(self.package_path(&entry.href), options).unwrap();
                zip.write_all(content).unwrap();
            }
        }

        for (path, content) in &self.extra {
            zip.start_file(path.as_str(), options).unwrap();
            zip.write_all(content).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    pub fn open(&self) -> Epub<Cursor<Vec<u8>>> {
        Epub::from_reader(Cursor::new(self.build())).expect("fixture should open")
    }
}

/// An XHTML document of exactly `len` bytes.
pub fn html_of_len(len: usize) -> Vec<u8> {
    let prefix = b"<html><body>";
    let suffix = b"</body></html>";
    assert!(len >= prefix.len() + suffix.len());

    let mut doc = prefix.to_vec();
    doc.resize(len - suffix.len(), b'x');
    doc.extend_from_slice(suffix);
    doc
}

/// Two 50-byte chapters, no table of contents.
pub fn two_chapter_book() -> EpubBuilder {
    EpubBuilder::new()
        .dc("title", "Two Chapters")
        .dc("creator", "Fixture Author")
        .chapter("item-1", "ch1.xhtml", &html_of_len(50))
        .chapter("item-2", "ch2.xhtml", &html_of_len(50))
}
