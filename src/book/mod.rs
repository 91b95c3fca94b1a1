//! Document model produced by the open pipeline.

#[cfg(feature = "serde")]
use serde::Serialize;

/// Book metadata (Dublin Core elements of the package document).
///
/// Every field is plain text; an element missing from the package document
/// leaves its field empty. When an element repeats, the last one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Metadata {
    pub title: String,
    pub creator: String,
    pub subject: String,
    pub description: String,
    pub publisher: String,
    pub contributor: String,
    pub date: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub format: String,
    pub identifier: String,
    pub language: String,
    pub rights: String,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Mutable slot for a Dublin Core element by its local name.
    pub(crate) fn field_mut(&mut self, element: &[u8]) -> Option<&mut String> {
        let field = match element {
            b"title" => &mut self.title,
            b"creator" => &mut self.creator,
            b"subject" => &mut self.subject,
            b"description" => &mut self.description,
            b"publisher" => &mut self.publisher,
            b"contributor" => &mut self.contributor,
            b"date" => &mut self.date,
            b"type" => &mut self.kind,
            b"format" => &mut self.format,
            b"identifier" => &mut self.identifier,
            b"language" => &mut self.language,
            b"rights" => &mut self.rights,
            _ => return None,
        };
        Some(field)
    }
}

/// A manifest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Item {
    pub id: String,
    /// Path relative to the package document's directory.
    pub href: String,
    pub media_type: String,
    /// EPUB 3 `properties` attribute (e.g. `nav`, `cover-image`).
    pub properties: Option<String>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }

    /// True when the media type names an HTML flavour (`text/html`,
    /// `application/xhtml+xml`, ...).
    pub fn is_html(&self) -> bool {
        self.media_type.to_ascii_lowercase().contains("html")
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties
            .as_deref()
            .is_some_and(|props| props.split_ascii_whitespace().any(|p| p == property))
    }
}

/// A spine entry referencing a manifest item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ItemRef {
    pub idref: String,
    /// `linear="no"` clears this flag. Parsed but not used to filter chapters.
    pub linear: bool,
}

impl ItemRef {
    pub fn new(idref: impl Into<String>) -> Self {
        Self {
            idref: idref.into(),
            linear: true,
        }
    }
}

/// One node of the NCX navigation map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NavPoint {
    pub id: String,
    /// Play order hint from the `playOrder` attribute.
    pub play_order: Option<usize>,
    pub label: String,
    /// Target of the `<content src>` element, relative to the NCX.
    pub src: String,
    pub children: Vec<NavPoint>,
}

impl NavPoint {
    pub fn new(label: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            src: src.into(),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: NavPoint) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NavPoint::node_count).sum::<usize>()
    }
}

/// Legacy (EPUB 2) table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Ncx {
    /// Text of `<docTitle>`.
    pub title: String,
    /// Top-level navigation points in document order.
    pub nav_map: Vec<NavPoint>,
}

/// A chapter materialized from the spine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Chapter {
    pub title: String,
    /// Raw markup of the content document.
    pub content: String,
    /// 1-based spine position.
    pub order: usize,
    /// Archive path the content was read from.
    pub path: String,
}
