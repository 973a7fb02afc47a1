//! Relationships handling for OPC packages
//!
//! Parses `.rels` files. Only reading is supported: new relationships are
//! spliced into the raw buffer by the patcher, never re-serialized.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Relationships declared by one `.rels` part, in document order
#[derive(Clone, Debug, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

/// A single relationship
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Target mode
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target (part within the package)
    #[default]
    Internal,
    /// External target (hyperlink, etc.)
    External,
}

impl Relationships {
    /// Parse from XML string.
    ///
    /// The input must be well-formed and rooted at `<Relationships>`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::default();
        let mut depth = 0usize;
        let mut root_closed = false;

        loop {
            let event = reader.read_event()?;
            if let Event::Start(e) | Event::Empty(e) = &event {
                let is_root = e.local_name().as_ref() == b"Relationships";
                if root_closed {
                    return Err(malformed("element after the root element"));
                }
                if depth == 0 && !is_root {
                    return Err(malformed("root element is not <Relationships>"));
                }
                if e.local_name().as_ref() == b"Relationship" {
                    rels.items.push(parse_relationship(e)?);
                }
            }

            match event {
                Event::Start(_) => depth += 1,
                Event::Empty(_) if depth == 0 => root_closed = true,
                Event::End(_) => {
                    depth -= 1;
                    root_closed = depth == 0;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !root_closed {
            return Err(malformed(if depth > 0 {
                "unclosed element at end of input"
            } else {
                "no <Relationships> root element"
            }));
        }

        Ok(rels)
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Get all relationships of any of the given types
    pub fn all_by_types<'a>(
        &'a self,
        rel_types: &'a [&str],
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.items
            .iter()
            .filter(move |r| rel_types.contains(&r.rel_type.as_str()))
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn malformed(reason: &str) -> Error {
    Error::MalformedRelationships(reason.to_string())
}

/// Parse a single Relationship element
fn parse_relationship(element: &BytesStart) -> Result<Relationship> {
    let mut id = None;
    let mut rel_type = None;
    let mut target = None;
    let mut target_mode = TargetMode::Internal;

    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();

        match attr.key.local_name().as_ref() {
            b"Id" => id = Some(value),
            b"Type" => rel_type = Some(value),
            b"Target" => target = Some(value),
            b"TargetMode" => {
                if value == "External" {
                    target_mode = TargetMode::External;
                }
            }
            _ => {}
        }
    }

    let missing = |attr: &str| Error::MissingAttribute {
        element: "Relationship".into(),
        attr: attr.into(),
    };

    Ok(Relationship {
        id: id.ok_or_else(|| missing("Id"))?,
        rel_type: rel_type.ok_or_else(|| missing("Type"))?,
        target: target.ok_or_else(|| missing("Target"))?,
        target_mode,
    })
}

// Well-known relationship types
pub mod rel_types {
    pub const HEADER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const ALT_CHUNK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/aFChunk";
}
