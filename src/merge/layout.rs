//! Fixed part names and type URIs of a WordprocessingML package.

use crate::opc::{content_types, rel_types};

/// Well-known locations and types the patcher relies on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackageLayout {
    /// Main document part
    pub document: &'static str,
    /// Relationships of the main document part
    pub relationships: &'static str,
    /// Content-types manifest
    pub content_types: &'static str,
    /// Namespace the `r:` prefix of `r:id` must be bound to
    pub relationships_namespace: &'static str,
    /// Relationship type of an embedded alternative-format chunk
    pub alt_chunk_rel_type: &'static str,
    /// Content type declared for an embedded chunk
    pub alt_chunk_content_type: &'static str,
    /// Relationship types whose targets are header/footer parts
    pub header_footer_rel_types: &'static [&'static str],
    /// Closing tag that new relationships are inserted before
    pub relationships_anchor: &'static str,
    /// Closing tag that altChunk references are inserted before
    pub body_anchor: &'static str,
    /// Closing tag that content-type overrides are inserted before
    pub content_types_anchor: &'static str,
}

impl PackageLayout {
    pub const DOCX: PackageLayout = PackageLayout {
        document: "word/document.xml",
        relationships: "word/_rels/document.xml.rels",
        content_types: "[Content_Types].xml",
        relationships_namespace: "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        alt_chunk_rel_type: rel_types::ALT_CHUNK,
        alt_chunk_content_type: content_types::MAIN_DOCUMENT,
        header_footer_rel_types: &[rel_types::FOOTER, rel_types::HEADER],
        relationships_anchor: "</Relationships>",
        body_anchor: "</w:body>",
        content_types_anchor: "</Types>",
    };
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self::DOCX
    }
}
