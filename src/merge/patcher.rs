//! In-place patching of a DOCX archive.
//!
//! The patcher keeps the main document, its relationships and the
//! content-types manifest as text buffers. Appending a file splices one
//! element into each buffer and stages the file as a new archive entry;
//! nothing reaches the disk until [`ArchivePatcher::commit`].

use crate::error::{Error, Result};
use crate::merge::PackageLayout;
use crate::opc::{Archive, PartUri, Relationships, TargetMode};
use crate::xml;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A document embedded into the archive by [`ArchivePatcher::append`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendedPart {
    /// Archive entry holding the embedded file
    pub entry_name: String,
    /// Relationship id referenced by the altChunk element
    pub relationship_id: String,
    /// Whether a page break precedes the chunk
    pub page_break: bool,
}

/// Buffered editor for an opened DOCX archive
#[derive(Debug)]
pub struct ArchivePatcher {
    archive: Archive,
    layout: &'static PackageLayout,
    /// `word/document.xml`
    document: String,
    /// `word/_rels/document.xml.rels`
    relationships: String,
    /// `[Content_Types].xml`
    content_types: String,
    /// Header/footer parts by entry name
    headers_footers: BTreeMap<String, String>,
    headers_footers_loaded: bool,
    appended: Vec<AppendedPart>,
}

impl ArchivePatcher {
    /// Open the DOCX archive at `path` and load its main parts
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_layout(path, &PackageLayout::DOCX)
    }

    /// Open with a custom package layout
    pub fn open_with_layout<P: AsRef<Path>>(
        path: P,
        layout: &'static PackageLayout,
    ) -> Result<Self> {
        let mut archive = Archive::open(path)?;

        let relationships = archive.read_string(layout.relationships)?;
        let document = archive.read_string(layout.document)?;
        let content_types = archive.read_string(layout.content_types)?;

        debug!("opened {:?}", archive.path());

        Ok(Self {
            archive,
            layout,
            document,
            relationships,
            content_types,
            headers_footers: BTreeMap::new(),
            headers_footers_loaded: false,
            appended: Vec::new(),
        })
    }

    /// Embed the DOCX at `file_path` as `entry_name` and reference it from the body.
    ///
    /// All preconditions are checked before anything is staged, so a failed
    /// call leaves the buffers and the archive as they were.
    pub fn append<P: AsRef<Path>>(
        &mut self,
        file_path: P,
        entry_name: &str,
        relationship_id: &str,
        page_break: bool,
    ) -> Result<()> {
        let file_path = file_path.as_ref();
        let data = fs::read(file_path).map_err(|source| Error::SourceRead {
            path: file_path.to_path_buf(),
            source,
        })?;

        let part = PartUri::from_entry_name(entry_name)?;
        if self.archive.contains(part.entry_name()) {
            return Err(Error::DuplicateEntry(entry_name.to_string()));
        }
        if xml::has_attribute_value(&self.relationships, "Id", relationship_id) {
            return Err(Error::DuplicateRelationship(relationship_id.to_string()));
        }

        let layout = self.layout;
        require_anchor(&self.relationships, layout.relationships, layout.relationships_anchor)?;
        require_anchor(&self.document, layout.document, layout.body_anchor)?;
        require_anchor(&self.content_types, layout.content_types, layout.content_types_anchor)?;

        // `r:id` on the altChunk needs the `r` prefix bound on the root
        let declare_r = match xml::root_namespace(&self.document, "r") {
            Some(uri) if uri == layout.relationships_namespace => false,
            Some(_) => return Err(r_binding_missing(layout)),
            None if xml::root_start_tag(&self.document).is_some() => true,
            None => return Err(malformed(layout.document, "root element")),
        };

        self.archive.add(part.entry_name(), data)?;

        let relationship = xml::relationship_element(
            relationship_id,
            layout.alt_chunk_rel_type,
            &format!("../{}", part.entry_name()),
        );
        splice(
            &mut self.relationships,
            layout.relationships,
            layout.relationships_anchor,
            &relationship,
        )?;

        let chunk = xml::alt_chunk_element(relationship_id, page_break);
        splice(&mut self.document, layout.document, layout.body_anchor, &chunk)?;
        if declare_r {
            xml::declare_root_namespace(&mut self.document, "r", layout.relationships_namespace)
                .ok_or_else(|| malformed(layout.document, "root element"))?;
            debug!("declared xmlns:r on the root of {}", layout.document);
        }

        let content_type = xml::override_element(part.as_str(), layout.alt_chunk_content_type);
        splice(
            &mut self.content_types,
            layout.content_types,
            layout.content_types_anchor,
            &content_type,
        )?;

        debug!(
            "appended {:?} as {} ({}, page break: {})",
            file_path, entry_name, relationship_id, page_break
        );

        self.appended.push(AppendedPart {
            entry_name: part.entry_name().to_string(),
            relationship_id: relationship_id.to_string(),
            page_break,
        });
        Ok(())
    }

    /// Load the header and footer parts referenced by the main document.
    ///
    /// Their buffers then take part in [`find_and_replace`](Self::find_and_replace).
    /// Returns the number of parts loaded; a second call loads nothing.
    pub fn load_headers_footers(&mut self) -> Result<usize> {
        if self.headers_footers_loaded {
            debug!("headers/footers already loaded");
            return Ok(0);
        }
        if !self.appended.is_empty() {
            warn!("loading headers/footers after {} appended parts", self.appended.len());
        }

        let rels = Relationships::from_xml(&self.relationships).map_err(|e| match e {
            e @ Error::MalformedRelationships(_) => e,
            other => Error::MalformedRelationships(other.to_string()),
        })?;

        let base = PartUri::from_entry_name(self.layout.document)?;
        for rel in rels.all_by_types(self.layout.header_footer_rel_types) {
            if rel.target_mode == TargetMode::External {
                continue;
            }
            let uri = base.resolve(&rel.target)?;
            let content = self.archive.read_string(uri.entry_name())?;
            self.headers_footers.insert(uri.entry_name().to_string(), content);
        }

        self.headers_footers_loaded = true;
        debug!("loaded {} header/footer parts", self.headers_footers.len());
        Ok(self.headers_footers.len())
    }

    /// Replace every literal occurrence of `key` with `value` in the main
    /// document and in each loaded header/footer.
    ///
    /// Relationships and content types are never touched. Returns the number
    /// of occurrences replaced.
    pub fn find_and_replace(&mut self, key: &str, value: &str) -> usize {
        let mut count = xml::replace_all(&mut self.document, key, value);
        for content in self.headers_footers.values_mut() {
            count += xml::replace_all(content, key, value);
        }
        debug!("replaced {} occurrence(s) of {:?}", count, key);
        count
    }

    /// Write all buffers back into the archive and flush it to disk
    pub fn commit(self) -> Result<()> {
        let ArchivePatcher {
            mut archive,
            layout,
            document,
            relationships,
            content_types,
            headers_footers,
            appended,
            ..
        } = self;

        archive.replace(layout.document, document.into_bytes());
        archive.replace(layout.relationships, relationships.into_bytes());
        archive.replace(layout.content_types, content_types.into_bytes());
        for (name, content) in headers_footers {
            archive.replace(&name, content.into_bytes());
        }

        let path = archive.path().to_path_buf();
        let pending = archive.pending();
        archive.flush()?;

        info!(
            "committed {:?}: {} appended part(s), {} entries written",
            path,
            appended.len(),
            pending
        );
        Ok(())
    }

    /// Current text of the main document
    pub fn document_xml(&self) -> &str {
        &self.document
    }

    /// Current text of the main document's relationships
    pub fn relationships_xml(&self) -> &str {
        &self.relationships
    }

    /// Current text of the content-types manifest
    pub fn content_types_xml(&self) -> &str {
        &self.content_types
    }

    /// Loaded header/footer parts by entry name
    pub fn headers_footers(&self) -> &BTreeMap<String, String> {
        &self.headers_footers
    }

    /// Parts appended so far, in order
    pub fn appended_parts(&self) -> &[AppendedPart] {
        &self.appended
    }
}

fn require_anchor(buf: &str, part: &str, anchor: &str) -> Result<()> {
    if buf.contains(anchor) {
        Ok(())
    } else {
        Err(malformed(part, anchor))
    }
}

fn splice(buf: &mut String, part: &str, anchor: &str, fragment: &str) -> Result<()> {
    xml::insert_before_last(buf, anchor, fragment)
        .map(drop)
        .ok_or_else(|| malformed(part, anchor))
}

fn r_binding_missing(layout: &PackageLayout) -> Error {
    malformed(
        layout.document,
        &format!("xmlns:r=\"{}\"", layout.relationships_namespace),
    )
}

fn malformed(part: &str, anchor: &str) -> Error {
    Error::MalformedDocument {
        part: part.to_string(),
        anchor: anchor.to_string(),
    }
}
