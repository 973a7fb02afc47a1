//! Error types for docx-merger

use std::path::PathBuf;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Cannot open archive {path:?}: {source}")]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Cannot read source file {path:?}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot copy {from:?} to output {to:?}: {source}")]
    OutputCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document: '{anchor}' not found in {part}")]
    MalformedDocument { part: String, anchor: String },

    #[error("Malformed relationships: {0}")]
    MalformedRelationships(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Entry already exists in archive: {0}")]
    DuplicateEntry(String),

    #[error("Relationship id already declared: {0}")]
    DuplicateRelationship(String),

    #[error("Cannot replace {target:?} (merged output kept at {temp:?}): {source}")]
    Replace {
        temp: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
