//! Open Packaging Convention (OPC) support
//!
//! This module handles the ZIP-based package format used by DOCX files:
//! opening the container, reading parts and writing it back to disk.

mod archive;
pub mod content_types;
mod part_uri;
mod relationships;
mod replace;

pub use archive::Archive;
pub use part_uri::PartUri;
pub use relationships::{rel_types, Relationship, Relationships, TargetMode};
pub use replace::ReplaceStrategy;
