//! Merging DOCX files through altChunk parts

mod layout;
mod patcher;
mod sequencer;

pub use layout::PackageLayout;
pub use patcher::{AppendedPart, ArchivePatcher};
pub use sequencer::{DocxMerger, MergeOptions, MergeOutcome};
