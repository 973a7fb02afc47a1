//! # docx-merger
//!
//! Concatenate DOCX files into a single document.
//!
//! The first file is copied to the output and every following file is
//! embedded whole as an alternative-format chunk (`w:altChunk`). Only three
//! parts of the output are touched, and only by splicing text at known
//! closing tags; every other entry of the archive is kept byte-for-byte.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_merger::{DocxMerger, MergeOptions};
//!
//! let mut merger = DocxMerger::new();
//! merger.add_files(["intro.docx", "body.docx", "appendix.docx"]);
//! merger.save_with("merged.docx", &MergeOptions::new().page_break(true))?;
//! ```
//!
//! For finer control, drive an [`ArchivePatcher`] directly:
//!
//! ```rust,ignore
//! use docx_merger::ArchivePatcher;
//!
//! let mut patcher = ArchivePatcher::open("letter.docx")?;
//! patcher.load_headers_footers()?;
//! patcher.append("terms.docx", "terms.docx", "rIdTerms", true)?;
//! patcher.find_and_replace("{customer}", "ACME");
//! patcher.commit()?;
//! ```

pub mod error;
pub mod merge;
pub mod opc;
pub mod xml;

pub use error::{Error, Result};
pub use merge::{
    AppendedPart, ArchivePatcher, DocxMerger, MergeOptions, MergeOutcome, PackageLayout,
};
pub use opc::{Archive, PartUri, ReplaceStrategy};
