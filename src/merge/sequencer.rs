//! Ordered merge list driving the [`ArchivePatcher`].

use crate::error::{Error, Result};
use crate::merge::ArchivePatcher;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for one [`DocxMerger::save_with`] call
#[derive(Clone, Debug)]
pub struct MergeOptions {
    /// Page-break flag for files added without their own flag
    pub page_break: bool,
    /// Load the first document's headers and footers before merging so
    /// replacements reach them too
    pub preserve_headers_footers: bool,
    /// Literal replacements applied to the merged body, in order
    pub replacements: Vec<(String, String)>,
    /// Entry name prefix for embedded files (`<prefix><index>.docx`)
    pub part_name_prefix: String,
    /// Relationship id prefix (`<prefix><index>`)
    pub relationship_id_prefix: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            page_break: false,
            preserve_headers_footers: false,
            replacements: Vec::new(),
            part_name_prefix: "file_part_".into(),
            relationship_id_prefix: "rId10".into(),
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the uniform page-break flag
    pub fn page_break(mut self, page_break: bool) -> Self {
        self.page_break = page_break;
        self
    }

    pub fn preserve_headers_footers(mut self, preserve: bool) -> Self {
        self.preserve_headers_footers = preserve;
        self
    }

    /// Queue a literal replacement
    pub fn replace(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.replacements.push((key.into(), value.into()));
        self
    }

    pub fn part_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.part_name_prefix = prefix.into();
        self
    }

    pub fn relationship_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.relationship_id_prefix = prefix.into();
        self
    }

    fn entry_name(&self, index: usize) -> String {
        format!("{}{}.docx", self.part_name_prefix, index)
    }

    fn relationship_id(&self, index: usize) -> String {
        format!("{}{}", self.relationship_id_prefix, index)
    }
}

/// Result of a save
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No files were queued; the output path was not touched
    NothingToDo,
    /// The output was written with this many files embedded after the first
    Merged { appended: usize },
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }
}

#[derive(Clone, Debug)]
struct MergeItem {
    path: PathBuf,
    /// `None` defers to [`MergeOptions::page_break`]
    page_break: Option<bool>,
}

/// Concatenates DOCX files into one document.
///
/// The first file becomes the output document; every following file is
/// embedded whole and shown after it, optionally on a new page.
///
/// ```rust,ignore
/// use docx_merger::{DocxMerger, MergeOptions};
///
/// let mut merger = DocxMerger::new();
/// merger.add_file("cover.docx");
/// merger.add_file_with_page_break("chapter1.docx", true);
/// merger.add_files(["chapter2.docx", "chapter3.docx"]);
/// merger.save_with("book.docx", &MergeOptions::new().page_break(true))?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct DocxMerger {
    items: Vec<MergeItem>,
}

impl DocxMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file without its own page-break flag
    pub fn add_file<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.items.push(MergeItem {
            path: path.into(),
            page_break: None,
        });
        self
    }

    /// Queue a file, choosing whether a page break precedes it
    pub fn add_file_with_page_break<P: Into<PathBuf>>(
        &mut self,
        path: P,
        page_break: bool,
    ) -> &mut Self {
        self.items.push(MergeItem {
            path: path.into(),
            page_break: Some(page_break),
        });
        self
    }

    /// Queue several files without their own page-break flags
    pub fn add_files<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.add_file(path);
        }
        self
    }

    /// Queue several files with per-file flags.
    ///
    /// Flags pair up with paths by position. Paths past the end of
    /// `page_breaks` get no flag of their own; extra flags are ignored.
    pub fn add_files_with_page_breaks<I, P>(&mut self, paths: I, page_breaks: &[bool]) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for (i, path) in paths.into_iter().enumerate() {
            self.items.push(MergeItem {
                path: path.into(),
                page_break: page_breaks.get(i).copied(),
            });
        }
        self
    }

    /// Number of queued files
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge into `output` with default options
    pub fn save<P: AsRef<Path>>(&self, output: P) -> Result<MergeOutcome> {
        self.save_with(output, &MergeOptions::default())
    }

    /// Merge into `output`.
    ///
    /// The first file is copied to `output`, the rest are appended in order
    /// and the result is committed. If a step after the copy fails, the
    /// copied output is removed again.
    pub fn save_with<P: AsRef<Path>>(
        &self,
        output: P,
        options: &MergeOptions,
    ) -> Result<MergeOutcome> {
        let output = output.as_ref();
        let Some((first, rest)) = self.items.split_first() else {
            debug!("nothing to merge into {:?}", output);
            return Ok(MergeOutcome::NothingToDo);
        };

        let copied = if same_file(&first.path, output) {
            debug!("{:?} is the output itself, merging in place", output);
            false
        } else {
            fs::copy(&first.path, output).map_err(|source| Error::OutputCopy {
                from: first.path.clone(),
                to: output.to_path_buf(),
                source,
            })?;
            true
        };

        match self.merge_into(output, rest, options) {
            Ok(appended) => {
                info!("merged {} file(s) into {:?}", appended + 1, output);
                Ok(MergeOutcome::Merged { appended })
            }
            Err(e) => {
                if copied {
                    if let Err(rm) = fs::remove_file(output) {
                        warn!("cannot remove incomplete output {:?}: {}", output, rm);
                    }
                }
                Err(e)
            }
        }
    }

    fn merge_into(
        &self,
        output: &Path,
        rest: &[MergeItem],
        options: &MergeOptions,
    ) -> Result<usize> {
        let mut patcher = ArchivePatcher::open(output)?;

        if options.preserve_headers_footers {
            patcher.load_headers_footers()?;
        }

        for (offset, item) in rest.iter().enumerate() {
            // index within the full list; the first file is 0
            let index = offset + 1;
            let page_break = item.page_break.unwrap_or(options.page_break);
            patcher.append(
                &item.path,
                &options.entry_name(index),
                &options.relationship_id(index),
                page_break,
            )?;
        }

        for (key, value) in &options.replacements {
            patcher.find_and_replace(key, value);
        }

        patcher.commit()?;
        Ok(rest.len())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
