//! Durable replacement of a file by a freshly written sibling.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// How a finished temp file takes the place of the target path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplaceStrategy {
    /// Atomic rename over the target
    Rename,
    /// Copy the temp file's bytes onto the target, then delete the temp file.
    ///
    /// Not atomic: a copy that fails midway leaves the target truncated.
    /// The temp file is kept in that case and still holds the full output.
    CopyThenDelete,
}

impl ReplaceStrategy {
    /// Check whether `dir` supports renaming over an open file.
    ///
    /// Two scratch files are created; the second is renamed over the first
    /// while the first is still held open. Filesystems that allow this get
    /// [`ReplaceStrategy::Rename`], the rest fall back to copying.
    pub fn detect(dir: &Path) -> Self {
        let try_rename = || -> std::io::Result<()> {
            let held = NamedTempFile::with_prefix_in(".dm-check", dir)?;
            let mut other = NamedTempFile::with_prefix_in(".dm-check", dir)?;
            other.write_all(b"check")?;
            other.persist(held.path()).map_err(|e| e.error)?;
            Ok(())
        };

        match try_rename() {
            Ok(()) => Self::Rename,
            Err(e) => {
                debug!("rename check failed in {:?}: {}", dir, e);
                Self::CopyThenDelete
            }
        }
    }

    /// Replace `target` with the contents of `temp`.
    ///
    /// On failure the temp file is kept on disk and reported in
    /// [`Error::Replace`]; the target is left as it was for `Rename`.
    pub fn replace(self, temp: NamedTempFile, target: &Path) -> Result<()> {
        if let Err(source) = temp.as_file().sync_all() {
            return Err(keep_failed(temp, target, source));
        }

        match self {
            Self::Rename => temp.persist(target).map(drop).map_err(|e| {
                let source = e.error;
                keep_failed(e.file, target, source)
            }),
            Self::CopyThenDelete => match fs::copy(temp.path(), target) {
                Ok(_) => {
                    temp.close()?;
                    Ok(())
                }
                Err(source) => Err(keep_failed(temp, target, source)),
            },
        }
    }
}

fn keep_failed(temp: NamedTempFile, target: &Path, source: std::io::Error) -> Error {
    let temp_path = match temp.keep() {
        Ok((_, path)) => path,
        Err(e) => e.file.path().to_path_buf(),
    };
    warn!("keeping merged output at {:?} after failed replace", temp_path);
    Error::Replace {
        temp: temp_path,
        target: target.to_path_buf(),
        source,
    }
}
