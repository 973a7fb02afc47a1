//! ZIP archive with buffered mutations.
//!
//! Entries are read straight from the opened container. Additions and
//! replacements are kept in memory until [`Archive::flush`], which rewrites
//! the whole container into a sibling temp file and then swaps it in.

use crate::error::{Error, Result};
use crate::opc::ReplaceStrategy;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::read::ZipArchive;
use zip::result::ZipError;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// An opened ZIP container backing a document on disk
pub struct Archive {
    /// Path the archive was opened from and is flushed back to
    path: PathBuf,
    /// Reader over the original container
    zip: ZipArchive<BufReader<File>>,
    /// New content for entries that exist in the container
    replaced: HashMap<String, Vec<u8>>,
    /// Entries not present in the container, in insertion order
    added: Vec<(String, Vec<u8>)>,
}

impl Archive {
    /// Open the archive at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source: ZipError| Error::ArchiveOpen {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(|e| open_err(ZipError::Io(e)))?;
        let zip = ZipArchive::new(BufReader::new(file)).map_err(open_err)?;

        Ok(Self {
            path,
            zip,
            replaced: HashMap::new(),
            added: Vec::new(),
        })
    }

    /// Path of the archive on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an entry exists, either in the container or pending
    pub fn contains(&self, name: &str) -> bool {
        self.zip.index_for_name(name).is_some() || self.added.iter().any(|(n, _)| n == name)
    }

    /// Names of all entries: container order first, then pending additions
    pub fn entry_names(&self) -> Vec<String> {
        self.zip
            .file_names()
            .map(str::to_string)
            .chain(self.added.iter().map(|(n, _)| n.clone()))
            .collect()
    }

    /// Read an entry, seeing pending mutations
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        if let Some(data) = self.replaced.get(name) {
            return Ok(data.clone());
        }
        if let Some((_, data)) = self.added.iter().find(|(n, _)| n == name) {
            return Ok(data.clone());
        }

        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(Error::MissingPart(name.to_string())),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an entry as UTF-8 text
    pub fn read_string(&mut self, name: &str) -> Result<String> {
        let data = self.read(name)?;
        Ok(std::str::from_utf8(&data)?.to_string())
    }

    /// Add a new entry. Fails if the name is already taken.
    pub fn add(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        if self.contains(name) {
            return Err(Error::DuplicateEntry(name.to_string()));
        }
        self.added.push((name.to_string(), data));
        Ok(())
    }

    /// Set the content of an entry, adding it if it does not exist
    pub fn replace(&mut self, name: &str, data: Vec<u8>) {
        if self.zip.index_for_name(name).is_some() {
            self.replaced.insert(name.to_string(), data);
        } else if let Some(slot) = self.added.iter_mut().find(|(n, _)| n == name) {
            slot.1 = data;
        } else {
            self.added.push((name.to_string(), data));
        }
    }

    /// Number of buffered mutations
    pub fn pending(&self) -> usize {
        self.replaced.len() + self.added.len()
    }

    /// Write all entries to a temp file next to the archive and swap it in.
    ///
    /// Untouched entries are copied raw, keeping their compressed bytes.
    pub fn flush(self) -> Result<ReplaceStrategy> {
        let Archive {
            path,
            mut zip,
            mut replaced,
            added,
        } = self;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp = NamedTempFile::with_prefix_in(".dm", &dir)?;
        let mut writer = ZipWriter::new(temp);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let (mut copied, mut rewritten) = (0usize, 0usize);
        for i in 0..zip.len() {
            let entry = zip.by_index_raw(i)?;
            if let Some(data) = replaced.remove(entry.name()) {
                let name = entry.name().to_string();
                drop(entry);
                writer.start_file(name, options)?;
                writer.write_all(&data)?;
                rewritten += 1;
            } else {
                writer.raw_copy_file(entry)?;
                copied += 1;
            }
        }

        for (name, data) in &added {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }

        let temp = writer.finish()?;
        // release the handle on the original before replacing it
        drop(zip);

        debug!(
            "wrote {:?}: {} copied, {} rewritten, {} added",
            temp.path(),
            copied,
            rewritten,
            added.len()
        );

        let strategy = ReplaceStrategy::detect(&dir);
        strategy.replace(temp, &path)?;
        info!("flushed {:?} using {:?}", path, strategy);

        Ok(strategy)
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("entries", &self.zip.len())
            .field("replaced", &self.replaced.len())
            .field("added", &self.added.len())
            .finish()
    }
}
