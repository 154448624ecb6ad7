//! Archive loading utilities.
//!
//! The [`ArchiveReader`] opens an archive, lists its contents and reads files
//! back with integrity verification.

use crate::header::{Entry, FileEntry, compute_sha256, decode_header_json, decode_header_len};
use crate::{ArchiveError, ArchiveResult};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Reader for an `.asar` archive.
pub struct ArchiveReader {
    file: File,
    root: Entry,
    data_offset: u64,
}

impl ArchiveReader {
    /// Open an archive and parse its header.
    pub fn open<P: AsRef<Path>>(path: P) -> ArchiveResult<Self> {
        let mut file = File::open(path.as_ref())?;

        let mut size_pickle = [0u8; 8];
        file.read_exact(&mut size_pickle)?;
        let header_len = decode_header_len(&size_pickle)?;

        let mut header = vec![0u8; header_len];
        file.read_exact(&mut header).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                ArchiveError::MalformedHeader(format!("header of {header_len} bytes is truncated"))
            }
            _ => ArchiveError::Io(e),
        })?;

        let root: Entry = serde_json::from_str(decode_header_json(&header)?)?;
        if !matches!(root, Entry::Directory { .. }) {
            return Err(ArchiveError::MalformedHeader(
                "root entry is not a directory".to_string(),
            ));
        }

        Ok(Self {
            file,
            root,
            data_offset: 8 + header_len as u64,
        })
    }

    /// The parsed header tree.
    #[must_use]
    pub fn root(&self) -> &Entry {
        &self.root
    }

    /// List all regular files in the archive, sorted, `/`-separated.
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        self.root.file_paths()
    }

    /// Check if a regular file exists in the archive.
    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        matches!(self.root.lookup(path), Some(Entry::File(_)))
    }

    /// Read a file from the archive as bytes.
    pub fn read_file(&mut self, path: &str) -> ArchiveResult<Vec<u8>> {
        let entry = match self.root.lookup(path) {
            Some(Entry::File(entry)) => entry.clone(),
            _ => return Err(ArchiveError::MissingFile(path.to_string())),
        };

        let contents = self.read_entry(path, &entry)?;

        if let Some(integrity) = &entry.integrity {
            let actual = compute_sha256(&contents);
            if actual != integrity.hash {
                return Err(ArchiveError::IntegrityMismatch {
                    path: path.to_string(),
                    expected: integrity.hash.clone(),
                    actual,
                });
            }
        }

        Ok(contents)
    }

    /// Read a file from the archive as a string.
    pub fn read_file_string(&mut self, path: &str) -> ArchiveResult<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|e| {
            ArchiveError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    fn read_entry(&mut self, path: &str, entry: &FileEntry) -> ArchiveResult<Vec<u8>> {
        let offset = match (&entry.offset, entry.unpacked) {
            (Some(offset), false) => offset.parse::<u64>().map_err(|_| {
                ArchiveError::MalformedHeader(format!("invalid offset {offset:?} for {path}"))
            })?,
            _ => return Err(ArchiveError::MissingFile(format!("{path} (unpacked)"))),
        };

        self.file.seek(SeekFrom::Start(self.data_offset + offset))?;
        let mut contents = Vec::new();
        (&mut self.file)
            .take(entry.size)
            .read_to_end(&mut contents)?;

        if contents.len() as u64 != entry.size {
            return Err(ArchiveError::MalformedHeader(format!(
                "{path}: expected {} bytes, archive ends after {}",
                entry.size,
                contents.len()
            )));
        }

        Ok(contents)
    }
}
