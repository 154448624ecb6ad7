//! Archive creation utilities.
//!
//! The [`ArchiveBuilder`] provides a fluent API for creating `.asar` archives.

use crate::header::{Entry, FileEntry, Integrity, encode_header};
use crate::{ArchiveError, ArchiveResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Builder for creating archives.
///
/// Files are laid out in sorted path order, so the same set of inputs always
/// produces a byte-identical archive.
///
/// # Example
///
/// ```no_run
/// use addonkit_bundle::ArchiveBuilder;
///
/// ArchiveBuilder::new()
///     .add_file("dist/renderer.js", "renderer.js")?
///     .add_bytes("manifest.json", br#"{"id":"dev.example.Addon"}"#.to_vec())
///     .write("bundle/dev.example.Addon.asar")?;
/// # Ok::<(), addonkit_bundle::ArchiveError>(())
/// ```
#[derive(Default)]
pub struct ArchiveBuilder {
    files: Vec<ArchiveFile>,
}

/// A file to include in the archive.
struct ArchiveFile {
    /// `/`-separated path within the archive.
    archive_path: String,
    /// File contents.
    contents: Vec<u8>,
}

impl ArchiveBuilder {
    /// Create an empty archive builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw bytes as a file in the archive.
    #[must_use]
    pub fn add_bytes(mut self, archive_path: &str, contents: Vec<u8>) -> Self {
        self.files.push(ArchiveFile {
            archive_path: archive_path.to_string(),
            contents,
        });
        self
    }

    /// Add a file from disk under `archive_path`.
    pub fn add_file<P: AsRef<Path>>(
        self,
        source_path: P,
        archive_path: &str,
    ) -> ArchiveResult<Self> {
        let source_path = source_path.as_ref();
        let contents = fs::read(source_path).map_err(|e| {
            ArchiveError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", source_path.display(), e),
            ))
        })?;

        Ok(self.add_bytes(archive_path, contents))
    }

    /// Add every file below `dir`, keeping paths relative to `dir`.
    pub fn add_directory<P: AsRef<Path>>(mut self, dir: P) -> ArchiveResult<Self> {
        let dir = dir.as_ref();
        let mut stack = vec![(dir.to_path_buf(), String::new())];

        while let Some((current, prefix)) = stack.pop() {
            let mut entries = fs::read_dir(&current)?.collect::<Result<Vec<_>, _>>()?;
            entries.sort_by_key(|entry| entry.file_name());

            for entry in entries {
                let name = entry.file_name().into_string().map_err(|name| {
                    ArchiveError::InvalidPath(name.to_string_lossy().into_owned())
                })?;
                let archive_path = if prefix.is_empty() {
                    name
                } else {
                    format!("{prefix}/{name}")
                };

                if entry.file_type()?.is_dir() {
                    stack.push((entry.path(), archive_path));
                } else {
                    self = self.add_file(entry.path(), &archive_path)?;
                }
            }
        }

        Ok(self)
    }

    /// Number of files queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write the archive to a file.
    pub fn write<P: AsRef<Path>>(mut self, output_path: P) -> ArchiveResult<()> {
        self.files
            .sort_by(|a, b| a.archive_path.cmp(&b.archive_path));

        let mut root = Entry::empty_directory();
        let mut offset: u64 = 0;
        for file in &self.files {
            validate_path(&file.archive_path)?;
            let size = file.contents.len() as u64;
            root.insert_file(
                &file.archive_path,
                FileEntry {
                    size,
                    offset: Some(offset.to_string()),
                    unpacked: false,
                    executable: false,
                    integrity: Some(Integrity::compute(&file.contents)),
                },
            )?;
            offset += size;
        }

        let header = encode_header(&serde_json::to_string(&root)?)?;

        let mut out = BufWriter::new(File::create(output_path.as_ref())?);
        out.write_all(&header)?;
        for file in &self.files {
            out.write_all(&file.contents)?;
        }
        out.flush()?;

        Ok(())
    }
}

fn validate_path(path: &str) -> ArchiveResult<()> {
    let bad = path.is_empty()
        || path.contains('\\')
        || path
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");

    if bad {
        return Err(ArchiveError::InvalidPath(path.to_string()));
    }
    Ok(())
}
