//! Archive header: the JSON entry tree and its pickle framing.

use crate::{ArchiveError, ArchiveResult, INTEGRITY_ALGORITHM, INTEGRITY_BLOCK_SIZE};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Node of the header tree.
///
/// The root of every archive is a [`Entry::Directory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// Directory with named children.
    Directory { files: BTreeMap<String, Entry> },
    /// Symbolic link, relative to the archive root.
    Link { link: String },
    /// Regular file.
    File(FileEntry),
}

/// A regular file's location and checksums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Size in bytes.
    pub size: u64,

    /// Offset from the end of the header, as a decimal string.
    ///
    /// Absent for files stored next to the archive instead of inside it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,

    /// Stored outside the archive (in `<archive>.unpacked/`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unpacked: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub executable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<Integrity>,
}

/// SHA-256 of the whole file plus one hash per block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integrity {
    pub algorithm: String,
    pub hash: String,
    pub block_size: usize,
    pub blocks: Vec<String>,
}

impl Integrity {
    /// Hash `contents` the way the archive format expects.
    pub fn compute(contents: &[u8]) -> Self {
        let blocks = if contents.is_empty() {
            vec![compute_sha256(contents)]
        } else {
            contents
                .chunks(INTEGRITY_BLOCK_SIZE)
                .map(compute_sha256)
                .collect()
        };

        Self {
            algorithm: INTEGRITY_ALGORITHM.to_string(),
            hash: compute_sha256(contents),
            block_size: INTEGRITY_BLOCK_SIZE,
            blocks,
        }
    }
}

impl Entry {
    /// An empty directory node.
    pub fn empty_directory() -> Self {
        Entry::Directory {
            files: BTreeMap::new(),
        }
    }

    /// Walk `path` (`/`-separated) down from this node.
    pub fn lookup(&self, path: &str) -> Option<&Entry> {
        path.split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self, |node, part| match node {
                Entry::Directory { files } => files.get(part),
                _ => None,
            })
    }

    /// Insert a file node at `path`, creating parent directories.
    pub(crate) fn insert_file(&mut self, path: &str, file: FileEntry) -> ArchiveResult<()> {
        let parts: Vec<&str> = path.split('/').collect();
        let Some((name, parents)) = parts.split_last() else {
            return Err(ArchiveError::InvalidPath(path.to_string()));
        };

        let mut node = self;
        for part in parents {
            let Entry::Directory { files } = node else {
                return Err(ArchiveError::DuplicateEntry(path.to_string()));
            };
            node = files
                .entry((*part).to_string())
                .or_insert_with(Entry::empty_directory);
        }

        let Entry::Directory { files } = node else {
            return Err(ArchiveError::DuplicateEntry(path.to_string()));
        };
        if files.contains_key(*name) {
            return Err(ArchiveError::DuplicateEntry(path.to_string()));
        }
        files.insert((*name).to_string(), Entry::File(file));
        Ok(())
    }

    /// Collect every regular file path below this node, sorted.
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_files(self, String::new(), &mut paths);
        paths
    }
}

fn collect_files(node: &Entry, prefix: String, out: &mut Vec<String>) {
    if let Entry::Directory { files } = node {
        for (name, child) in files {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            match child {
                Entry::File(_) => out.push(path),
                Entry::Directory { .. } => collect_files(child, path, out),
                Entry::Link { .. } => {}
            }
        }
    }
}

/// Compute SHA256 hash of data and return as hex string.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Frame the JSON header as a size pickle followed by a header pickle.
pub(crate) fn encode_header(json: &str) -> ArchiveResult<Vec<u8>> {
    let json = json.as_bytes();
    let padded = json.len().div_ceil(4) * 4;
    let payload_len = 4 + padded;
    let header_len = 4 + payload_len;

    let to_u32 = |n: usize| {
        u32::try_from(n).map_err(|_| ArchiveError::MalformedHeader("header too large".into()))
    };

    let mut out = Vec::with_capacity(8 + header_len);
    out.extend_from_slice(&4u32.to_le_bytes());
    out.extend_from_slice(&to_u32(header_len)?.to_le_bytes());
    out.extend_from_slice(&to_u32(payload_len)?.to_le_bytes());
    out.extend_from_slice(&to_u32(json.len())?.to_le_bytes());
    out.extend_from_slice(json);
    out.resize(8 + header_len, 0);
    Ok(out)
}

/// Length of the header pickle, read from the 8-byte size pickle.
pub(crate) fn decode_header_len(size_pickle: &[u8; 8]) -> ArchiveResult<usize> {
    let payload = read_u32(size_pickle, 0)?;
    if payload != 4 {
        return Err(ArchiveError::MalformedHeader(format!(
            "unexpected size pickle payload length {payload}"
        )));
    }
    Ok(read_u32(size_pickle, 4)? as usize)
}

/// Extract the JSON string from a header pickle.
pub(crate) fn decode_header_json(header: &[u8]) -> ArchiveResult<&str> {
    let json_len = read_u32(header, 4)? as usize;
    let end = 8usize
        .checked_add(json_len)
        .filter(|end| *end <= header.len())
        .ok_or_else(|| {
            ArchiveError::MalformedHeader(format!(
                "JSON length {json_len} exceeds header of {} bytes",
                header.len()
            ))
        })?;

    std::str::from_utf8(&header[8..end])
        .map_err(|e| ArchiveError::MalformedHeader(format!("header is not UTF-8: {e}")))
}

fn read_u32(bytes: &[u8], at: usize) -> ArchiveResult<u32> {
    bytes
        .get(at..at + 4)
        .and_then(|b| <[u8; 4]>::try_from(b).ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| ArchiveError::MalformedHeader("truncated header".to_string()))
}
