//! Error types for archive operations.

use thiserror::Error;

/// Errors that can occur while writing or reading an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON header parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The header pickle is truncated or inconsistent.
    #[error("Malformed archive header: {0}")]
    MalformedHeader(String),

    /// A path that cannot be stored in an archive.
    #[error("Invalid archive path: {0}")]
    InvalidPath(String),

    /// Two entries claim the same path, or a file and a directory collide.
    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),

    /// Requested file is not in the archive.
    #[error("Missing file: {0}")]
    MissingFile(String),

    /// File contents don't match the recorded hash.
    #[error("Integrity mismatch for {path}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}
