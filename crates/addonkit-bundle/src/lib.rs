//! asar archives for addonkit packages
//!
//! This crate writes and reads the single-file filesystem images that host
//! applications load addons from. The layout is the asar format:
//!
//! ```text
//! dev.example.Addon.asar
//! ├── u32 LE  4                      size pickle: payload length
//! ├── u32 LE  H                      size pickle: header pickle length
//! ├── u32 LE  H - 4                  header pickle: payload length
//! ├── u32 LE  J                      header pickle: JSON length
//! ├── J bytes of JSON, padded to 4   {"files": {"renderer.js": {"size": .., "offset": "0", ..}}}
//! └── file contents, back to back    offsets are relative to the end of the header
//! ```
//!
//! # Example
//!
//! ```no_run
//! use addonkit_bundle::{ArchiveBuilder, ArchiveReader};
//!
//! ArchiveBuilder::new()
//!     .add_directory("dist")?
//!     .write("bundle/dev.example.Addon.asar")?;
//!
//! let reader = ArchiveReader::open("bundle/dev.example.Addon.asar")?;
//! for file in reader.list_files() {
//!     println!("{file}");
//! }
//! # Ok::<(), addonkit_bundle::ArchiveError>(())
//! ```

mod error;
mod header;

pub mod builder;
pub mod loader;

pub use builder::ArchiveBuilder;
pub use error::ArchiveError;
pub use header::{Entry, FileEntry, Integrity};
pub use loader::ArchiveReader;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Archive file extension.
pub const ARCHIVE_EXTENSION: &str = "asar";

/// Block size used for per-block integrity hashes.
pub const INTEGRITY_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Hash algorithm name recorded in integrity entries.
pub const INTEGRITY_ALGORITHM: &str = "SHA256";
