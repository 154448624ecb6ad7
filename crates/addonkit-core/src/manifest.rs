//! Addon manifest loading and rewriting

use crate::{AddonError, AddonResult, PLAINTEXT_PATCHES_OUTPUT, RENDERER_OUTPUT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// `manifest.json` structure
///
/// Only the fields the build pipeline reads are typed. Everything else
/// (description, author, version, license, ...) is carried through untouched
/// in `extra`, so a rewritten manifest differs from its source only in the
/// entry-point fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Stable addon identifier, e.g. `dev.kingfish.BetterCodeblocks`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Renderer entry point, relative to the addon directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,

    /// Plaintext patches entry point, relative to the addon directory
    #[serde(
        rename = "plaintextPatches",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub plaintext_patches: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Load manifest from a file
    pub fn from_file(path: impl AsRef<Path>) -> AddonResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AddonError::ManifestNotFound {
                path: path.to_path_buf(),
            },
            _ => AddonError::Io(e),
        })?;

        Self::from_json(&content).map_err(|source| AddonError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse manifest from a JSON string
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Point the entry-point fields at the files the build produces
    pub fn rewrite_entry_points(&mut self) {
        if self.renderer.is_some() {
            self.renderer = Some(RENDERER_OUTPUT.to_string());
        }
        if self.plaintext_patches.is_some() {
            self.plaintext_patches = Some(PLAINTEXT_PATCHES_OUTPUT.to_string());
        }
    }

    /// Serialize as compact JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write compact JSON to `path`, creating its parent directory if needed
    pub fn write_to(&self, path: impl AsRef<Path>) -> AddonResult<()> {
        let path = path.as_ref();
        let json = self.to_json().map_err(|e| AddonError::ManifestWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)
        };

        write().map_err(|source| AddonError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The addon id, required for installing and packaging
    ///
    /// The id names the install directory and the archive files, so it must
    /// be a single path component.
    pub fn require_id(&self) -> AddonResult<&str> {
        let id = match self.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(AddonError::MissingId),
        };

        if id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(AddonError::InvalidId(id.to_string()));
        }
        Ok(id)
    }

    /// Name to show the user: `name`, falling back to `id`
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("addon")
    }
}
