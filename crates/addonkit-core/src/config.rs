//! Build options and layout configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-invocation build flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Minify output and skip source maps
    pub production: bool,
    /// Keep rebuilding on source changes
    pub watch: bool,
    /// Don't copy the output into the host's plugin directory
    pub no_install: bool,
}

impl BuildOptions {
    /// Options used when packaging an addon for distribution
    pub fn packaging() -> Self {
        Self {
            production: true,
            watch: false,
            no_install: true,
        }
    }
}

/// Layout and toolchain configuration
///
/// Every field has a default matching the conventional addon layout, so an
/// empty JSON object (or no config file at all) gives a working setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory, relative to the addon directory
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Persistent directory for distributable archives
    #[serde(default = "default_package_dir")]
    pub package_dir: PathBuf,

    /// Theme source directory
    #[serde(default = "default_theme_dir")]
    pub theme_dir: PathBuf,

    /// Name of the nested theme subdirectory that is compiled one level deep
    #[serde(default = "default_base16_dir")]
    pub base16_dir: String,

    /// Import name whose implementation the host provides at runtime
    #[serde(default = "default_reserved_namespace")]
    pub reserved_namespace: String,

    /// Global expression the reserved namespace resolves to at runtime
    #[serde(default = "default_runtime_global")]
    pub runtime_global: String,

    /// Folder name of the host inside the user's configuration root
    #[serde(default = "default_host_folder")]
    pub host_folder: String,

    /// Minimum browser engine the output must run on
    #[serde(default = "default_engine_target")]
    pub engine_target: String,

    /// Extensions embedded as data URLs and never compiled as theme targets
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Quiet period before a burst of file changes triggers a rebuild
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_package_dir() -> PathBuf {
    PathBuf::from("bundle")
}

fn default_theme_dir() -> PathBuf {
    PathBuf::from("src").join("themes")
}

fn default_base16_dir() -> String {
    "base16".to_string()
}

fn default_reserved_namespace() -> String {
    "replugged".to_string()
}

fn default_runtime_global() -> String {
    "window.replugged".to_string()
}

fn default_host_folder() -> String {
    "replugged".to_string()
}

fn default_engine_target() -> String {
    "chrome91".to_string()
}

fn default_image_extensions() -> Vec<String> {
    vec![".png".to_string(), ".jpg".to_string()]
}

fn default_watch_debounce_ms() -> u64 {
    200
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            package_dir: default_package_dir(),
            theme_dir: default_theme_dir(),
            base16_dir: default_base16_dir(),
            reserved_namespace: default_reserved_namespace(),
            runtime_global: default_runtime_global(),
            host_folder: default_host_folder(),
            engine_target: default_engine_target(),
            image_extensions: default_image_extensions(),
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

impl BuildConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes).map_err(std::io::Error::other)
    }

    /// Set the output directory
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Set the theme source directory
    pub fn with_theme_dir(mut self, theme_dir: impl Into<PathBuf>) -> Self {
        self.theme_dir = theme_dir.into();
        self
    }

    /// Set the package directory
    pub fn with_package_dir(mut self, package_dir: impl Into<PathBuf>) -> Self {
        self.package_dir = package_dir.into();
        self
    }

    /// Whether `file_name` has one of the image extensions (case-insensitive)
    pub fn is_image(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        self.image_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_ascii_lowercase()))
    }
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
