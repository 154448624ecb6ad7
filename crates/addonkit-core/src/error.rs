//! Error types for addon builds

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for addon build operations
pub type AddonResult<T> = Result<T, AddonError>;

/// A single message reported against a compilation target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message text
    pub text: String,
    /// File the message refers to, when known
    pub file: Option<PathBuf>,
    /// Name of the plugin that produced the message
    pub plugin: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with just a message
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file: None,
            plugin: None,
        }
    }

    /// Attach the file the message refers to
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach the originating plugin name
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(plugin) = &self.plugin {
            write!(f, "[plugin {plugin}] ")?;
        }
        if let Some(file) = &self.file {
            write!(f, "{}: ", file.display())?;
        }
        write!(f, "{}", self.text)
    }
}

/// A compilation target that did not produce its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    /// Entry point the target was compiled from
    pub entry_point: PathBuf,
    /// Output path the target was supposed to write
    pub output_path: PathBuf,
    /// Everything the compiler or the hooks reported
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.entry_point.display(),
            self.output_path.display()
        )?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n    {diagnostic}")?;
        }
        Ok(())
    }
}

/// Error type for addon build operations
#[derive(Error, Debug)]
pub enum AddonError {
    /// No manifest in the working directory
    #[error("manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    /// The manifest is not valid JSON or has fields of the wrong type
    #[error("failed to parse manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The rewritten manifest could not be written to the output directory
    #[error("failed to write manifest {}: {source}", path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sub-path of the reserved namespace was imported
    #[error(
        "Importing from a path ({path}) is not supported. Instead, please import from \"{namespace}\" and destructure the required modules."
    )]
    ReservedImportPath { path: String, namespace: String },

    /// Two targets would write the same output file
    #[error(
        "duplicate output path {}: produced by both {} and {}",
        output.display(),
        first.display(),
        second.display()
    )]
    DuplicateOutputPath {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// One or more targets failed to compile
    #[error("{}", describe_failures(.failures))]
    Compilation { failures: Vec<TargetFailure> },

    /// The output could not be copied into the host's plugin directory
    #[error("failed to install into {}: {source}", path.display())]
    Install {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest has no usable `id`
    #[error("manifest has no id")]
    MissingId,

    /// The `id` cannot be used as a file or directory name
    #[error("manifest id {0:?} cannot be used as a file name")]
    InvalidId(String),

    /// Writing the distributable archive pair failed
    #[error("failed to package {}: {source}", path.display())]
    Package {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The external compiler could not be located or started
    #[error("compiler unavailable: {0}")]
    CompilerUnavailable(String),

    /// I/O error outside the cases above
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AddonError {
    /// Wrap any packaging failure with the path being written
    pub fn package(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AddonError::Package {
            path: path.into(),
            source: source.into(),
        }
    }
}

fn describe_failures(failures: &[TargetFailure]) -> String {
    let mut message = format!("build failed: {} target(s) failed", failures.len());
    for failure in failures {
        message.push_str("\n  ");
        message.push_str(&failure.to_string());
    }
    message
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
