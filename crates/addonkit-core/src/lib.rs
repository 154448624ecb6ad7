//! addonkit-core - Manifest, configuration, errors, and plugin hooks
//!
//! This crate provides the foundational types shared by the addonkit build
//! pipeline:
//! - [`Manifest`] for loading and rewriting an addon's `manifest.json`
//! - [`BuildOptions`] and [`BuildConfig`] for per-invocation flags and layout
//! - [`AddonError`] for error handling
//! - [`Plugin`] and [`PluginSet`] for compiler resolution/load/end hooks
//! - [`resolve_config_root`] for locating the host's per-user config directory

mod config;
mod error;
mod manifest;
mod platform;
mod plugin;

pub use config::{BuildConfig, BuildOptions};
pub use error::{AddonError, AddonResult, Diagnostic, TargetFailure};
pub use manifest::Manifest;
pub use platform::{HostPlatform, resolve_config_root};
pub use plugin::{
    BuildOutcome, ImportKind, LoadArgs, LoadResult, Plugin, PluginSet, ResolveArgs,
    ResolveDecision,
};

/// Manifest file name, both in the addon source directory and in the output.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Output file name of the compiled renderer entry point.
pub const RENDERER_OUTPUT: &str = "renderer.js";

/// Output file name of the compiled plaintext patches entry point.
pub const PLAINTEXT_PATCHES_OUTPUT: &str = "plaintextPatches.js";

/// Namespace used for ordinary files on disk.
pub const FILE_NAMESPACE: &str = "file";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AddonError, AddonResult, BuildConfig, BuildOptions, BuildOutcome, Diagnostic, ImportKind,
        LoadArgs, LoadResult, Manifest, Plugin, PluginSet, ResolveArgs, ResolveDecision,
    };
}
