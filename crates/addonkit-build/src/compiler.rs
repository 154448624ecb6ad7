//! Compiler abstraction and shared compile settings

use crate::target::Target;
use addonkit_core::{AddonResult, BuildConfig, BuildOptions, Diagnostic, PluginSet};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

/// Module format of compiled output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Esm,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Esm => write!(f, "esm"),
        }
    }
}

/// Runtime environment compiled output targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPlatform {
    Browser,
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPlatform::Browser => write!(f, "browser"),
        }
    }
}

/// Settings shared by every target of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileSettings {
    /// Project root; target paths are relative to it
    pub working_dir: PathBuf,
    pub bundle: bool,
    pub format: OutputFormat,
    pub log_level: String,
    pub minify: bool,
    pub platform: TargetPlatform,
    /// Minimum engine, e.g. `chrome91`
    pub engine_target: String,
    pub sourcemap: bool,
    pub watch: bool,
}

impl CompileSettings {
    pub fn new(working_dir: impl Into<PathBuf>, options: &BuildOptions, config: &BuildConfig) -> Self {
        Self {
            working_dir: working_dir.into(),
            bundle: true,
            format: OutputFormat::Esm,
            log_level: "info".to_string(),
            minify: options.production,
            platform: TargetPlatform::Browser,
            engine_target: config.engine_target.clone(),
            sourcemap: !options.production,
            watch: options.watch,
        }
    }

    /// Absolute location of a path relative to the working directory
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.working_dir.join(relative)
    }
}

/// Output of a successful compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    /// Files written, relative to the working directory
    pub outputs: Vec<PathBuf>,
    /// Non-fatal messages
    pub warnings: Vec<Diagnostic>,
}

/// Compiles one target
///
/// Implementations must offer every static import reachable from the entry
/// point to `plugins`, fail the target on a rejection, and serve redirected
/// imports from [`PluginSet::load`]. A failed target returns every diagnostic
/// that was collected for it.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Check the compiler can run before a round with targets starts
    fn prepare(&self) -> AddonResult<()> {
        Ok(())
    }

    async fn compile(
        &self,
        target: &Target,
        settings: &CompileSettings,
        plugins: &PluginSet,
    ) -> Result<CompileOutput, Vec<Diagnostic>>;
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use test_case::test_case;

    #[test_case(false, true ; "development")]
    #[test_case(true, false ; "production")]
    fn CompileSettings___new___production_toggles_minify_and_sourcemap(
        production: bool,
        sourcemap: bool,
    ) {
        let options = BuildOptions {
            production,
            ..BuildOptions::default()
        };

        let settings = CompileSettings::new("/addon", &options, &BuildConfig::default());

        assert_eq!(settings.minify, production);
        assert_eq!(settings.sourcemap, sourcemap);
    }

    #[test]
    fn CompileSettings___new___fixed_settings() {
        let options = BuildOptions {
            watch: true,
            ..BuildOptions::default()
        };

        let settings = CompileSettings::new("/addon", &options, &BuildConfig::default());

        assert!(settings.bundle);
        assert!(settings.watch);
        assert_eq!(settings.format.to_string(), "esm");
        assert_eq!(settings.platform.to_string(), "browser");
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.engine_target, "chrome91");
        assert_eq!(settings.working_dir, PathBuf::from("/addon"));
    }
}
