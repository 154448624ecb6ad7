//! The build pipeline: manifest → targets → compile → rewrite → install

use crate::compiler::{CompileSettings, Compiler};
use crate::driver::Driver;
use crate::install::{InstallPlugin, PLUGINS_DIR};
use crate::policy::GlobalModulesPlugin;
use crate::shutdown::ShutdownSignal;
use crate::target::enumerate_targets;
use crate::watch::SourceWatcher;
use addonkit_core::{
    AddonError, AddonResult, BuildConfig, BuildOptions, HostPlatform, MANIFEST_FILE, Manifest,
    PluginSet, resolve_config_root,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Result of one successful build round
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// The manifest as written to the output directory
    pub manifest: Manifest,
    /// Path of the written manifest
    pub manifest_path: PathBuf,
    /// Compiled files, relative to the working directory
    pub outputs: Vec<PathBuf>,
    /// Install destination, unless installation was disabled
    pub install_dir: Option<PathBuf>,
}

/// Builds an addon in a working directory
///
/// # Example
///
/// ```no_run
/// use addonkit_build::{AddonBuilder, EsbuildCompiler};
/// use addonkit_core::BuildOptions;
/// use std::sync::Arc;
///
/// # async fn run() -> addonkit_core::AddonResult<()> {
/// let dir = std::path::Path::new(".");
/// let compiler = Arc::new(EsbuildCompiler::discover(dir));
/// let report = AddonBuilder::new(dir, compiler)
///     .with_options(BuildOptions { no_install: true, ..Default::default() })
///     .build_once()
///     .await?;
/// println!("wrote {}", report.manifest_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AddonBuilder {
    working_dir: PathBuf,
    compiler: Arc<dyn Compiler>,
    options: BuildOptions,
    config: BuildConfig,
    config_root: Option<PathBuf>,
}

impl AddonBuilder {
    pub fn new(working_dir: impl Into<PathBuf>, compiler: Arc<dyn Compiler>) -> Self {
        Self {
            working_dir: working_dir.into(),
            compiler,
            options: BuildOptions::default(),
            config: BuildConfig::default(),
            config_root: None,
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Install under this root instead of the platform's config directory
    pub fn with_config_root(mut self, config_root: impl Into<PathBuf>) -> Self {
        self.config_root = Some(config_root.into());
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Absolute output directory
    pub fn out_dir(&self) -> PathBuf {
        self.working_dir.join(&self.config.out_dir)
    }

    /// The host's config root; a relative result lands under the working
    /// directory
    pub fn config_root(&self) -> PathBuf {
        let root = self.config_root.clone().unwrap_or_else(|| {
            resolve_config_root(HostPlatform::current(), &self.config.host_folder, |key| {
                std::env::var(key).ok()
            })
        });
        self.working_dir.join(root)
    }

    /// The plugins directory installs go to, relative to the working
    /// directory, when it lies inside it
    fn install_root_in_tree(&self) -> Option<PathBuf> {
        if self.options.no_install {
            return None;
        }
        self.config_root()
            .join(PLUGINS_DIR)
            .strip_prefix(&self.working_dir)
            .ok()
            .map(Path::to_path_buf)
    }

    /// Run one build round
    ///
    /// Every target settles before failures are reported. The manifest is
    /// rewritten only when all targets succeed, and end hooks (install) run
    /// after that.
    pub async fn build_once(&self) -> AddonResult<BuildReport> {
        let mut manifest = Manifest::from_file(self.working_dir.join(MANIFEST_FILE))?;
        let targets = enumerate_targets(&self.working_dir, &manifest, &self.config)?;
        if !targets.is_empty() {
            self.compiler.prepare()?;
        }

        let out_dir = self.out_dir();
        fs::create_dir_all(&out_dir)?;

        let install = (!self.options.no_install)
            .then(|| InstallPlugin::new(&out_dir, self.config_root(), manifest.clone()));
        let mut plugins = PluginSet::new().with(GlobalModulesPlugin::from_config(&self.config));
        if let Some(install) = &install {
            plugins = plugins.with(install.clone());
        }

        let settings = CompileSettings::new(&self.working_dir, &self.options, &self.config);
        let driver = Driver::new(self.compiler.clone(), plugins, settings);

        info!(
            addon = manifest.display_name(),
            targets = targets.len(),
            production = self.options.production,
            "Building"
        );
        let outcome = driver.compile_all(&targets).await;

        if !outcome.is_success() {
            driver.finish(&outcome);
            return Err(AddonError::Compilation {
                failures: outcome.failures,
            });
        }

        manifest.rewrite_entry_points();
        let manifest_path = out_dir.join(MANIFEST_FILE);
        manifest.write_to(&manifest_path)?;

        driver.finish(&outcome);

        Ok(BuildReport {
            manifest,
            manifest_path,
            outputs: outcome.outputs,
            install_dir: install.and_then(|install| install.destination()),
        })
    }

    /// Build, then keep rebuilding on changes when `watch` is set
    ///
    /// Returns the first round's result once the watch session ends.
    pub async fn build(&self, shutdown: ShutdownSignal) -> AddonResult<BuildReport> {
        let first = self.build_once().await;
        if !self.options.watch {
            return first;
        }

        log_round(&first);
        self.watch(shutdown).await?;
        first
    }

    /// Rebuild after every settled burst of source changes until shutdown
    pub async fn watch(&self, mut shutdown: ShutdownSignal) -> AddonResult<()> {
        let mut watcher = SourceWatcher::new(&self.working_dir, &self.config)?;
        if let Some(install_root) = self.install_root_in_tree() {
            watcher = watcher.with_ignored_path(install_root);
        }

        while let Some(changed) = watcher.next_change(&mut shutdown).await {
            info!(files = changed.len(), "Change detected, rebuilding");
            log_round(&self.build_once().await);
        }

        info!("Stopped watching");
        Ok(())
    }
}

fn log_round(result: &AddonResult<BuildReport>) {
    match result {
        Ok(report) => info!(
            outputs = report.outputs.len(),
            manifest = %report.manifest_path.display(),
            "Build succeeded"
        ),
        Err(e) => error!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::esbuild::EsbuildCompiler;

    fn builder(no_install: bool) -> AddonBuilder {
        AddonBuilder::new("/addon", Arc::new(EsbuildCompiler::new("esbuild"))).with_options(
            BuildOptions {
                no_install,
                ..BuildOptions::default()
            },
        )
    }

    #[test]
    fn AddonBuilder___install_root_in_tree___relative_config_root() {
        let builder = builder(false).with_config_root(".config/replugged");

        assert_eq!(
            builder.install_root_in_tree(),
            Some(PathBuf::from(".config/replugged/plugins"))
        );
    }

    #[test]
    fn AddonBuilder___install_root_in_tree___outside_tree_none() {
        let builder = builder(false).with_config_root("/home/ada/.config/replugged");

        assert_eq!(builder.install_root_in_tree(), None);
    }

    #[test]
    fn AddonBuilder___install_root_in_tree___no_install_none() {
        let builder = builder(true).with_config_root(".config/replugged");

        assert_eq!(builder.install_root_in_tree(), None);
    }
}
