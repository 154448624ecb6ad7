//! Resolving the addon directory, layout and compiler from CLI options

use addonkit_build::{AddonBuilder, Compiler, EsbuildCompiler};
use addonkit_core::BuildConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command needs to build an addon
pub struct Project {
    pub dir: PathBuf,
    pub config: BuildConfig,
    pub compiler: Arc<dyn Compiler>,
}

impl Project {
    pub fn load(
        path: Option<PathBuf>,
        esbuild: Option<PathBuf>,
        config: Option<PathBuf>,
    ) -> Result<Self> {
        let dir = match path {
            Some(path) => path,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };

        let config = match config {
            Some(file) => BuildConfig::from_file(&file)
                .with_context(|| format!("Failed to load config: {}", file.display()))?,
            None => BuildConfig::default(),
        };

        let compiler: Arc<dyn Compiler> = match esbuild {
            Some(binary) => Arc::new(EsbuildCompiler::new(binary)),
            None => Arc::new(EsbuildCompiler::discover(&dir)),
        };

        Ok(Self {
            dir,
            config,
            compiler,
        })
    }

    pub fn builder(&self) -> AddonBuilder {
        AddonBuilder::new(&self.dir, self.compiler.clone()).with_config(self.config.clone())
    }
}
