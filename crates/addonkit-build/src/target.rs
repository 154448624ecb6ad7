//! Compilation targets derived from the manifest and the theme directory

use addonkit_core::{
    AddonError, AddonResult, BuildConfig, Manifest, PLAINTEXT_PATCHES_OUTPUT, RENDERER_OUTPUT,
};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under the output directory that mirrors the theme sources
pub const THEME_OUTPUT_DIR: &str = "themes";

/// What a target produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Renderer,
    PlaintextPatches,
    Theme,
}

/// How the compiler treats files with a given extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loader {
    /// Inline the file as a `data:` URL
    DataUrl,
}

impl Loader {
    pub fn as_str(&self) -> &'static str {
        match self {
            Loader::DataUrl => "dataurl",
        }
    }
}

/// One independent compilation job: one entry point in, one file out
///
/// Both paths are relative to the addon's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub entry_point: PathBuf,
    pub output_path: PathBuf,
    /// Extension (with leading dot) to loader
    pub loaders: BTreeMap<String, Loader>,
}

impl Target {
    fn script(kind: TargetKind, entry_point: &str, out_dir: &Path, output: &str) -> Self {
        Self {
            kind,
            entry_point: PathBuf::from(entry_point),
            output_path: out_dir.join(output),
            loaders: BTreeMap::new(),
        }
    }

    fn theme(entry_point: PathBuf, output_path: PathBuf, config: &BuildConfig) -> Self {
        Self {
            kind: TargetKind::Theme,
            entry_point,
            output_path,
            loaders: config
                .image_extensions
                .iter()
                .map(|ext| (ext.clone(), Loader::DataUrl))
                .collect(),
        }
    }
}

/// Derive the build's targets
///
/// Renderer first, then plaintext patches, then themes in name order. The
/// `base16` theme subdirectory is compiled one level deep; top-level images
/// are skipped because stylesheets embed them. A missing theme directory
/// yields no theme targets.
pub fn enumerate_targets(
    working_dir: &Path,
    manifest: &Manifest,
    config: &BuildConfig,
) -> AddonResult<Vec<Target>> {
    let out_dir = config.out_dir.as_path();
    let mut targets = Vec::new();

    if let Some(renderer) = &manifest.renderer {
        targets.push(Target::script(
            TargetKind::Renderer,
            renderer,
            out_dir,
            RENDERER_OUTPUT,
        ));
    }

    if let Some(patches) = &manifest.plaintext_patches {
        targets.push(Target::script(
            TargetKind::PlaintextPatches,
            patches,
            out_dir,
            PLAINTEXT_PATCHES_OUTPUT,
        ));
    }

    let theme_out = out_dir.join(THEME_OUTPUT_DIR);
    for (name, is_dir) in sorted_entries(&working_dir.join(&config.theme_dir))? {
        let entry_point = config.theme_dir.join(&name);

        if name == config.base16_dir && is_dir {
            for (inner, inner_is_dir) in sorted_entries(&working_dir.join(&entry_point))? {
                if inner_is_dir {
                    debug!(dir = %entry_point.join(&inner).display(), "Skipping nested theme directory");
                    continue;
                }
                targets.push(Target::theme(
                    entry_point.join(&inner),
                    theme_out.join(&name).join(&inner),
                    config,
                ));
            }
        } else if !config.is_image(&name) {
            targets.push(Target::theme(entry_point, theme_out.join(&name), config));
        }
    }

    check_unique_outputs(&targets)?;
    Ok(targets)
}

/// Directory entries as `(name, is_dir)`, sorted by name; missing dir is empty
fn sorted_entries(dir: &Path) -> AddonResult<Vec<(String, bool)>> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry?;
        let is_dir = entry.path().is_dir();
        entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
    }
    entries.sort();
    Ok(entries)
}

/// Output paths are compared case-insensitively: installs land on Windows
/// and macOS filesystems too.
fn check_unique_outputs(targets: &[Target]) -> AddonResult<()> {
    let mut seen: HashMap<String, &Target> = HashMap::new();

    for target in targets {
        let key = target
            .output_path
            .to_string_lossy()
            .replace('\\', "/")
            .to_ascii_lowercase();

        if let Some(first) = seen.insert(key, target) {
            return Err(AddonError::DuplicateOutputPath {
                output: target.output_path.clone(),
                first: first.entry_point.clone(),
                second: target.entry_point.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "target/target_tests.rs"]
mod target_tests;
