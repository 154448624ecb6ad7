//! Copying build output into the host's plugin directory

use addonkit_core::{AddonError, AddonResult, BuildOutcome, Manifest, Plugin};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory under the config root that holds installed addons
pub const PLUGINS_DIR: &str = "plugins";

/// Install directory of addon `id`: `<config-root>/plugins/<id>`
pub fn install_dir(config_root: &Path, id: &str) -> PathBuf {
    config_root.join(PLUGINS_DIR).join(id)
}

/// Replace `dest` with a copy of `out_dir`
///
/// Any existing `dest` is removed first; a missing one is fine.
pub fn install_output(out_dir: &Path, dest: &Path) -> AddonResult<()> {
    let install_err = |source: io::Error| AddonError::Install {
        path: dest.to_path_buf(),
        source,
    };

    match fs::remove_dir_all(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(install_err(e)),
    }

    copy_dir_recursive(out_dir, dest).map_err(install_err)
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let dest_path = dest.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path)?;
        }
    }

    Ok(())
}

/// End hook that installs a successful round's output
///
/// Failures are reported as warnings and never fail the build.
#[derive(Debug, Clone)]
pub struct InstallPlugin {
    out_dir: PathBuf,
    config_root: PathBuf,
    manifest: Manifest,
}

impl InstallPlugin {
    pub fn new(
        out_dir: impl Into<PathBuf>,
        config_root: impl Into<PathBuf>,
        manifest: Manifest,
    ) -> Self {
        Self {
            out_dir: out_dir.into(),
            config_root: config_root.into(),
            manifest,
        }
    }

    /// Where the output goes, if the addon has a usable id
    pub fn destination(&self) -> Option<PathBuf> {
        self.manifest
            .require_id()
            .ok()
            .map(|id| install_dir(&self.config_root, id))
    }

    fn install(&self) -> AddonResult<PathBuf> {
        let dest = install_dir(&self.config_root, self.manifest.require_id()?);
        install_output(&self.out_dir, &dest)?;
        Ok(dest)
    }
}

impl Plugin for InstallPlugin {
    fn name(&self) -> &str {
        "install"
    }

    fn on_end(&self, outcome: &BuildOutcome) {
        if !outcome.is_success() {
            return;
        }

        match self.install() {
            Ok(dest) => info!(path = %dest.display(), "Installed"),
            Err(e) => warn!("Skipping install: {e}"),
        }
    }
}
