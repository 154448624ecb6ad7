//! Packaging a production build into a distributable archive pair

use crate::pipeline::AddonBuilder;
use addonkit_bundle::{ARCHIVE_EXTENSION, ArchiveBuilder};
use addonkit_core::{AddonError, AddonResult, BuildOptions, MANIFEST_FILE, Manifest};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::info;

/// What [`AddonBuilder::package`] wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// Display name of the addon
    pub name: String,
    pub id: String,
    /// `<package-dir>/<id>.asar`
    pub archive: PathBuf,
    /// `<package-dir>/<id>.json`
    pub manifest: PathBuf,
}

impl AddonBuilder {
    /// Clean production build, then write `<id>.asar` and `<id>.json`
    ///
    /// The output directory is deleted first so the archive holds exactly
    /// what this build produced. Installation and watching are always off.
    pub async fn package(&self) -> AddonResult<PackageReport> {
        let out_dir = self.out_dir();
        match fs::remove_dir_all(&out_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.clone()
            .with_options(BuildOptions::packaging())
            .build_once()
            .await?;

        let built_manifest = out_dir.join(MANIFEST_FILE);
        let manifest = Manifest::from_file(&built_manifest)?;
        let id = manifest.require_id()?.to_string();

        let package_dir = self.working_dir().join(&self.config().package_dir);
        fs::create_dir_all(&package_dir).map_err(|e| AddonError::package(&package_dir, e))?;

        let archive = package_dir.join(format!("{id}.{ARCHIVE_EXTENSION}"));
        ArchiveBuilder::new()
            .add_directory(&out_dir)
            .and_then(|builder| builder.write(&archive))
            .map_err(|e| AddonError::package(&archive, e))?;

        let manifest_copy = package_dir.join(format!("{id}.json"));
        fs::copy(&built_manifest, &manifest_copy)
            .map_err(|e| AddonError::package(&manifest_copy, e))?;

        info!(archive = %archive.display(), manifest = %manifest_copy.display(), "Packaged");

        Ok(PackageReport {
            name: manifest.display_name().to_string(),
            id,
            archive,
            manifest: manifest_copy,
        })
    }
}
