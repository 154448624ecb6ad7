//! Bundle command implementation

use crate::project::Project;
use anyhow::{Context, Result};

/// Run the bundle command
pub async fn run(project: &Project) -> Result<()> {
    let report = project
        .builder()
        .package()
        .await
        .with_context(|| format!("Failed to bundle addon in {}", project.dir.display()))?;

    println!("Bundled {}", report.name);
    println!("  Archive: {}", report.archive.display());
    println!("  Manifest: {}", report.manifest.display());

    Ok(())
}
