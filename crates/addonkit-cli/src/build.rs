//! Build command implementation

use crate::project::Project;
use addonkit_build::ShutdownHandle;
use addonkit_core::BuildOptions;
use anyhow::{Context, Result};

/// Run the build command
pub async fn run(project: &Project, options: BuildOptions) -> Result<()> {
    println!("Building addon in: {}", project.dir.display());
    if options.production {
        println!("Mode: production");
    }

    let shutdown = ShutdownHandle::new();
    if options.watch {
        println!("Watching for changes (Ctrl-C to stop)");
        shutdown.trigger_on_ctrl_c();
    }

    let report = project
        .builder()
        .with_options(options)
        .build(shutdown.signal())
        .await
        .context("Build failed")?;

    println!("\n✓ Built {}", report.manifest.display_name());
    println!("Output: {}", report.manifest_path.display());
    if let Some(dir) = &report.install_dir {
        println!("Installed to: {}", dir.display());
    }

    Ok(())
}
