//! addonkit-build - Build, install, and packaging pipeline
//!
//! This crate provides:
//! - [`enumerate_targets`] for deriving compilation targets from a manifest
//!   and the theme directory
//! - [`GlobalModulesPlugin`], the resolution policy for the host namespace
//! - [`Compiler`] and its esbuild implementation, [`EsbuildCompiler`]
//! - [`Driver`] for compiling every target concurrently
//! - [`InstallPlugin`] for copying output into the host's plugin directory
//! - [`AddonBuilder`] tying it together: `build_once`, `build` (with watch
//!   mode), and `package`

mod compiler;
mod driver;
mod esbuild;
mod graph;
mod install;
mod package;
mod pipeline;
mod policy;
mod scan;
mod shutdown;
mod target;
mod watch;

pub use compiler::{CompileOutput, CompileSettings, Compiler, OutputFormat, TargetPlatform};
pub use driver::Driver;
pub use esbuild::{EsbuildCompiler, SCRATCH_PREFIX};
pub use graph::{ModuleGraph, VirtualModule};
pub use install::{InstallPlugin, PLUGINS_DIR, install_dir, install_output};
pub use package::PackageReport;
pub use pipeline::{AddonBuilder, BuildReport};
pub use policy::{GLOBAL_MODULES_PLUGIN, GlobalModulesPlugin};
pub use scan::{ImportRef, SourceFlavor, scan_imports};
pub use shutdown::{ShutdownHandle, ShutdownSignal};
pub use target::{Loader, THEME_OUTPUT_DIR, Target, TargetKind, enumerate_targets};
pub use watch::SourceWatcher;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AddonBuilder, BuildReport, Compiler, EsbuildCompiler, PackageReport, ShutdownHandle,
        ShutdownSignal,
    };
}
