//! [`Compiler`] backed by the `esbuild` executable
//!
//! esbuild runs as a child process and cannot call back into the plugin
//! hooks, so the import graph is walked first. Rejections fail the target
//! before esbuild starts; redirected imports are written as stub files in a
//! scratch directory and handed to esbuild with `--alias`.
//!
//! esbuild applies an alias to every import of the name, `require()` and
//! `import()` included, and to its sub-paths. Once any import statement
//! redirects `replugged`, a `require("replugged")` in the same target also
//! gets the runtime global, and sub-path `require()`/`import()` calls of it
//! fail to resolve.

use crate::compiler::{CompileOutput, CompileSettings, Compiler};
use crate::graph::{ModuleGraph, VirtualModule};
use crate::target::Target;
use addonkit_core::{AddonError, AddonResult, Diagnostic, PluginSet};
use async_trait::async_trait;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

/// Prefix of the per-target scratch directories inside the working directory
pub const SCRATCH_PREFIX: &str = ".addonkit-";

const ESBUILD: &str = "esbuild";

#[allow(clippy::expect_used)]
static LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+(\S.*?):\d+:\d+:$").expect("invalid regex"));

/// Drives `esbuild` as a subprocess
///
/// The executable is looked up on first use, so builds that compile nothing
/// never need it.
#[derive(Debug, Clone)]
pub struct EsbuildCompiler {
    project_dir: PathBuf,
    binary: OnceCell<PathBuf>,
}

impl EsbuildCompiler {
    /// Use an explicit esbuild executable
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: PathBuf::new(),
            binary: OnceCell::with_value(binary.into()),
        }
    }

    /// Find esbuild for `project_dir` when it is first needed
    pub fn discover(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            binary: OnceCell::new(),
        }
    }

    /// Find esbuild now: the project's `node_modules/.bin` first, then `PATH`
    pub fn locate(working_dir: &Path) -> AddonResult<Self> {
        let compiler = Self::discover(working_dir);
        compiler.resolve_binary()?;
        Ok(compiler)
    }

    /// The executable, once it has been found
    pub fn binary(&self) -> Option<&Path> {
        self.binary.get().map(PathBuf::as_path)
    }

    fn resolve_binary(&self) -> AddonResult<&Path> {
        self.binary
            .get_or_try_init(|| find_binary(&self.project_dir))
            .map(PathBuf::as_path)
    }

    /// Command-line arguments for one target
    ///
    /// `aliases` maps an import specifier to a path relative to the working
    /// directory.
    pub fn arguments(
        target: &Target,
        settings: &CompileSettings,
        aliases: &[(String, String)],
    ) -> Vec<String> {
        let mut args = vec![target.entry_point.to_string_lossy().into_owned()];

        if settings.bundle {
            args.push("--bundle".to_string());
        }
        args.push(format!("--format={}", settings.format));
        args.push(format!("--log-level={}", settings.log_level));
        if settings.minify {
            args.push("--minify".to_string());
        }
        args.push(format!("--platform={}", settings.platform));
        if settings.sourcemap {
            args.push("--sourcemap".to_string());
        }
        args.push(format!("--target={}", settings.engine_target));
        args.push(format!("--outfile={}", target.output_path.to_string_lossy()));
        args.push("--color=false".to_string());

        for (ext, loader) in &target.loaders {
            args.push(format!("--loader:{ext}={}", loader.as_str()));
        }
        for (specifier, path) in aliases {
            args.push(format!("--alias:{specifier}={path}"));
        }

        args
    }

    async fn run(
        &self,
        target: &Target,
        settings: &CompileSettings,
        graph: ModuleGraph,
    ) -> Result<CompileOutput, Vec<Diagnostic>> {
        let binary = self
            .resolve_binary()
            .map_err(|e| vec![Diagnostic::new(e.to_string())])?;
        let (scratch, aliases) =
            write_stubs(&settings.working_dir, &target.output_path, &graph.virtual_modules)
                .map_err(|e| vec![Diagnostic::new(format!("Failed to write module stubs: {e}"))])?;

        if let Some(parent) = settings.resolve(&target.output_path).parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                vec![Diagnostic::new(format!(
                    "Failed to create {}: {e}",
                    parent.display()
                ))]
            })?;
        }

        let args = Self::arguments(target, settings, &aliases);
        debug!(binary = %binary.display(), ?args, "Running esbuild");

        let output = Command::new(binary)
            .args(&args)
            .current_dir(&settings.working_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                vec![Diagnostic::new(format!(
                    "Failed to run {}: {e}",
                    binary.display()
                ))]
            })?;

        // Stubs must outlive the esbuild process
        drop(scratch);

        let stderr = String::from_utf8_lossy(&output.stderr);
        let messages = parse_messages(&stderr);

        if !output.status.success() {
            if messages.errors.is_empty() {
                let text = match stderr.trim() {
                    "" => format!("esbuild exited with {}", output.status),
                    trimmed => trimmed.to_string(),
                };
                return Err(vec![Diagnostic::new(text)]);
            }
            return Err(messages.errors);
        }

        for line in stderr.lines().filter(|line| !line.trim().is_empty()) {
            debug!(entry = %target.entry_point.display(), "{line}");
        }
        for warning in &messages.warnings {
            warn!(entry = %target.entry_point.display(), "{warning}");
        }

        let mut outputs = vec![target.output_path.clone()];
        if settings.sourcemap {
            let mut map = target.output_path.clone().into_os_string();
            map.push(".map");
            let map = PathBuf::from(map);
            if settings.resolve(&map).is_file() {
                outputs.push(map);
            }
        }

        Ok(CompileOutput {
            outputs,
            warnings: messages.warnings,
        })
    }
}

#[async_trait]
impl Compiler for EsbuildCompiler {
    fn prepare(&self) -> AddonResult<()> {
        self.resolve_binary().map(|_| ())
    }

    async fn compile(
        &self,
        target: &Target,
        settings: &CompileSettings,
        plugins: &PluginSet,
    ) -> Result<CompileOutput, Vec<Diagnostic>> {
        let working_dir = settings.working_dir.clone();
        let entry = target.entry_point.clone();
        let plugins = plugins.clone();

        let graph = tokio::task::spawn_blocking(move || {
            ModuleGraph::walk(&working_dir, &entry, &plugins)
        })
        .await
        .map_err(|e| vec![Diagnostic::new(format!("Import scan failed: {e}"))])?;

        if !graph.is_ok() {
            return Err(graph.diagnostics);
        }

        self.run(target, settings, graph).await
    }
}

fn find_binary(project_dir: &Path) -> AddonResult<PathBuf> {
    let local_name = if cfg!(windows) { "esbuild.cmd" } else { ESBUILD };
    let local = project_dir.join("node_modules").join(".bin").join(local_name);
    if local.is_file() {
        debug!(binary = %local.display(), "Using project esbuild");
        return Ok(local);
    }

    which::which(ESBUILD).map_err(|_| {
        AddonError::CompilerUnavailable(format!(
            "{ESBUILD} not found in node_modules/.bin or PATH (install it with `npm i -D esbuild`)"
        ))
    })
}

/// Write each virtual module to the target's scratch directory inside
/// `working_dir`
///
/// The directory name depends only on the output path, so development
/// builds and source maps name the same stub paths on every run. Returns the
/// directory guard and `(specifier, ./relative/path)` aliases.
fn write_stubs(
    working_dir: &Path,
    output_path: &Path,
    modules: &[VirtualModule],
) -> std::io::Result<(Option<TempDir>, Vec<(String, String)>)> {
    if modules.is_empty() {
        return Ok((None, Vec::new()));
    }

    let dir_name = scratch_dir_name(output_path);
    // Left behind by an interrupted build
    match std::fs::remove_dir_all(working_dir.join(&dir_name)) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let scratch = tempfile::Builder::new()
        .prefix(&dir_name)
        .rand_bytes(0)
        .tempdir_in(working_dir)?;

    let mut aliases = Vec::with_capacity(modules.len());
    for (index, module) in modules.iter().enumerate() {
        let file_name = format!("{index}-{}.js", sanitize(&module.specifier));
        std::fs::write(scratch.path().join(&file_name), &module.contents)?;
        aliases.push((module.specifier.clone(), format!("./{dir_name}/{file_name}")));
    }

    Ok((Some(scratch), aliases))
}

/// `.addonkit-dist_renderer_js` for `dist/renderer.js`
fn scratch_dir_name(output_path: &Path) -> String {
    format!("{SCRATCH_PREFIX}{}", sanitize(&output_path.to_string_lossy()))
}

fn sanitize(specifier: &str) -> String {
    specifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Errors and warnings printed by esbuild
#[derive(Debug, Default, PartialEq, Eq)]
struct Messages {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

enum Severity {
    Error,
    Warning,
}

impl Messages {
    fn push(&mut self, message: Option<(Severity, Diagnostic)>) {
        match message {
            Some((Severity::Error, diagnostic)) => self.errors.push(diagnostic),
            Some((Severity::Warning, diagnostic)) => self.warnings.push(diagnostic),
            None => {}
        }
    }
}

/// Parse esbuild's `[ERROR]` / `[WARNING]` blocks
///
/// A block starts with the marker line; the first `file:line:col:` line
/// inside it names the file.
fn parse_messages(stderr: &str) -> Messages {
    let mut messages = Messages::default();
    let mut current: Option<(Severity, Diagnostic)> = None;

    for line in stderr.lines() {
        if let Some((_, text)) = line.split_once("[ERROR] ") {
            messages.push(current.take());
            current = Some((Severity::Error, Diagnostic::new(text.trim())));
        } else if let Some((_, text)) = line.split_once("[WARNING] ") {
            messages.push(current.take());
            current = Some((Severity::Warning, Diagnostic::new(text.trim())));
        } else if let Some((_, diagnostic)) = current.as_mut()
            && diagnostic.file.is_none()
            && let Some(captures) = LOCATION.captures(line)
        {
            diagnostic.file = Some(PathBuf::from(&captures[1]));
        }
    }
    messages.push(current);

    messages
}

#[cfg(test)]
#[path = "esbuild/esbuild_tests.rs"]
mod esbuild_tests;
