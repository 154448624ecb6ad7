//! Import graph walk that drives the plugin hooks
//!
//! Starting at a target's entry point, every import found by [`scan_imports`]
//! is offered to the [`PluginSet`]. Relative imports are followed on disk;
//! package imports are left for the compiler to resolve.

use crate::scan::{SourceFlavor, scan_imports};
use addonkit_core::{
    Diagnostic, FILE_NAMESPACE, LoadArgs, PluginSet, ResolveArgs, ResolveDecision,
};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

/// Extensions tried, in order, for extension-less relative imports
const RESOLVE_EXTENSIONS: &[&str] = &[
    "tsx", "ts", "jsx", "js", "mjs", "cjs", "mts", "cts", "css", "json",
];

/// A module served by a plugin instead of the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualModule {
    /// Import specifier that was redirected
    pub specifier: String,
    /// Plugin namespace the module lives in
    pub namespace: String,
    /// Source returned by the plugin's load hook
    pub contents: String,
}

/// Everything learned by walking a target's imports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraph {
    /// Files visited, relative to the working directory, entry first
    pub modules: Vec<PathBuf>,
    /// Redirected imports and their loaded contents, one per specifier
    pub virtual_modules: Vec<VirtualModule>,
    /// Hook rejections and unreadable files
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleGraph {
    /// Walk the import graph of `entry` (relative to `working_dir`)
    pub fn walk(working_dir: &Path, entry: &Path, plugins: &PluginSet) -> Self {
        let mut graph = Self::default();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([normalize(entry)]);

        while let Some(module) = queue.pop_front() {
            if !seen.insert(module.clone()) {
                continue;
            }

            let source = match fs::read_to_string(working_dir.join(&module)) {
                Ok(source) => source,
                Err(e) => {
                    graph.diagnostics.push(
                        Diagnostic::new(format!("Could not read \"{}\": {e}", module.display()))
                            .with_file(&module),
                    );
                    continue;
                }
            };
            graph.modules.push(module.clone());

            let Some(flavor) = SourceFlavor::from_path(&module) else {
                continue;
            };

            for import in scan_imports(&source, flavor) {
                let args = ResolveArgs {
                    path: &import.specifier,
                    importer: &module,
                    namespace: FILE_NAMESPACE,
                    kind: import.kind,
                };

                match plugins.resolve(&args) {
                    Some(ResolveDecision::Reject(diagnostics)) => {
                        graph.diagnostics.extend(diagnostics);
                    }
                    Some(ResolveDecision::Redirect { path, namespace }) => {
                        graph.load_virtual(plugins, &import.specifier, &path, &namespace, &module);
                    }
                    None => {
                        let next = resolve_relative(working_dir, &module, &import.specifier)
                            .filter(|next| SourceFlavor::from_path(next).is_some());
                        if let Some(next) = next {
                            trace!(from = %module.display(), to = %next.display(), "Following import");
                            queue.push_back(next);
                        }
                    }
                }
            }
        }

        graph
    }

    /// Whether the walk found nothing that fails the target
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn load_virtual(
        &mut self,
        plugins: &PluginSet,
        specifier: &str,
        path: &str,
        namespace: &str,
        importer: &Path,
    ) {
        if self.virtual_modules.iter().any(|m| m.specifier == specifier) {
            return;
        }

        match plugins.load(&LoadArgs { path, namespace }) {
            Some(loaded) => self.virtual_modules.push(VirtualModule {
                specifier: specifier.to_string(),
                namespace: namespace.to_string(),
                contents: loaded.contents,
            }),
            None => self.diagnostics.push(
                Diagnostic::new(format!(
                    "No plugin loaded \"{path}\" in namespace \"{namespace}\""
                ))
                .with_file(importer),
            ),
        }
    }
}

/// Resolve a `./` or `../` import to an existing file, relative to the
/// working directory
fn resolve_relative(working_dir: &Path, importer: &Path, specifier: &str) -> Option<PathBuf> {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return None;
    }

    // Query strings and fragments (`./font.woff?#iefix`) are not part of the path
    let specifier = specifier.split(['?', '#']).next().unwrap_or(specifier);
    let base = normalize(&importer.parent().unwrap_or(Path::new("")).join(specifier));

    let mut candidates = vec![base.clone()];
    for ext in RESOLVE_EXTENSIONS {
        let mut with_ext = base.clone().into_os_string();
        with_ext.push(".");
        with_ext.push(ext);
        candidates.push(PathBuf::from(with_ext));
    }
    for ext in RESOLVE_EXTENSIONS {
        candidates.push(base.join(format!("index.{ext}")));
    }

    candidates
        .into_iter()
        .find(|candidate| working_dir.join(candidate).is_file())
}

/// Collapse `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
