//! Compiler plugin hooks
//!
//! A [`Plugin`] observes module resolution, module loading and the end of a
//! build round. Any compiler that walks an import graph can drive a
//! [`PluginSet`]; nothing here assumes a particular compiler's plugin ABI.

use crate::{Diagnostic, FILE_NAMESPACE, TargetFailure};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How an import was expressed in source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import ... from "x"`, `import "x"`, `export ... from "x"`
    ImportStatement,
    /// `import("x")`
    DynamicImport,
    /// `require("x")`
    RequireCall,
    /// CSS `@import "x"`
    ImportRule,
    /// CSS `url(x)`
    UrlToken,
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportKind::ImportStatement => write!(f, "import-statement"),
            ImportKind::DynamicImport => write!(f, "dynamic-import"),
            ImportKind::RequireCall => write!(f, "require-call"),
            ImportKind::ImportRule => write!(f, "import-rule"),
            ImportKind::UrlToken => write!(f, "url-token"),
        }
    }
}

/// A resolution request offered to plugins
#[derive(Debug, Clone, Copy)]
pub struct ResolveArgs<'a> {
    /// The import specifier exactly as written
    pub path: &'a str,
    /// File containing the import
    pub importer: &'a Path,
    /// Namespace of the importing module
    pub namespace: &'a str,
    /// How the import was written
    pub kind: ImportKind,
}

/// What a plugin decided about an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveDecision {
    /// Serve the import from a plugin-owned namespace instead of the filesystem
    Redirect { path: String, namespace: String },
    /// Fail the target with these diagnostics
    Reject(Vec<Diagnostic>),
}

/// A load request for a module in a plugin-owned namespace
#[derive(Debug, Clone, Copy)]
pub struct LoadArgs<'a> {
    pub path: &'a str,
    pub namespace: &'a str,
}

/// Module source returned by a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub contents: String,
}

impl LoadResult {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }
}

/// Result of one build round, handed to [`Plugin::on_end`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Output files that were written
    pub outputs: Vec<PathBuf>,
    /// Targets that failed
    pub failures: Vec<TargetFailure>,
}

impl BuildOutcome {
    /// Whether every target compiled
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Hooks a compiler invokes while building a target
///
/// Every hook has a no-op default, so a plugin only implements what it needs.
/// Returning `None` from `on_resolve` or `on_load` passes the request on to
/// the next plugin, and finally to the compiler's own behaviour.
pub trait Plugin: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    fn on_resolve(&self, _args: &ResolveArgs<'_>) -> Option<ResolveDecision> {
        None
    }

    fn on_load(&self, _args: &LoadArgs<'_>) -> Option<LoadResult> {
        None
    }

    /// Called once after every target of a build round has settled
    fn on_end(&self, _outcome: &BuildOutcome) {}
}

/// Ordered collection of plugins; the first plugin to answer wins
#[derive(Clone, Default)]
pub struct PluginSet {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin
    pub fn with(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Append an already shared plugin
    pub fn with_shared(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Offer an import to each plugin in order
    ///
    /// Rejection diagnostics are tagged with the rejecting plugin's name and
    /// the importing file.
    pub fn resolve(&self, args: &ResolveArgs<'_>) -> Option<ResolveDecision> {
        self.plugins.iter().find_map(|plugin| {
            plugin.on_resolve(args).map(|decision| match decision {
                ResolveDecision::Reject(diagnostics) => ResolveDecision::Reject(
                    diagnostics
                        .into_iter()
                        .map(|d| tag(d, plugin.name(), args))
                        .collect(),
                ),
                redirect => redirect,
            })
        })
    }

    /// Ask each plugin in order for the contents of a namespaced module
    pub fn load(&self, args: &LoadArgs<'_>) -> Option<LoadResult> {
        self.plugins.iter().find_map(|plugin| plugin.on_load(args))
    }

    /// Notify every plugin that a build round finished
    pub fn end(&self, outcome: &BuildOutcome) {
        for plugin in &self.plugins {
            plugin.on_end(outcome);
        }
    }
}

impl fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

fn tag(mut diagnostic: Diagnostic, plugin: &str, args: &ResolveArgs<'_>) -> Diagnostic {
    if diagnostic.plugin.is_none() {
        diagnostic.plugin = Some(plugin.to_string());
    }
    if diagnostic.file.is_none() && args.namespace == FILE_NAMESPACE {
        diagnostic.file = Some(args.importer.to_path_buf());
    }
    diagnostic
}
