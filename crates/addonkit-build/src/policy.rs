//! Resolution policy for the host-provided namespace
//!
//! The host exposes its API as a runtime global. Addons import it by its bare
//! name and the compiled output reads the global instead of bundling code.

use addonkit_core::{
    AddonError, BuildConfig, Diagnostic, ImportKind, LoadArgs, LoadResult, Plugin, ResolveArgs,
    ResolveDecision,
};

/// Plugin name reported in diagnostics
pub const GLOBAL_MODULES_PLUGIN: &str = "globalModules";

/// Redirects the bare reserved import to a runtime-global stub and rejects
/// its sub-paths
#[derive(Debug, Clone)]
pub struct GlobalModulesPlugin {
    namespace: String,
    runtime_global: String,
}

impl GlobalModulesPlugin {
    pub fn new(namespace: impl Into<String>, runtime_global: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            runtime_global: runtime_global.into(),
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(&config.reserved_namespace, &config.runtime_global)
    }

    /// Source of the stub module the bare import resolves to
    pub fn stub_source(&self) -> String {
        format!("module.exports = {}", self.runtime_global)
    }

    fn is_sub_path(&self, path: &str) -> bool {
        path.strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some()
    }
}

impl Default for GlobalModulesPlugin {
    fn default() -> Self {
        Self::from_config(&BuildConfig::default())
    }
}

impl Plugin for GlobalModulesPlugin {
    fn name(&self) -> &str {
        GLOBAL_MODULES_PLUGIN
    }

    fn on_resolve(&self, args: &ResolveArgs<'_>) -> Option<ResolveDecision> {
        if args.kind != ImportKind::ImportStatement {
            return None;
        }

        if args.path == self.namespace {
            return Some(ResolveDecision::Redirect {
                path: args.path.to_string(),
                namespace: self.namespace.clone(),
            });
        }

        if self.is_sub_path(args.path) {
            let error = AddonError::ReservedImportPath {
                path: args.path.to_string(),
                namespace: self.namespace.clone(),
            };
            return Some(ResolveDecision::Reject(vec![Diagnostic::new(
                error.to_string(),
            )]));
        }

        None
    }

    fn on_load(&self, args: &LoadArgs<'_>) -> Option<LoadResult> {
        (args.namespace == self.namespace).then(|| LoadResult::new(self.stub_source()))
    }
}
