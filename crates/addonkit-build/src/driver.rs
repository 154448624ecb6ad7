//! Concurrent compilation of a build's targets

use crate::compiler::{CompileSettings, Compiler};
use crate::target::Target;
use addonkit_core::{BuildOutcome, PluginSet, TargetFailure};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs every target of a round against one compiler and one hook set
#[derive(Clone)]
pub struct Driver {
    compiler: Arc<dyn Compiler>,
    plugins: PluginSet,
    settings: CompileSettings,
}

impl Driver {
    pub fn new(compiler: Arc<dyn Compiler>, plugins: PluginSet, settings: CompileSettings) -> Self {
        Self {
            compiler,
            plugins,
            settings,
        }
    }

    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    pub fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    /// Compile all targets concurrently and wait for every one to settle
    ///
    /// A failing target never cancels the others. Outputs already written by
    /// successful targets are kept when another target fails.
    pub async fn compile_all(&self, targets: &[Target]) -> BuildOutcome {
        let jobs = targets.iter().map(|target| async move {
            debug!(entry = %target.entry_point.display(), output = %target.output_path.display(), "Compiling");
            let result = self
                .compiler
                .compile(target, &self.settings, &self.plugins)
                .await;
            (target, result)
        });

        let mut outcome = BuildOutcome::default();
        for (target, result) in join_all(jobs).await {
            match result {
                Ok(output) => outcome.outputs.extend(output.outputs),
                Err(diagnostics) => outcome.failures.push(TargetFailure {
                    entry_point: target.entry_point.clone(),
                    output_path: target.output_path.clone(),
                    diagnostics,
                }),
            }
        }

        info!(
            targets = targets.len(),
            failed = outcome.failures.len(),
            "Compilation finished"
        );
        outcome
    }

    /// Hand the settled round to every plugin's end hook
    pub fn finish(&self, outcome: &BuildOutcome) {
        self.plugins.end(outcome);
    }
}
