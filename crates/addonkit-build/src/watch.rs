//! Source watching for `build --watch`
//!
//! ```text
//! filesystem events (notify)
//!   → drop events under ignored dirs (output, packages, node_modules, .git,
//!     compiler scratch dirs, an install location inside the tree)
//!   → debounce until the burst goes quiet
//!   → hand the changed paths to the build loop
//! ```

use crate::esbuild::SCRATCH_PREFIX;
use crate::shutdown::ShutdownSignal;
use addonkit_core::{AddonError, AddonResult, BuildConfig};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Directory names never watched, in addition to the configured output and
/// package directories
pub const IGNORED_DIRS: &[&str] = &["node_modules", ".git"];

/// Watches an addon directory and reports settled bursts of changes
pub struct SourceWatcher {
    root: PathBuf,
    ignored: Vec<String>,
    /// Relative to `root`
    ignored_paths: Vec<PathBuf>,
    debounce: Duration,
    /// Dropping the watcher stops filesystem monitoring
    _watcher: RecommendedWatcher,
    raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
}

impl SourceWatcher {
    /// Start watching `root` recursively
    pub fn new(root: &Path, config: &BuildConfig) -> AddonResult<Self> {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = raw_tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|e| watch_error(format!("filesystem watcher: {e}")))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| watch_error(format!("watch {}: {e}", root.display())))?;
        info!(path = %root.display(), "Watching for changes");

        let mut ignored: Vec<String> = IGNORED_DIRS.iter().map(|d| d.to_string()).collect();
        ignored.extend(first_component(&config.out_dir));
        ignored.extend(first_component(&config.package_dir));

        Ok(Self {
            root,
            ignored,
            ignored_paths: Vec::new(),
            debounce: Duration::from_millis(config.watch_debounce_ms),
            _watcher: watcher,
            raw_rx,
        })
    }

    /// Also ignore everything under `relative` (relative to the watch root)
    pub fn with_ignored_path(mut self, relative: impl Into<PathBuf>) -> Self {
        let relative = relative.into();
        if relative.components().any(|c| matches!(c, Component::Normal(_))) {
            debug!(path = %relative.display(), "Ignoring path");
            self.ignored_paths.push(relative);
        }
        self
    }

    /// Wait for the next burst of relevant changes to settle
    ///
    /// Returns `None` once shutdown is signalled or the watcher stops.
    pub async fn next_change(&mut self, signal: &mut ShutdownSignal) -> Option<Vec<PathBuf>> {
        let mut changed = BTreeSet::new();
        let mut deadline: Option<Instant> = None;

        loop {
            let settle_at = deadline;
            tokio::select! {
                biased;

                () = signal.wait() => {
                    debug!("Shutdown requested, stopping watcher");
                    return None;
                }

                () = async move {
                    match settle_at {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    return Some(changed.into_iter().collect());
                }

                event = self.raw_rx.recv() => match event {
                    Some(Ok(event)) => {
                        if self.collect(&event, &mut changed) {
                            deadline = Some(Instant::now() + self.debounce);
                        }
                    }
                    Some(Err(e)) => warn!(error = %e, "Filesystem watcher error"),
                    None => {
                        debug!("Filesystem watcher channel closed, stopping");
                        return None;
                    }
                },
            }
        }
    }

    /// Record the event's relevant paths; `true` if any were recorded
    fn collect(&self, event: &Event, changed: &mut BTreeSet<PathBuf>) -> bool {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
            _ => return false,
        }

        let mut any = false;
        for path in &event.paths {
            if is_ignored(&self.root, path, &self.ignored, &self.ignored_paths) {
                continue;
            }
            debug!(path = %path.display(), kind = ?event.kind, "Change detected");
            changed.insert(path.clone());
            any = true;
        }
        any
    }
}

fn watch_error(message: String) -> AddonError {
    AddonError::Io(std::io::Error::other(message))
}

fn first_component(path: &Path) -> Option<String> {
    path.components().find_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// Whether `path` lies under an ignored directory of `root`
fn is_ignored(root: &Path, path: &Path, ignored: &[String], ignored_paths: &[PathBuf]) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return true;
    };
    if ignored_paths.iter().any(|ignored| relative.starts_with(ignored)) {
        return true;
    }

    let mut dirs = relative.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy()),
        _ => None,
    });

    match dirs.next() {
        Some(top) => {
            top.starts_with(SCRATCH_PREFIX)
                || ignored.iter().any(|name| *name == top)
                || dirs.any(|name| IGNORED_DIRS.contains(&&*name))
        }
        None => false,
    }
}
