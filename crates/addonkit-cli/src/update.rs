//! Best-effort "new version available" hint
//!
//! The latest published version is cached on disk and refreshed at most once
//! a day. The refresh gets a short grace period; the hint is printed from the
//! cache, so a slow registry only delays the hint until the next run.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

const PACKAGE: &str = env!("CARGO_PKG_NAME");
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");
const REGISTRY_URL: &str = "https://crates.io/api/v1/crates";
const CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const GRACE_PERIOD: Duration = Duration::from_millis(750);

/// Environment variables that turn the check off
const DISABLE_VARS: &[&str] = &["NO_UPDATE_NOTIFIER", "CI"];

/// Run the check for this binary unless disabled; never fails
pub async fn notify() {
    if is_disabled(|key| std::env::var(key).ok()) {
        return;
    }
    let Some(cache_path) = default_cache_path() else {
        return;
    };
    let Ok(current) = Version::parse(CURRENT_VERSION) else {
        return;
    };

    UpdateNotifier::new(PACKAGE, current, cache_path)
        .notify()
        .await;
}

/// Whether any disabling variable is set to a non-empty value
pub fn is_disabled<F>(env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    DISABLE_VARS
        .iter()
        .any(|key| env(key).is_some_and(|value| !value.is_empty()))
}

fn default_cache_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("addonkit").join("update-check.json"))
}

/// What the last refresh found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCache {
    /// Unix seconds of the last successful refresh
    pub last_check: u64,
    pub latest: Option<String>,
}

#[derive(Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Deserialize)]
struct CrateInfo {
    max_stable_version: Option<String>,
    max_version: String,
}

/// Checks a crates.io package for a newer release
pub struct UpdateNotifier {
    package: String,
    current: Version,
    cache_path: PathBuf,
    registry_url: String,
}

impl UpdateNotifier {
    pub fn new(package: impl Into<String>, current: Version, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            package: package.into(),
            current,
            cache_path: cache_path.into(),
            registry_url: REGISTRY_URL.to_string(),
        }
    }

    /// Refresh the cache if it is stale, then print a hint if one applies
    pub async fn notify(&self) {
        let cache = read_cache(&self.cache_path);

        if is_stale(&cache, now_secs()) {
            match tokio::time::timeout(GRACE_PERIOD, self.refresh()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("Update check failed: {e}"),
                Err(_) => debug!("Update check timed out"),
            }
        }

        if let Some(latest) = self.pending_update(&read_cache(&self.cache_path)) {
            eprintln!(
                "\nUpdate available: {} → {latest}\nRun `cargo install {}` to update.",
                self.current, self.package
            );
        }
    }

    /// A cached version newer than the running one
    pub fn pending_update(&self, cache: &UpdateCache) -> Option<Version> {
        cache
            .latest
            .as_deref()
            .and_then(|latest| Version::parse(latest).ok())
            .filter(|latest| *latest > self.current)
    }

    async fn refresh(&self) -> anyhow::Result<()> {
        let client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", self.package, self.current))
            .build()?;

        let response: CrateResponse = client
            .get(format!("{}/{}", self.registry_url, self.package))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let latest = response
            .krate
            .max_stable_version
            .unwrap_or(response.krate.max_version);

        write_cache(
            &self.cache_path,
            &UpdateCache {
                last_check: now_secs(),
                latest: Some(latest),
            },
        )
    }
}

fn is_stale(cache: &UpdateCache, now: u64) -> bool {
    now.saturating_sub(cache.last_check) >= CHECK_INTERVAL.as_secs()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// A missing or unreadable cache reads as never checked
fn read_cache(path: &Path) -> UpdateCache {
    std::fs::read(path)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

fn write_cache(path: &Path, cache: &UpdateCache) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec(cache)?)?;
    Ok(())
}
