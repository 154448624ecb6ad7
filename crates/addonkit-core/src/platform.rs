//! Host platform detection and configuration root lookup.

use std::fmt;
use std::path::PathBuf;

/// Operating system families with distinct configuration-root rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    /// `%APPDATA%\<folder>`
    Windows,
    /// `$HOME/Library/Application Support/<folder>`
    MacOs,
    /// `$XDG_CONFIG_HOME/<folder>`, else `$HOME/.config/<folder>`
    Unix,
}

impl HostPlatform {
    /// Detect the current platform at runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(std::env::consts::OS)
    }

    /// Map an OS identifier (`std::env::consts::OS` or a Node-style
    /// `process.platform` value) to a platform family.
    ///
    /// Anything that is not Windows or macOS follows the XDG rule.
    #[must_use]
    pub fn parse(os: &str) -> Self {
        match os {
            "windows" | "win32" => Self::Windows,
            "macos" | "darwin" => Self::MacOs,
            _ => Self::Unix,
        }
    }

    /// Get the platform key string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Unix => "unix",
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compute the host application's per-user configuration root.
///
/// `env` looks up environment variables; pass `|key| std::env::var(key).ok()`
/// for the real process environment. A missing variable becomes an empty
/// path segment, so the result may be relative but never panics.
///
/// # Example
///
/// ```
/// use addonkit_core::{HostPlatform, resolve_config_root};
/// use std::path::PathBuf;
///
/// let root = resolve_config_root(HostPlatform::Unix, "replugged", |key| match key {
///     "HOME" => Some("/home/ada".to_string()),
///     _ => None,
/// });
/// assert_eq!(root, PathBuf::from("/home/ada/.config/replugged"));
/// ```
pub fn resolve_config_root<F>(platform: HostPlatform, folder: &str, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| env(key).unwrap_or_default();

    match platform {
        HostPlatform::Windows => PathBuf::from(var("APPDATA")).join(folder),
        HostPlatform::MacOs => PathBuf::from(var("HOME"))
            .join("Library")
            .join("Application Support")
            .join(folder),
        HostPlatform::Unix => match env("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            Some(xdg) => PathBuf::from(xdg).join(folder),
            None => PathBuf::from(var("HOME")).join(".config").join(folder),
        },
    }
}
