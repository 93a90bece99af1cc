//! Platform base directories and environment-style path expansion.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::PathOverrides;
use crate::error::{EngineError, Result};

/// The roots every cleanup location is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    pub home: PathBuf,
    /// The user temporary directory.
    pub temp: PathBuf,
    /// Per-user roaming application data (`%APPDATA%`, `~/.config`,
    /// `~/Library/Application Support`).
    pub roaming: PathBuf,
    /// Per-user local application data (`%LOCALAPPDATA%`, `~/.local/share`).
    pub local: PathBuf,
    /// Per-user cache root (`~/.cache`, `~/Library/Caches`; local app data on Windows).
    pub cache: PathBuf,
    /// OS installation root.
    pub os_root: PathBuf,
}

impl PlatformDirs {
    /// Resolve from the environment, with configured overrides taking precedence.
    pub fn resolve(overrides: &PathOverrides) -> Result<Self> {
        let home = dirs::home_dir().ok_or(EngineError::MissingDirectory("home"))?;
        let pick = |value: &Option<String>, fallback: Option<PathBuf>, what: &'static str| {
            match value {
                Some(raw) => Ok(expand(raw)),
                None => fallback.ok_or(EngineError::MissingDirectory(what)),
            }
        };

        let resolved = Self {
            temp: pick(&overrides.temp, Some(env::temp_dir()), "temporary")?,
            roaming: pick(&overrides.roaming, dirs::config_dir(), "roaming application data")?,
            local: pick(&overrides.local, dirs::data_local_dir(), "local application data")?,
            cache: pick(&overrides.cache, dirs::cache_dir(), "cache")?,
            os_root: pick(&overrides.os_root, Some(default_os_root()), "OS root")?,
            home,
        };

        for (what, path) in resolved.named() {
            if path.as_os_str().is_empty() {
                return Err(EngineError::MissingDirectory(what));
            }
        }
        tracing::debug!(dirs = ?resolved, "resolved platform directories");
        Ok(resolved)
    }

    fn named(&self) -> [(&'static str, &PathBuf); 6] {
        [
            ("home", &self.home),
            ("temporary", &self.temp),
            ("roaming application data", &self.roaming),
            ("local application data", &self.local),
            ("cache", &self.cache),
            ("OS root", &self.os_root),
        ]
    }
}

#[cfg(windows)]
fn default_os_root() -> PathBuf {
    env::var_os("WINDIR")
        .or_else(|| env::var_os("SystemRoot"))
        .map_or_else(|| PathBuf::from(r"C:\Windows"), PathBuf::from)
}

#[cfg(not(windows))]
fn default_os_root() -> PathBuf {
    PathBuf::from("/")
}

/// Join a `/`-separated relative location onto `base` component by component.
pub fn nested(base: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|part| !part.is_empty())
        .fold(base.to_path_buf(), |acc, part| acc.join(part))
}

/// Expand `~`, `%VAR%`, `$VAR` and `${VAR}` using the process environment.
pub fn expand(raw: &str) -> PathBuf {
    expand_with(raw, dirs::home_dir(), |name| env::var(name).ok())
}

/// Expansion with an explicit home directory and variable lookup.
///
/// Unknown variables and unterminated references are left as written.
pub fn expand_with(
    raw: &str,
    home: Option<PathBuf>,
    lookup: impl Fn(&str) -> Option<String>,
) -> PathBuf {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(&['%', '$'][..]) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let (name, consumed) = if let Some(inner) = tail.strip_prefix('%') {
            match inner.find('%') {
                Some(end) => (&inner[..end], end + 2),
                None => ("", 0),
            }
        } else if let Some(inner) = tail.strip_prefix("${") {
            match inner.find('}') {
                Some(end) => (&inner[..end], end + 3),
                None => ("", 0),
            }
        } else {
            let inner = &tail[1..];
            let end = inner
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(inner.len());
            (&inner[..end], end + 1)
        };

        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => {
                out.push_str(&value);
                rest = &tail[consumed..];
            }
            _ => {
                // Keep the sigil and move on.
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    if let (Some(home), Some(after)) = (home, out.strip_prefix('~')) {
        if after.is_empty() {
            return home;
        }
        if after.starts_with(&['/', '\\'][..]) {
            return home.join(after.trim_start_matches(&['/', '\\'][..]));
        }
    }
    PathBuf::from(out)
}
