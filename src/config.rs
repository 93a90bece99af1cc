use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

const CONFIG_DIR: &str = "quickclean";
const CONFIG_FILE: &str = "config.toml";

/// User configuration, read once per invocation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Browser family key -> enabled. Families not listed are enabled.
    #[serde(default)]
    pub browsers: BTreeMap<String, bool>,
    #[serde(default)]
    pub paths: PathOverrides,
}

/// Replacements for the resolved platform roots. Values are env-expanded.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PathOverrides {
    pub temp: Option<String>,
    pub roaming: Option<String>,
    pub local: Option<String>,
    pub cache: Option<String>,
    pub os_root: Option<String>,
}

impl Config {
    /// Load `explicit` if given, otherwise the default file if present.
    ///
    /// A missing default file yields the built-in defaults; an explicit path
    /// must exist and parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).map_err(|e| EngineError::ConfigRead(path.to_path_buf(), e))?;
        let cfg = Self::parse(&text).map_err(|e| EngineError::ConfigParse(path.to_path_buf(), e))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn browser_enabled(&self, key: &str) -> bool {
        self.browsers.get(key).copied().unwrap_or(true)
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_enables_everything() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg.browser_enabled("chrome"));
    }

    #[test]
    fn test_parse_browsers_and_paths() {
        let cfg = Config::parse(
            r#"
            [browsers]
            chrome = true
            firefox = false

            [paths]
            temp = "%TEMP%"
            cache = "~/.cache"
            "#,
        )
        .unwrap();

        assert!(cfg.browser_enabled("chrome"));
        assert!(!cfg.browser_enabled("firefox"));
        assert!(cfg.browser_enabled("opera"));
        assert_eq!(cfg.paths.temp.as_deref(), Some("%TEMP%"));
        assert_eq!(cfg.paths.cache.as_deref(), Some("~/.cache"));
        assert!(cfg.paths.roaming.is_none());
    }

    #[test]
    fn test_unknown_path_key_rejected() {
        assert!(Config::parse("[paths]\nwindir = \"C:/Windows\"\n").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, EngineError::ConfigRead(..)));
    }

    #[test]
    fn test_explicit_bad_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[browsers]\nchrome = \"yes\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(..)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[browsers]\nedge = false\n").unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        assert!(!cfg.browser_enabled("edge"));
    }
}
