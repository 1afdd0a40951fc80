// src/config.rs

use crate::error::{MonitorError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = ".monitor_config.yaml";

/// On-disk shape of the config file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    ignore_patterns: Option<Vec<String>>,
    file_extensions_to_check: Option<Vec<String>>,
}

/// Which changed paths the analyzer looks at. Loaded once, then read-only.
#[derive(Debug, Clone)]
pub struct IgnoreConfig {
    pub ignore_patterns: Vec<String>,
    pub file_extensions: Vec<String>,
    matcher: GlobSet,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            file_extensions: default_extensions(),
            matcher: GlobSet::empty(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![".py".to_string()]
}

impl IgnoreConfig {
    pub fn new(ignore_patterns: Vec<String>, file_extensions: Vec<String>) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &ignore_patterns {
            // fnmatch semantics: `*` crosses directory separators
            let glob = GlobBuilder::new(pattern)
                .literal_separator(false)
                .build()
                .map_err(|e| MonitorError::config(format!("invalid ignore pattern '{pattern}': {e}")))?;
            builder.add(glob);
        }
        let matcher = builder
            .build()
            .map_err(|e| MonitorError::config(format!("failed to compile ignore patterns: {e}")))?;

        Ok(Self { ignore_patterns, file_extensions, matcher })
    }

    /// Loads the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_yaml(&content).map_err(|e| match e {
                    MonitorError::Config(msg) => MonitorError::config(format!("{}: {msg}", path.display())),
                    other => other,
                })?;
                tracing::debug!(
                    path = %path.display(),
                    ignore = ?config.ignore_patterns,
                    extensions = ?config.file_extensions,
                    "loaded config"
                );
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(MonitorError::config(format!("cannot read {}: {e}", path.display()))),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<RawConfig> = serde_yaml::from_str(content).map_err(|e| MonitorError::config(e.to_string()))?;
        let raw = raw.unwrap_or_default();

        Self::new(
            raw.ignore_patterns.unwrap_or_default(),
            raw.file_extensions_to_check.unwrap_or_else(default_extensions),
        )
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    pub fn has_checked_extension(&self, path: &str) -> bool {
        self.file_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    /// True when the analyzer should look at `path`
    pub fn accepts(&self, path: &str) -> bool {
        !self.is_ignored(path) && self.has_checked_extension(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_check_python_only() {
        let config = IgnoreConfig::default();
        assert!(config.accepts("pkg/module.py"));
        assert!(!config.accepts("README.md"));
    }

    #[test]
    fn parses_both_keys() {
        let config = IgnoreConfig::from_yaml(
            "ignore_patterns:\n  - 'tests/*'\n  - '*_pb2.py'\nfile_extensions_to_check:\n  - .py\n  - .pyi\n",
        )
        .unwrap();

        assert_eq!(config.ignore_patterns.len(), 2);
        assert!(config.accepts("src/app.pyi"));
        assert!(!config.accepts("tests/test_app.py"));
        assert!(!config.accepts("proto/api_pb2.py"));
    }

    #[test]
    fn star_crosses_directories() {
        let config = IgnoreConfig::new(vec!["vendor/*".into()], default_extensions()).unwrap();
        assert!(config.is_ignored("vendor/lib/deep/mod.py"));
        assert!(!config.is_ignored("src/vendor.py"));
    }

    #[test]
    fn missing_keys_fall_back() {
        let config = IgnoreConfig::from_yaml("ignore_patterns: ['build/*']\n").unwrap();
        assert_eq!(config.file_extensions, vec![".py".to_string()]);

        let empty = IgnoreConfig::from_yaml("").unwrap();
        assert!(empty.ignore_patterns.is_empty());
    }

    #[test]
    fn bad_glob_is_config_error() {
        let err = IgnoreConfig::from_yaml("ignore_patterns: ['[unclosed']\n").unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        assert!(matches!(IgnoreConfig::from_yaml("ignore_patterns: [a, b\n"), Err(MonitorError::Config(_))));
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = IgnoreConfig::load(&dir.path().join(DEFAULT_CONFIG_PATH)).unwrap();
        assert_eq!(config.file_extensions, vec![".py".to_string()]);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_PATH);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "file_extensions_to_check: ['.pyx']").unwrap();

        let config = IgnoreConfig::load(&path).unwrap();
        assert!(config.accepts("fast.pyx"));
        assert!(!config.accepts("slow.py"));
    }
}
