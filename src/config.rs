//! Configuration for codeprint.
//!
//! Settings come from an optional YAML file. Every key has a default, so an
//! absent file or an empty document behaves the same.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

/// File names probed, in order, when no `--config` is given.
pub const CONFIG_FILE_NAMES: &[&str] = &["codeprint.yaml", ".codeprint.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Files larger than this are skipped by the scanner.
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    /// Upper bound on files collected from one directory tree.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Glob patterns for paths to leave out of scans (e.g. "**/generated/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Extra import domains: domain name -> substrings that identify it.
    #[serde(default)]
    pub import_domains: BTreeMap<String, Vec<String>>,
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_max_files() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
            max_files: default_max_files(),
            excluded_paths: Vec::new(),
            log_level: default_log_level(),
            import_domains: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // An empty document deserialises to null, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        validate(&config)?;
        Ok(config)
    }

    /// Locate a config file in `dir`, if any.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Load `explicit` if given, otherwise a discovered file in `dir`,
    /// otherwise defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(|| Self::discover(dir)) {
            Some(path) => Self::parse_file(&path)
                .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e)),
            None => Ok(Self::default()),
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Compile `excluded_paths` into one matcher.
    pub fn exclusions(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.max_files == 0 {
        anyhow::bail!("max_files must be at least 1");
    }

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    for (domain, needles) in &config.import_domains {
        if needles.iter().any(|n| n.trim().is_empty()) {
            anyhow::bail!("import domain {:?} has an empty pattern", domain);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
max_file_size_mb: 2
excluded_paths:
  - "**/generated/**"
import_domains:
  graphics:
    - opengl
    - vulkan
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert_eq!(config.max_file_size_mb, 2);
        assert_eq!(config.max_files, 1000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.import_domains["graphics"], vec!["opengl", "vulkan"]);
        assert!(config
            .exclusions()
            .unwrap()
            .is_match("src/generated/api.rs"));
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = Config::parse_str("").unwrap();
        assert_eq!(config.max_file_size_bytes(), 10 * 1024 * 1024);
        assert!(config.excluded_paths.is_empty());
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let err = Config::parse_str("excluded_paths: [\"a[\"]").unwrap_err();
        assert!(err.to_string().contains("excluded_paths"));
    }

    #[test]
    fn test_zero_max_files_rejected() {
        assert!(Config::parse_str("max_files: 0").is_err());
    }

    #[test]
    fn test_discover_and_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::discover(dir.path()).is_none());
        assert_eq!(Config::load(None, dir.path()).unwrap().max_files, 1000);

        fs::write(dir.path().join(".codeprint.yaml"), "max_files: 5\n").unwrap();
        let found = Config::discover(dir.path()).unwrap();
        assert!(found.ends_with(".codeprint.yaml"));
        assert_eq!(Config::load(None, dir.path()).unwrap().max_files, 5);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(Config::load(Some(&missing), dir.path()).is_err());
    }
}
