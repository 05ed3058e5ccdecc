//! Batch extraction over files and directory trees.
//!
//! Each file gets an explicit outcome instead of being silently dropped, so
//! callers can tell how much of a tree went through the syntax path, how
//! much degraded to the fallback, and what was skipped and why.

use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::extract::{ExtractionMethod, Extractor};
use crate::features::CodeFeatures;
use crate::language::detect_language;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["vendor", "node_modules", "target", "dist", "build"];

/// Why a file produced no features.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("content is not valid UTF-8")]
    NotUtf8,
    #[error("read failed: {message}")]
    Io { message: String },
    #[error("excluded by configuration")]
    Excluded,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Parsed with a grammar.
    Extracted { features: CodeFeatures },
    /// Pattern fallback: no language, no grammar, or no tree.
    Fallback { features: CodeFeatures },
    Skipped { reason: SkipReason },
}

impl FileOutcome {
    pub fn features(&self) -> Option<&CodeFeatures> {
        match self {
            FileOutcome::Extracted { features } | FileOutcome::Fallback { features } => {
                Some(features)
            }
            FileOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Outcome counts for a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub total: usize,
    pub extracted: usize,
    pub fallback: usize,
    pub skipped: usize,
}

/// Results of a batch scan, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub files: Vec<FileResult>,
}

impl ScanReport {
    /// Features of every file that was not skipped, in path order.
    pub fn features(&self) -> impl Iterator<Item = &CodeFeatures> {
        self.files.iter().filter_map(|f| f.outcome.features())
    }

    pub fn tally(&self) -> OutcomeTally {
        let mut tally = OutcomeTally {
            total: self.files.len(),
            ..OutcomeTally::default()
        };
        for file in &self.files {
            match file.outcome {
                FileOutcome::Extracted { .. } => tally.extracted += 1,
                FileOutcome::Fallback { .. } => tally.fallback += 1,
                FileOutcome::Skipped { .. } => tally.skipped += 1,
            }
        }
        tally
    }
}

/// Collects and extracts files under the limits of a [`Config`].
pub struct Scanner<'r> {
    config: Config,
    exclusions: GlobSet,
    extractor: Extractor<'r>,
}

impl Scanner<'static> {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_extractor(config, Extractor::new())
    }
}

impl<'r> Scanner<'r> {
    pub fn with_extractor(config: Config, extractor: Extractor<'r>) -> anyhow::Result<Self> {
        let exclusions = config.exclusions()?;
        Ok(Self {
            config,
            exclusions,
            extractor,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether `path` matches `excluded_paths`, relative to `root` or as given.
    pub fn is_excluded(&self, path: &Path, root: &Path) -> bool {
        if self.exclusions.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.exclusions.is_match(relative) || self.exclusions.is_match(path)
    }

    /// Source files under `root` with a recognised extension.
    ///
    /// `root` may also be a single file, which is returned as is. Stops at
    /// `max_files`.
    pub fn collect_files(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                // Covers .git and other hidden directories.
                !name.starts_with('.') && !SKIPPED_DIRS.contains(&&*name)
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if detect_language(path).is_none() {
                continue;
            }
            if self.is_excluded(path, root) {
                debug!(path = %path.display(), "excluded by configuration");
                continue;
            }
            if files.len() >= self.config.max_files {
                warn!(
                    limit = self.config.max_files,
                    root = %root.display(),
                    "file limit reached, remaining files ignored"
                );
                break;
            }
            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    /// Extract one file. Explicitly listed paths still honour exclusions.
    pub fn scan_file(&self, path: &Path) -> FileResult {
        let outcome = self.outcome_for(path);
        if let FileOutcome::Skipped { reason } = &outcome {
            debug!(path = %path.display(), %reason, "skipped");
        }
        FileResult {
            path: path.to_path_buf(),
            outcome,
        }
    }

    fn outcome_for(&self, path: &Path) -> FileOutcome {
        if !self.exclusions.is_empty() && self.exclusions.is_match(path) {
            return FileOutcome::Skipped {
                reason: SkipReason::Excluded,
            };
        }

        let limit = self.config.max_file_size_bytes();
        match fs::metadata(path) {
            Ok(meta) if meta.len() > limit => {
                return FileOutcome::Skipped {
                    reason: SkipReason::TooLarge {
                        size: meta.len(),
                        limit,
                    },
                }
            }
            Ok(_) => {}
            Err(e) => return io_skip(path, e),
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return io_skip(path, e),
        };
        let Ok(source) = String::from_utf8(bytes) else {
            return FileOutcome::Skipped {
                reason: SkipReason::NotUtf8,
            };
        };

        let display = path.to_string_lossy();
        let extraction =
            self.extractor
                .extract_with_method(&source, detect_language(path), Some(&display));
        match extraction.method {
            ExtractionMethod::Syntax => FileOutcome::Extracted {
                features: extraction.features,
            },
            ExtractionMethod::Fallback => FileOutcome::Fallback {
                features: extraction.features,
            },
        }
    }

    /// Extract many files in parallel. Results are sorted by path.
    pub fn scan_files(&self, paths: &[PathBuf]) -> ScanReport {
        let mut files: Vec<FileResult> = paths.par_iter().map(|p| self.scan_file(p)).collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let report = ScanReport { files };
        let tally = report.tally();
        info!(
            total = tally.total,
            extracted = tally.extracted,
            fallback = tally.fallback,
            skipped = tally.skipped,
            "scan complete"
        );
        report
    }

    /// Collect and extract everything under `root`.
    pub fn scan(&self, root: &Path) -> anyhow::Result<ScanReport> {
        let files = self.collect_files(root)?;
        debug!(count = files.len(), root = %root.display(), "collected files");
        Ok(self.scan_files(&files))
    }
}

fn io_skip(path: &Path, err: std::io::Error) -> FileOutcome {
    warn!(path = %path.display(), error = %err, "failed to read file");
    FileOutcome::Skipped {
        reason: SkipReason::Io {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::GrammarRegistry;
    use crate::language::Language;

    fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_skips_hidden_and_vendor_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.py", b"x = 1\n");
        write(dir.path(), "src/lib.rs", b"fn main() {}\n");
        write(dir.path(), "notes.txt", b"plain text\n");
        write(dir.path(), "node_modules/pkg/index.js", b"var a = 1;\n");
        write(dir.path(), ".git/hooks/pre-commit.py", b"x = 1\n");
        write(dir.path(), "target/debug/build.rs", b"fn main() {}\n");

        let scanner = Scanner::new(Config::default()).unwrap();
        let files = scanner.collect_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("app.py"), PathBuf::from("src/lib.rs")]
        );
    }

    #[test]
    fn test_collect_applies_exclusions_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", b"a = 1\n");
        write(dir.path(), "b.py", b"b = 1\n");
        write(dir.path(), "c.py", b"c = 1\n");
        write(dir.path(), "generated/api.py", b"d = 1\n");

        let config = Config {
            excluded_paths: vec!["generated/**".to_string()],
            max_files: 2,
            ..Config::default()
        };
        let scanner = Scanner::new(config).unwrap();
        let files = scanner.collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.to_string_lossy().contains("generated")));
    }

    #[test]
    fn test_scan_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "ok.py", b"def handler():\n    pass\n");
        let binary = write(dir.path(), "blob.py", &[0xff, 0xfe, 0x00, 0x41]);
        let big = write(dir.path(), "big.py", &vec![b'#'; 2 * 1024 * 1024]);
        let unknown = write(dir.path(), "data.xyz", b"key = value\n");
        let missing = dir.path().join("missing.py");

        let config = Config {
            max_file_size_mb: 1,
            ..Config::default()
        };
        let scanner = Scanner::new(config).unwrap();
        let report = scanner.scan_files(&[
            good.clone(),
            binary.clone(),
            big.clone(),
            unknown.clone(),
            missing.clone(),
        ]);

        let outcome = |p: &Path| {
            report
                .files
                .iter()
                .find(|f| f.path == p)
                .map(|f| f.outcome.clone())
                .unwrap()
        };

        assert!(matches!(
            outcome(&binary),
            FileOutcome::Skipped {
                reason: SkipReason::NotUtf8
            }
        ));
        assert!(matches!(
            outcome(&big),
            FileOutcome::Skipped {
                reason: SkipReason::TooLarge { .. }
            }
        ));
        assert!(matches!(
            outcome(&missing),
            FileOutcome::Skipped {
                reason: SkipReason::Io { .. }
            }
        ));
        match outcome(&unknown) {
            FileOutcome::Fallback { features } => {
                assert_eq!(features.language, Language::Unknown)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let features = outcome(&good).features().cloned().unwrap();
        assert_eq!(features.function_names, vec!["handler"]);

        let tally = report.tally();
        assert_eq!(tally.total, 5);
        assert_eq!(tally.skipped, 3);
        assert_eq!(tally.extracted + tally.fallback, 2);

        let mut sorted = report.files.iter().map(|f| f.path.clone()).collect::<Vec<_>>();
        sorted.sort();
        assert_eq!(
            sorted,
            report.files.iter().map(|f| f.path.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_scan_without_grammars_reports_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.go", b"package main\n\nfunc main() {}\n");

        let registry = GrammarRegistry::empty();
        let scanner =
            Scanner::with_extractor(Config::default(), Extractor::with_registry(&registry))
                .unwrap();
        let report = scanner.scan(dir.path()).unwrap();
        assert_eq!(report.tally().fallback, 1);
        assert_eq!(
            report.features().next().unwrap().function_names,
            vec!["main"]
        );
    }

    #[test]
    fn test_explicit_excluded_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gen/model.py", b"x = 1\n");
        let config = Config {
            excluded_paths: vec!["**/gen/**".to_string()],
            ..Config::default()
        };
        let scanner = Scanner::new(config).unwrap();
        let result = scanner.scan_file(&path);
        assert_eq!(
            result.outcome,
            FileOutcome::Skipped {
                reason: SkipReason::Excluded
            }
        );
    }

    #[test]
    fn test_skip_reason_serializes_tagged() {
        let json = serde_json::to_value(SkipReason::TooLarge { size: 5, limit: 1 }).unwrap();
        assert_eq!(json["kind"], "too_large");
        assert_eq!(json["size"], 5);
    }
}
