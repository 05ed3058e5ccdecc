//! Command-line interface for codeprint.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::extract::{init_grammars, Extraction, ExtractionMethod};
use crate::fingerprint::{Fingerprinter, ImportDomains};
use crate::language::{detect_language, Language};
use crate::logging;
use crate::report::{self, DetectedFile};
use crate::scan::{FileOutcome, FileResult, ScanReport, Scanner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

const FORMATS: &[&str] = &["pretty", "json"];

/// Structural feature extraction for source code.
///
/// Codeprint parses source files with tree-sitter grammars (or a regex
/// fallback when no grammar applies) and reports the identifiers, literals,
/// comments, docstrings and imports they contain, plus a compact style
/// fingerprint derived from them.
#[derive(Parser)]
#[command(name = "codeprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level: trace, debug, info, warn, error (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract features from a file or directory
    Extract(TargetArgs),
    /// Build a style fingerprint for a file or directory
    Fingerprint(TargetArgs),
    /// Report the detected language of each file
    Detect(DetectArgs),
    /// List supported languages and grammar availability
    Languages,
}

/// Arguments shared by extract and fingerprint.
#[derive(Args)]
pub struct TargetArgs {
    /// File or directory to analyze
    pub path: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct DetectArgs {
    /// Files to classify
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let log_level = cli.log_level;
    match cli.command {
        Commands::Extract(args) => run_extract(&args, log_level.as_deref()),
        Commands::Fingerprint(args) => run_fingerprint(&args, log_level.as_deref()),
        Commands::Detect(args) => {
            start_logging(log_level.as_deref(), "warn");
            run_detect(&args)
        }
        Commands::Languages => {
            start_logging(log_level.as_deref(), "warn");
            run_languages()
        }
    }
}

fn start_logging(explicit: Option<&str>, fallback: &str) {
    if let Err(e) = logging::init_logging(explicit.unwrap_or(fallback)) {
        eprintln!("Warning: {}", e);
    }
}

fn check_format(format: &str) -> bool {
    if FORMATS.contains(&format) {
        return true;
    }
    eprintln!(
        "Error: invalid format {:?}, must be 'pretty' or 'json'",
        format
    );
    false
}

/// Resolve the target and the config that applies to it.
///
/// The config is discovered in the target directory, or next to the target
/// file.
fn prepare(args: &TargetArgs, log_level: Option<&str>) -> Result<(PathBuf, Config), i32> {
    if !check_format(&args.format) {
        return Err(EXIT_ERROR);
    }

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Err(EXIT_ERROR);
        }
    };

    let config_dir = if abs_path.is_dir() {
        abs_path.clone()
    } else {
        abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| abs_path.clone())
    };

    let config = match Config::load(args.config.as_deref(), &config_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(EXIT_ERROR);
        }
    };

    start_logging(log_level, &config.log_level);
    Ok((abs_path, config))
}

/// Scan a directory, or a single file as a one-entry report.
fn scan_target(scanner: &Scanner<'_>, path: &Path) -> anyhow::Result<ScanReport> {
    if path.is_dir() {
        scanner.scan(path)
    } else {
        Ok(ScanReport {
            files: vec![scanner.scan_file(path)],
        })
    }
}

fn extraction_of(result: &FileResult) -> Option<Extraction> {
    match &result.outcome {
        FileOutcome::Extracted { features } => Some(Extraction {
            features: features.clone(),
            method: ExtractionMethod::Syntax,
        }),
        FileOutcome::Fallback { features } => Some(Extraction {
            features: features.clone(),
            method: ExtractionMethod::Fallback,
        }),
        FileOutcome::Skipped { .. } => None,
    }
}

/// Run the extract command.
pub fn run_extract(args: &TargetArgs, log_level: Option<&str>) -> anyhow::Result<i32> {
    let (abs_path, config) = match prepare(args, log_level) {
        Ok(prepared) => prepared,
        Err(code) => return Ok(code),
    };
    let scanner = Scanner::new(config)?;
    let path_str = args.path.to_string_lossy().to_string();

    if abs_path.is_dir() {
        let mut report = scanner.scan(&abs_path)?;
        if report.files.is_empty() {
            eprintln!("Warning: no files to scan");
            return Ok(EXIT_FAILED);
        }
        for file in &mut report.files {
            file.path = PathBuf::from(report::display_path(&file.path, &abs_path));
        }

        match args.format.as_str() {
            "json" => report::write_json(&report)?,
            _ => report::write_scan_pretty(&path_str, &report),
        }

        let tally = report.tally();
        return Ok(if tally.extracted + tally.fallback == 0 {
            EXIT_FAILED
        } else {
            EXIT_SUCCESS
        });
    }

    let result = scanner.scan_file(&abs_path);
    let extraction = match extraction_of(&result) {
        Some(extraction) => extraction,
        None => {
            if let FileOutcome::Skipped { reason } = &result.outcome {
                eprintln!("Error: skipped {}: {}", path_str, reason);
            }
            return Ok(EXIT_FAILED);
        }
    };

    match args.format.as_str() {
        "json" => report::write_json(&extraction.features)?,
        _ => report::write_extraction_pretty(&path_str, &extraction),
    }

    if extraction.features.is_empty() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the fingerprint command.
pub fn run_fingerprint(args: &TargetArgs, log_level: Option<&str>) -> anyhow::Result<i32> {
    let (abs_path, config) = match prepare(args, log_level) {
        Ok(prepared) => prepared,
        Err(code) => return Ok(code),
    };
    let fingerprinter = Fingerprinter::new(ImportDomains::with_extra(&config.import_domains));
    let scanner = Scanner::new(config)?;

    let report = scan_target(&scanner, &abs_path)?;
    let tally = report.tally();
    if tally.extracted + tally.fallback == 0 {
        eprintln!("Warning: nothing to fingerprint");
        return Ok(EXIT_FAILED);
    }

    let fingerprint = fingerprinter.from_report(&report);
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => report::write_json(&fingerprint)?,
        _ => report::write_fingerprint_pretty(&path_str, &fingerprint),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the detect command.
pub fn run_detect(args: &DetectArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format) {
        return Ok(EXIT_ERROR);
    }

    let registry = init_grammars();
    let detected: Vec<DetectedFile> = args
        .files
        .iter()
        .map(|path| {
            let language = detect_language(path);
            DetectedFile {
                path: path.to_string_lossy().to_string(),
                language,
                grammar: language.map_or(false, |l| registry.has_grammar(l)),
            }
        })
        .collect();

    match args.format.as_str() {
        "json" => report::write_json(&detected)?,
        _ => report::write_detected_pretty(&detected),
    }

    if detected.iter().any(|d| d.language.is_none()) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the languages command.
pub fn run_languages() -> anyhow::Result<i32> {
    let registry = init_grammars();
    let rows: Vec<(Language, bool)> = Language::DETECTABLE
        .iter()
        .map(|lang| (*lang, registry.has_grammar(*lang)))
        .collect();

    report::write_languages_pretty(&rows);
    Ok(EXIT_SUCCESS)
}
