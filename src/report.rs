//! Output formatting for codeprint results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the flat feature record, scan report or fingerprint, serialized as-is

use colored::*;
use serde::Serialize;
use std::path::Path;

use crate::extract::{Extraction, ExtractionMethod};
use crate::features::{CodeFeatures, Slot};
use crate::fingerprint::{Fingerprint, PatternCounts};
use crate::language::Language;
use crate::scan::{FileOutcome, OutcomeTally, ScanReport};

/// Pretty output shows at most this many values per slot.
const MAX_PRETTY_VALUES: usize = 8;
/// Longer values are cut at this many characters in pretty output.
const MAX_PRETTY_WIDTH: usize = 72;

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize any report value as pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

/// One row of `codeprint detect` output.
#[derive(Debug, Serialize)]
pub struct DetectedFile {
    pub path: String,
    pub language: Option<Language>,
    pub grammar: bool,
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(label: &str, path: &str) {
    println!();
    print!("  ");
    print!("{}", "codeprint".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", format!("{:<10}", label).dimmed());
    println!("{}", path);
    println!();
}

/// Features extracted from a single file.
pub fn write_extraction_pretty(path: &str, extraction: &Extraction) {
    write_header("Extracting:", path);
    write_method_line(extraction.features.language, extraction.method);
    println!();
    write_slots(&extraction.features);
}

fn write_method_line(language: Language, method: ExtractionMethod) {
    print!("  Language: {}", language.as_str().bold());
    match method {
        ExtractionMethod::Syntax => println!("  {}", "(syntax tree)".green()),
        ExtractionMethod::Fallback => println!("  {}", "(pattern fallback)".yellow()),
    }
}

fn slot_label(slot: Slot) -> &'static str {
    match slot {
        Slot::String => "Strings",
        Slot::Function => "Functions",
        Slot::Variable => "Variables",
        Slot::Class => "Classes",
        Slot::Method => "Methods",
        Slot::Comment => "Comments",
        Slot::Docstring => "Docstrings",
        Slot::Import => "Imports",
    }
}

fn write_slots(features: &CodeFeatures) {
    if features.is_empty() {
        println!("  {}", "No features found".dimmed());
        return;
    }

    for slot in Slot::ALL {
        let values = features.slot(slot);
        if values.is_empty() {
            continue;
        }
        println!("  {} ({}):", slot_label(slot).bold(), values.len());
        for value in values.iter().take(MAX_PRETTY_VALUES) {
            println!("    {}", truncate(value));
        }
        if values.len() > MAX_PRETTY_VALUES {
            println!(
                "    {}",
                format!("... {} more", values.len() - MAX_PRETTY_VALUES).dimmed()
            );
        }
        println!();
    }
}

/// Collapse whitespace and cut to a single display line.
fn truncate(value: &str) -> String {
    let flat: String = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_PRETTY_WIDTH {
        return flat;
    }
    let cut: String = flat.chars().take(MAX_PRETTY_WIDTH - 3).collect();
    format!("{}...", cut)
}

/// Per-file outcomes of a directory scan.
pub fn write_scan_pretty(path: &str, report: &ScanReport) {
    write_header("Scanning:", path);

    for file in &report.files {
        let display = file.path.display().to_string();
        match &file.outcome {
            FileOutcome::Extracted { features } => {
                print!("    {} ", "OK   ".green());
                print!("{:<12}", features.language.as_str().dimmed());
                print!("{}", display.blue());
                println!("  {}", summary_counts(features).dimmed());
            }
            FileOutcome::Fallback { features } => {
                print!("    {} ", "FALLB".yellow());
                print!("{:<12}", features.language.as_str().dimmed());
                print!("{}", display.blue());
                println!("  {}", summary_counts(features).dimmed());
            }
            FileOutcome::Skipped { reason } => {
                print!("    {} ", "SKIP ".red());
                print!("{:<12}", "");
                print!("{}", display.blue());
                println!("  {}", reason.to_string().dimmed());
            }
        }
    }
    println!();
    write_tally(&report.tally());
    println!();
}

fn summary_counts(features: &CodeFeatures) -> String {
    format!(
        "{} fn, {} class, {} method, {} import",
        features.function_names.len(),
        features.class_names.len(),
        features.method_names.len(),
        features.imports.len()
    )
}

fn write_tally(tally: &OutcomeTally) {
    print!("  {}", format!("Files: {}", tally.total).bold());
    print!("  {}", format!("syntax {}", tally.extracted).green());
    print!("  {}", format!("fallback {}", tally.fallback).yellow());
    if tally.skipped > 0 {
        print!("  {}", format!("skipped {}", tally.skipped).red());
    } else {
        print!("  {}", "skipped 0".dimmed());
    }
    println!();
}

/// Fingerprint of a file or tree.
pub fn write_fingerprint_pretty(path: &str, fingerprint: &Fingerprint) {
    write_header("Profiling:", path);

    if let Some(tally) = &fingerprint.files {
        write_tally(tally);
        println!();
    }

    let counts = &fingerprint.counts;
    println!("  {}", "Counts:".bold());
    for (label, count) in [
        ("functions", counts.functions),
        ("classes", counts.classes),
        ("methods", counts.methods),
        ("variables", counts.variables),
        ("strings", counts.strings),
        ("comments", counts.comments),
        ("docstrings", counts.docstrings),
        ("imports", counts.imports),
    ] {
        println!("    {:<20} {:>5}", label, count);
    }
    println!();

    write_patterns("Function naming:", &fingerprint.function_patterns);
    write_patterns("Variable naming:", &fingerprint.variable_patterns);
    write_patterns("String patterns:", &fingerprint.string_patterns);
    write_patterns("Comment patterns:", &fingerprint.comment_patterns);
    write_patterns("Import domains:", &fingerprint.import_patterns);

    let metrics = &fingerprint.metrics;
    println!("  {}", "Metrics:".bold());
    println!(
        "    {:<24} {:.2}",
        "function/class ratio", metrics.function_to_class_ratio
    );
    println!("    {:<24} {:.2}", "comment density", metrics.comment_density);
    println!("    {:<24} {}", "import diversity", metrics.import_diversity);
    print!("    {:<24} ", "naming styles (fn/var)");
    write_colored_diversity(metrics.naming_consistency.function_patterns);
    print!("/");
    write_colored_diversity(metrics.naming_consistency.variable_patterns);
    println!();
    println!();
}

fn write_patterns(title: &str, patterns: &PatternCounts) {
    if patterns.is_empty() {
        return;
    }
    println!("  {}", title.bold());

    // Largest bucket first, ties by name
    let mut rows: Vec<(&String, &usize)> = patterns.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (bucket, count) in rows {
        println!("    {:<20} {:>5}", bucket, count);
    }
    println!();
}

/// One naming style is consistent; three or more is a mixed codebase.
fn write_colored_diversity(d: usize) {
    match d {
        0 | 1 => print!("{}", d.to_string().green()),
        2 => print!("{}", d.to_string().yellow()),
        _ => print!("{}", d.to_string().red()),
    }
}

/// Language detection results.
pub fn write_detected_pretty(files: &[DetectedFile]) {
    for file in files {
        match file.language {
            Some(lang) => {
                print!("  {:<12}", lang.as_str().green());
                if !file.grammar {
                    print!("{}", "(no grammar) ".yellow());
                }
            }
            None => print!("  {:<12}", "unsupported".red()),
        }
        println!("{}", file.path);
    }
}

/// Languages the binary can detect, and whether each has a loaded grammar.
pub fn write_languages_pretty(rows: &[(Language, bool)]) {
    println!("  {}", "Supported languages:".bold());
    println!();
    for (lang, grammar) in rows {
        let status = if *grammar {
            "syntax tree".green()
        } else {
            "pattern fallback".yellow()
        };
        println!("    {:<14} {}", lang.as_str(), status);
    }
}

/// Display form of a path relative to `base`, when it is under it.
pub fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .ok()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_json_is_flat_record() {
        let mut features = CodeFeatures::empty(Language::Python, Some("a.py"));
        features.push(Slot::Function, "add");
        let json: serde_json::Value = serde_json::from_str(&to_json(&features).unwrap()).unwrap();
        assert_eq!(json["function_names"][0], "add");
        assert_eq!(json["language"], "python");
        assert_eq!(json["file_path"], "a.py");
        assert!(json["strings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_detected_json() {
        let rows = vec![DetectedFile {
            path: "notes.xyz".to_string(),
            language: None,
            grammar: false,
        }];
        let json: serde_json::Value = serde_json::from_str(&to_json(&rows).unwrap()).unwrap();
        assert!(json[0]["language"].is_null());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("a\n   b"), "a b");
        let long = "x".repeat(200);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_PRETTY_WIDTH);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_display_path() {
        let base = Path::new("/repo");
        assert_eq!(display_path(Path::new("/repo/src/a.rs"), base), "src/a.rs");
        assert_eq!(display_path(Path::new("/other/b.rs"), base), "/other/b.rs");
        assert_eq!(display_path(Path::new("/repo"), base), "/repo");
    }
}
