//! Aggregation of feature sets and their categorical fingerprint.
//!
//! A fingerprint never carries raw source content: names, strings, comments
//! and imports are reduced to bucket counts plus a handful of structural
//! ratios. Everything here is a pure function of its input.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use phf::phf_ordered_map;
use regex::Regex;
use serde::Serialize;

use crate::features::{char_len, CodeFeatures, Slot};
use crate::language::Language;
use crate::scan::{OutcomeTally, ScanReport};

/// Strings must be longer than this to be classified.
const MIN_CLASSIFIED_STRING_LEN: usize = 5;
/// Marker-stripped comments must be longer than this to be classified.
const MIN_CLASSIFIED_COMMENT_LEN: usize = 10;
const MIN_FUNCTION_NAME_LEN: usize = 3;
const MIN_VARIABLE_NAME_LEN: usize = 2;

const TODO_MARKERS: &[&str] = &["todo", "fixme", "hack"];
const HEADER_MARKERS: &[&str] = &["copyright", "license", "author"];

/// Built-in import domains, checked in order. Needles are lowercase.
static IMPORT_DOMAINS: phf::OrderedMap<&'static str, &'static [&'static str]> = phf_ordered_map! {
    "data_science" => &[
        "numpy", "pandas", "scipy", "sklearn", "matplotlib", "tensorflow", "torch", "ndarray",
        "polars",
    ],
    "web_framework" => &[
        "flask", "django", "fastapi", "express", "spring", "rails", "laravel", "actix", "axum",
        "gin-gonic",
    ],
    "http_client" => &["requests", "urllib", "httpx", "aiohttp", "axios", "reqwest", "okhttp", "net/http"],
    "testing" => &["pytest", "unittest", "jest", "mocha", "junit", "rspec", "phpunit", "testing"],
    "database" => &[
        "sqlalchemy", "psycopg", "sqlite", "mysql", "mongo", "redis", "diesel", "sqlx",
        "database/sql", "hibernate", "gorm", "prisma",
    ],
    "cli" => &["argparse", "click", "clap", "cobra", "commander", "yargs", "optparse"],
    "async_runtime" => &["asyncio", "tokio", "async_std", "async-std", "trio", "concurrent.futures"],
    "serialization" => &["json", "yaml", "serde", "protobuf", "pickle", "msgpack", "toml"],
};

lazy_static! {
    static ref URL_SCHEME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap();
}

/// Naming convention bucket of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamingStyle {
    SnakeCase,
    CamelCase,
    PascalCase,
    Constant,
    Other,
}

impl NamingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingStyle::SnakeCase => "snake_case",
            NamingStyle::CamelCase => "camelCase",
            NamingStyle::PascalCase => "PascalCase",
            NamingStyle::Constant => "CONSTANT",
            NamingStyle::Other => "other",
        }
    }
}

/// Strip `$` and `@` sigils (PHP variables, Ruby instance variables).
fn strip_sigils(name: &str) -> &str {
    name.trim_start_matches(&['$', '@'][..])
}

/// Bucket an identifier by its naming convention.
pub fn classify_name(name: &str) -> NamingStyle {
    let name = strip_sigils(name);
    let letters: Vec<char> = name.chars().filter(|c| c.is_alphabetic()).collect();

    if letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase()) {
        return NamingStyle::Constant;
    }
    if name.contains('_') {
        return NamingStyle::SnakeCase;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() && chars.any(|c| c.is_uppercase()) => {
            NamingStyle::CamelCase
        }
        Some(first) if first.is_uppercase() => NamingStyle::PascalCase,
        _ => NamingStyle::Other,
    }
}

/// Bucket a string literal's content, if it is long enough to say anything.
pub fn classify_string(value: &str) -> Option<&'static str> {
    if char_len(value) <= MIN_CLASSIFIED_STRING_LEN {
        return None;
    }
    if URL_SCHEME.is_match(value) {
        Some("url_pattern")
    } else if value.contains('@') {
        Some("email_pattern")
    } else if value.chars().all(|c| c.is_ascii_digit()) {
        Some("numeric_string")
    } else if value.split_whitespace().count() > 3 {
        Some("sentence_pattern")
    } else {
        None
    }
}

/// Bucket a comment by its content once comment markers are removed.
pub fn classify_comment(comment: &str) -> Option<&'static str> {
    let clean = comment.trim_matches(&['#', '/', '*', ' '][..]).to_lowercase();
    if char_len(&clean) <= MIN_CLASSIFIED_COMMENT_LEN {
        return None;
    }
    let bucket = if TODO_MARKERS.iter().any(|m| clean.contains(m)) {
        "todo_comment"
    } else if HEADER_MARKERS.iter().any(|m| clean.contains(m)) {
        "header_comment"
    } else {
        "description_comment"
    };
    Some(bucket)
}

/// Import-domain lookup: the built-in table followed by configured extras.
#[derive(Debug, Clone, Default)]
pub struct ImportDomains {
    extra: Vec<(String, Vec<String>)>,
}

impl ImportDomains {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Append configured domains after the built-in ones.
    pub fn with_extra(extra: &BTreeMap<String, Vec<String>>) -> Self {
        let extra = extra
            .iter()
            .map(|(domain, needles)| {
                let needles = needles.iter().map(|n| n.to_lowercase()).collect();
                (domain.clone(), needles)
            })
            .collect();
        Self { extra }
    }

    /// The first domain with a needle contained in `import`.
    pub fn classify(&self, import: &str) -> Option<&str> {
        let import = import.to_lowercase();
        for (domain, needles) in IMPORT_DOMAINS.entries() {
            if needles.iter().any(|n| import.contains(n)) {
                return Some(*domain);
            }
        }
        self.extra
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| import.contains(n.as_str())))
            .map(|(domain, _)| domain.as_str())
    }
}

/// Union of many feature sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedFeatures {
    /// Combined, normalised features. Tagged with the shared language, or
    /// `unknown` when inputs mix languages.
    #[serde(flatten)]
    pub features: CodeFeatures,
    /// Number of input feature sets per language.
    pub languages: BTreeMap<Language, usize>,
    pub file_count: usize,
}

/// Union every slot of `inputs` and normalise the result.
pub fn aggregate(inputs: &[CodeFeatures]) -> AggregatedFeatures {
    let mut languages = BTreeMap::new();
    for f in inputs {
        *languages.entry(f.language).or_insert(0) += 1;
    }
    let language = match languages.keys().next() {
        Some(lang) if languages.len() == 1 => *lang,
        _ => Language::Unknown,
    };

    let mut features = CodeFeatures::empty(language, None);
    for f in inputs {
        for slot in Slot::ALL {
            for value in f.slot(slot) {
                features.push(slot, value.as_str());
            }
        }
    }

    AggregatedFeatures {
        features: features.normalized(),
        languages,
        file_count: inputs.len(),
    }
}

/// Bucket -> occurrence count.
pub type PatternCounts = BTreeMap<String, usize>;

/// Unique entries per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureCounts {
    pub functions: usize,
    pub classes: usize,
    pub methods: usize,
    pub variables: usize,
    pub strings: usize,
    pub comments: usize,
    pub docstrings: usize,
    pub imports: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamingConsistency {
    pub function_patterns: usize,
    pub variable_patterns: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureMetrics {
    pub function_to_class_ratio: f64,
    pub comment_density: f64,
    pub import_diversity: usize,
    pub naming_consistency: NamingConsistency,
}

/// Categorical projection of a feature set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fingerprint {
    pub function_patterns: PatternCounts,
    pub variable_patterns: PatternCounts,
    pub string_patterns: PatternCounts,
    pub comment_patterns: PatternCounts,
    pub import_patterns: PatternCounts,
    pub counts: FeatureCounts,
    pub metrics: StructureMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<OutcomeTally>,
}

impl Fingerprint {
    pub fn from_features(features: &CodeFeatures) -> Self {
        Fingerprinter::default().fingerprint(features)
    }

    pub fn from_aggregate(aggregate: &AggregatedFeatures) -> Self {
        Fingerprinter::default().fingerprint(&aggregate.features)
    }

    pub fn from_report(report: &ScanReport) -> Self {
        Fingerprinter::default().from_report(report)
    }
}

/// Builds fingerprints against a particular import-domain table.
#[derive(Debug, Clone, Default)]
pub struct Fingerprinter {
    domains: ImportDomains,
}

impl Fingerprinter {
    pub fn new(domains: ImportDomains) -> Self {
        Self { domains }
    }

    pub fn fingerprint(&self, features: &CodeFeatures) -> Fingerprint {
        let function_patterns = naming_patterns(&features.function_names, MIN_FUNCTION_NAME_LEN);
        let variable_patterns = naming_patterns(&features.variable_names, MIN_VARIABLE_NAME_LEN);
        let string_patterns = tally(features.strings.iter().filter_map(|s| classify_string(s)));
        let comment_patterns = tally(features.comments.iter().filter_map(|c| classify_comment(c)));
        let import_patterns = tally(
            features
                .imports
                .iter()
                .filter_map(|i| self.domains.classify(i)),
        );

        let counts = FeatureCounts {
            functions: features.function_names.len(),
            classes: features.class_names.len(),
            methods: features.method_names.len(),
            variables: features.variable_names.len(),
            strings: features.strings.len(),
            comments: features.comments.len(),
            docstrings: features.docstrings.len(),
            imports: features.imports.len(),
        };

        let callables = counts.functions + counts.methods;
        let metrics = StructureMetrics {
            function_to_class_ratio: ratio(callables, counts.classes),
            comment_density: ratio(counts.comments, callables),
            import_diversity: import_patterns.len(),
            naming_consistency: NamingConsistency {
                function_patterns: naming_diversity(&function_patterns),
                variable_patterns: naming_diversity(&variable_patterns),
            },
        };

        Fingerprint {
            function_patterns,
            variable_patterns,
            string_patterns,
            comment_patterns,
            import_patterns,
            counts,
            metrics,
            files: None,
        }
    }

    /// Fingerprint every file of a scan, recording how each was processed.
    pub fn from_report(&self, report: &ScanReport) -> Fingerprint {
        let features: Vec<CodeFeatures> = report.features().cloned().collect();
        let mut fingerprint = self.fingerprint(&aggregate(&features).features);
        fingerprint.files = Some(report.tally());
        fingerprint
    }
}

fn naming_patterns(names: &[String], min_len: usize) -> PatternCounts {
    tally(
        names
            .iter()
            .map(|n| strip_sigils(n))
            .filter(|n| char_len(n) >= min_len)
            .map(|n| classify_name(n).as_str()),
    )
}

/// Distinct buckets, not counting `other`.
fn naming_diversity(patterns: &PatternCounts) -> usize {
    patterns
        .keys()
        .filter(|k| k.as_str() != NamingStyle::Other.as_str())
        .count()
}

fn tally<'a, I>(buckets: I) -> PatternCounts
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = PatternCounts::new();
    for bucket in buckets {
        *counts.entry(bucket.to_string()).or_insert(0) += 1;
    }
    counts
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_functions(language: Language, names: &[&str]) -> CodeFeatures {
        let mut f = CodeFeatures::empty(language, None);
        for name in names {
            f.push(Slot::Function, *name);
        }
        f.normalized()
    }

    #[test]
    fn test_classify_name() {
        assert_eq!(classify_name("parse_input"), NamingStyle::SnakeCase);
        assert_eq!(classify_name("parseInput"), NamingStyle::CamelCase);
        assert_eq!(classify_name("ParseInput"), NamingStyle::PascalCase);
        assert_eq!(classify_name("MAX_RETRIES"), NamingStyle::Constant);
        assert_eq!(classify_name("URL"), NamingStyle::Constant);
        assert_eq!(classify_name("count"), NamingStyle::Other);
        assert_eq!(classify_name("$user_name"), NamingStyle::SnakeCase);
        assert_eq!(classify_name("@itemCount"), NamingStyle::CamelCase);
        assert_eq!(classify_name("_private"), NamingStyle::SnakeCase);
    }

    #[test]
    fn test_classify_string() {
        assert_eq!(classify_string("https://example.com"), Some("url_pattern"));
        assert_eq!(classify_string("team@example.com"), Some("email_pattern"));
        assert_eq!(classify_string("1234567"), Some("numeric_string"));
        assert_eq!(
            classify_string("please enter a valid name"),
            Some("sentence_pattern")
        );
        assert_eq!(classify_string("short"), None);
        assert_eq!(classify_string("application/json"), None);
    }

    #[test]
    fn test_classify_comment() {
        assert_eq!(
            classify_comment("// TODO: handle the retry case"),
            Some("todo_comment")
        );
        assert_eq!(
            classify_comment("# Copyright 2024 Example Corp"),
            Some("header_comment")
        );
        assert_eq!(
            classify_comment("/* computes the checksum */"),
            Some("description_comment")
        );
        assert_eq!(classify_comment("// tiny note"), None);
    }

    #[test]
    fn test_import_domains_first_match_wins() {
        let domains = ImportDomains::builtin();
        assert_eq!(domains.classify("import numpy as np"), Some("data_science"));
        assert_eq!(domains.classify("from Flask import app"), Some("web_framework"));
        assert_eq!(domains.classify("import requests"), Some("http_client"));
        assert_eq!(domains.classify("use serde::Deserialize;"), Some("serialization"));
        assert_eq!(domains.classify("import os"), None);
    }

    #[test]
    fn test_import_domains_extras_after_builtin() {
        let mut extra = BTreeMap::new();
        extra.insert("graphics".to_string(), vec!["OpenGL".to_string()]);
        extra.insert("shadowed".to_string(), vec!["numpy".to_string()]);
        let domains = ImportDomains::with_extra(&extra);
        assert_eq!(domains.classify("#include <opengl/gl.h>"), Some("graphics"));
        assert_eq!(domains.classify("import numpy"), Some("data_science"));
    }

    #[test]
    fn test_naming_diversity_across_files() {
        let pascal = with_functions(Language::Go, &["ParseInput", "LoadConfig"]);
        let snake = with_functions(Language::Python, &["parse_input", "load_config"]);
        let combined = aggregate(&[pascal, snake]);
        let fingerprint = Fingerprint::from_aggregate(&combined);

        assert_eq!(fingerprint.metrics.naming_consistency.function_patterns, 2);
        assert_eq!(fingerprint.function_patterns["PascalCase"], 2);
        assert_eq!(fingerprint.function_patterns["snake_case"], 2);
        assert_eq!(combined.features.language, Language::Unknown);
        assert_eq!(combined.languages[&Language::Go], 1);
        assert_eq!(combined.file_count, 2);
    }

    #[test]
    fn test_short_names_ignored() {
        let f = with_functions(Language::C, &["go", "run_all"]);
        let fingerprint = Fingerprint::from_features(&f);
        assert_eq!(fingerprint.function_patterns.len(), 1);
        assert_eq!(fingerprint.function_patterns["snake_case"], 1);
    }

    #[test]
    fn test_other_excluded_from_diversity() {
        let f = with_functions(Language::Python, &["main", "helper", "run_job"]);
        let fingerprint = Fingerprint::from_features(&f);
        assert_eq!(fingerprint.function_patterns["other"], 2);
        assert_eq!(fingerprint.metrics.naming_consistency.function_patterns, 1);
    }

    #[test]
    fn test_ratios_floor_denominator() {
        let empty = Fingerprint::from_features(&CodeFeatures::empty(Language::Rust, None));
        assert_eq!(empty.metrics.function_to_class_ratio, 0.0);
        assert_eq!(empty.metrics.comment_density, 0.0);

        let mut f = CodeFeatures::empty(Language::Rust, None);
        f.push(Slot::Function, "alpha");
        f.push(Slot::Method, "beta");
        f.push(Slot::Comment, "// first comment");
        f.push(Slot::Comment, "// second comment");
        f.push(Slot::Comment, "// third comment");
        f.push(Slot::Comment, "// fourth comment");
        let fingerprint = Fingerprint::from_features(&f.normalized());
        assert_eq!(fingerprint.metrics.function_to_class_ratio, 2.0);
        assert_eq!(fingerprint.metrics.comment_density, 2.0);
    }

    #[test]
    fn test_aggregate_dedups_across_inputs() {
        let a = with_functions(Language::Rust, &["shared_name", "only_a"]);
        let b = with_functions(Language::Rust, &["shared_name", "only_b"]);
        let combined = aggregate(&[a, b]);
        assert_eq!(
            combined.features.function_names,
            vec!["shared_name", "only_a", "only_b"]
        );
        assert_eq!(combined.features.language, Language::Rust);
    }

    #[test]
    fn test_fingerprint_serializes_without_raw_content() {
        let mut f = CodeFeatures::empty(Language::Python, None);
        f.push(Slot::String, "\"secret api token value\"");
        let json = serde_json::to_string(&Fingerprint::from_features(&f.normalized())).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("sentence_pattern"));
        assert!(!json.contains("\"files\""));
    }
}
