//! Codeprint - structural feature extraction for source code.
//!
//! Codeprint turns a source buffer into a [`CodeFeatures`] record: the
//! strings, identifiers, comments, docstrings and imports it contains. Files
//! in a language with a loaded grammar are parsed with tree-sitter and walked
//! against a per-language rule table; everything else goes through a regex
//! fallback so that extraction never fails outright.
//!
//! # Architecture
//!
//! - `language`: language identifiers and extension detection
//! - `extract`: grammar registry, rule tables and the syntax tree walker
//! - `fallback`: pattern extractor used when no tree is available
//! - `features`: the feature record and its normalisation
//! - `fingerprint`: aggregation and the categorical style fingerprint
//! - `scan`: batch extraction over directory trees
//! - `config`, `logging`, `report`, `cli`: the binary's surface
//!
//! # Adding a New Language
//!
//! Add a variant to `Language`, its grammar to `extract::registry`, and a
//! rule table under `src/extract/languages/`. Languages without a bespoke
//! table use the generic one.

pub mod cli;
pub mod config;
pub mod extract;
pub mod fallback;
pub mod features;
pub mod fingerprint;
pub mod language;
pub mod logging;
pub mod report;
pub mod scan;

pub use config::Config;
pub use extract::{
    extract, extract_with_method, init_grammars, Extraction, ExtractionMethod, Extractor,
    GrammarRegistry,
};
pub use features::{CodeFeatures, Slot};
pub use fingerprint::{aggregate, AggregatedFeatures, Fingerprint, Fingerprinter, ImportDomains};
pub use language::{detect_language, Language};
pub use scan::{FileOutcome, ScanReport, Scanner, SkipReason};
