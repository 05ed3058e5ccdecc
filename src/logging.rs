//! Logging initialisation for the codeprint binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary so embedding hosts keep control of their own output.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install a stderr subscriber at `level`. `RUST_LOG`, when set, wins.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| parse_level(level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init()
        .context("Failed to initialize logging subscriber")
}

/// Build a filter scoped to this crate, defaulting to `info` for anything
/// unrecognised.
fn parse_level(level: &str) -> EnvFilter {
    let level = match level.to_ascii_lowercase().as_str() {
        l @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => l.to_string(),
        _ => "info".to_string(),
    };
    EnvFilter::new(format!("codeprint={}", level))
}
