//! Tracing subscriber setup.
//!
//! `RUST_LOG`, when set, takes full `EnvFilter` directives
//! (`qa_service=debug,tower_http=info`) and replaces the configured level.

use std::env;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{LogFormat, LogSettings};

/// Build the filter from `rust_log` directives, falling back to the
/// configured level when none of them parse.
pub fn build_filter(settings: &LogSettings, rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level()).into())
        .parse_lossy(rust_log.unwrap_or_default())
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let rust_log = env::var("RUST_LOG").ok();
    let builder = FmtSubscriber::builder()
        .with_env_filter(build_filter(settings, rust_log.as_deref()))
        .with_target(true)
        .with_thread_ids(true);

    match settings.format() {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}
