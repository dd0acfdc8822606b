//! Tracing subscriber setup for the `cbdynamo` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a configured level is set.
pub const DEFAULT_FILTER: &str = "cbdynamo=info,cbdynamo_core=info";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Filter directive applying `level` to this project's crates.
pub fn level_directive(level: &str) -> String {
    format!("cbdynamo={level},cbdynamo_core={level}")
}

/// Builds the env filter: `RUST_LOG` first, then `level`, then the default.
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => level_directive(level).into(),
        None => DEFAULT_FILTER.into(),
    })
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine readable.
pub fn init(level: Option<&str>, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(env_filter(level));

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("debug"), "cbdynamo=debug,cbdynamo_core=debug");
    }
}
