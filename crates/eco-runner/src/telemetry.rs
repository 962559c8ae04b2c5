//! Logging setup for the runner.

use anyhow::Result;
use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Default directives when `RUST_LOG` is unset; each `-v` raises the eco crates a level
pub fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info,eco_world=info",
        1 => "info,eco_world=debug,eco_sim=debug",
        _ => "info,eco_world=trace,eco_sim=trace",
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// the run summary.
pub fn init_logging(verbosity: u8, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_parse() {
        for verbosity in 0..4 {
            let directives = default_directives(verbosity);
            assert!(directives.parse::<EnvFilter>().is_ok(), "{directives}");
        }
        assert!(default_directives(2).contains("trace"));
    }
}
