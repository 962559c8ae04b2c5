//! Command-line runner for the predator/prey simulation.

mod output;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use eco_core::{EcosystemConfig, FoodRule};
use eco_world::Simulation;
use output::OutputFormat;
use std::fs;
use std::path::PathBuf;
use telemetry::LogFormat;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "eco-sim", author, version, about = "Predator/prey ecosystem simulation")]
struct Args {
    /// JSON configuration file; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    #[arg(long)]
    prey: Option<usize>,

    #[arg(long)]
    predators: Option<usize>,

    /// Number of ticks to simulate
    #[arg(long)]
    steps: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    /// uniform, gardenOfEden or lineRunner
    #[arg(long)]
    food_rule: Option<FoodRule>,

    /// Write the snapshot sequence here
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write per-generation statistics here as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Args {
    fn load_config(&self) -> Result<EcosystemConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                EcosystemConfig::from_json(&json)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => EcosystemConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut EcosystemConfig) {
        if let Some(rows) = self.rows {
            config.num_rows = rows;
        }
        if let Some(cols) = self.cols {
            config.num_cols = cols;
        }
        if let Some(prey) = self.prey {
            config.num_prey = prey;
        }
        if let Some(predators) = self.predators {
            config.num_predators = predators;
        }
        if let Some(steps) = self.steps {
            config.total_timesteps = steps;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rule) = self.food_rule {
            config.food_rule = rule;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_logging(args.verbose, args.log_format)?;

    let config = args.load_config()?;
    info!(
        rows = config.num_rows,
        cols = config.num_cols,
        prey = config.num_prey,
        predators = config.num_predators,
        food_rule = %config.food_rule,
        steps = config.total_timesteps,
        seed = config.seed,
        "Starting eco-sim"
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let simulation = Simulation::new(config)?;
    let token = cancel.clone();
    let sequence = tokio::task::spawn_blocking(move || simulation.run_until_cancelled(&token))
        .await
        .context("simulation task failed")??;

    if cancel.is_cancelled() {
        info!(generations = sequence.len(), "Run interrupted, keeping completed generations");
    }

    if let Some(path) = &args.output {
        output::write_snapshots(path, &sequence, args.format)?;
    }
    if let Some(path) = &args.stats {
        output::write_stats(path, &sequence)?;
    }

    println!("{}", output::summary(&sequence));
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping after the current tick");
}
