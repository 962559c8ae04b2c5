//! Snapshot and statistics export.

use anyhow::{Context, Result};
use clap::ValueEnum;
use eco_world::SnapshotSequence;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Bincode,
}

pub fn encode(sequence: &SnapshotSequence, format: OutputFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        OutputFormat::Json => sequence.to_json()?.into_bytes(),
        OutputFormat::Bincode => sequence.to_bincode()?,
    };
    Ok(bytes)
}

pub fn write_snapshots(path: &Path, sequence: &SnapshotSequence, format: OutputFormat) -> Result<()> {
    let bytes = encode(sequence, format)?;
    fs::write(path, &bytes)
        .with_context(|| format!("failed to write snapshots to {}", path.display()))?;
    info!(
        path = %path.display(),
        snapshots = sequence.len(),
        bytes = bytes.len(),
        ?format,
        "Wrote snapshots"
    );
    Ok(())
}

pub fn write_stats(path: &Path, sequence: &SnapshotSequence) -> Result<()> {
    let json = serde_json::to_string_pretty(&sequence.stats())
        .context("failed to encode generation statistics")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write statistics to {}", path.display()))?;
    info!(path = %path.display(), generations = sequence.len(), "Wrote statistics");
    Ok(())
}

/// One-line description of the final generation
pub fn summary(sequence: &SnapshotSequence) -> String {
    let totals = sequence.totals();
    match sequence.latest() {
        Some(grid) => {
            let counts = grid.counts();
            format!(
                "generation {}: {} prey, {} predators, {} food cells ({} births, {} deaths, {} predations)",
                sequence.len() - 1,
                counts.prey,
                counts.predators,
                counts.food,
                totals.births(),
                totals.deaths(),
                totals.predations
            )
        }
        None => "no snapshots".to_string(),
    }
}
