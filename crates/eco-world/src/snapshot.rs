//! Published, read-only generation history.

use crate::grid::{Cell, Grid};
use eco_core::{GenerationStats, PopulationCounts, Result, TickCounters};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Immutable snapshots, index 0 being the initial state and index `k` the
/// state after tick `k`, together with what happened during each tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSequence {
    snapshots: Vec<Arc<Grid>>,
    /// `tick_counters[k - 1]` describes tick `k`
    tick_counters: Vec<TickCounters>,
}

impl SnapshotSequence {
    pub(crate) fn new(snapshots: Vec<Arc<Grid>>, tick_counters: Vec<TickCounters>) -> Self {
        debug_assert_eq!(snapshots.len(), tick_counters.len() + 1);
        Self {
            snapshots,
            tick_counters,
        }
    }

    /// Number of snapshots, including the initial one
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, generation: usize) -> Option<&Arc<Grid>> {
        self.snapshots.get(generation)
    }

    pub fn initial(&self) -> Option<&Arc<Grid>> {
        self.snapshots.first()
    }

    pub fn latest(&self) -> Option<&Arc<Grid>> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Grid>> + '_ {
        self.snapshots.iter()
    }

    pub fn cell(&self, generation: usize, row: usize, col: usize) -> Option<&Cell> {
        self.get(generation)?.get(row, col)
    }

    pub fn counts(&self, generation: usize) -> Option<PopulationCounts> {
        self.get(generation).map(|grid| grid.counts())
    }

    /// One entry per snapshot
    pub fn stats(&self) -> Vec<GenerationStats> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(generation, grid)| grid.stats(generation as u64))
            .collect()
    }

    pub fn tick_counters(&self) -> &[TickCounters] {
        &self.tick_counters
    }

    /// Event counters summed over every tick
    pub fn totals(&self) -> TickCounters {
        self.tick_counters
            .iter()
            .fold(TickCounters::new(), |mut acc, tick| {
                acc += *tick;
                acc
            })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_bincode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bincode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl<'a> IntoIterator for &'a SnapshotSequence {
    type Item = &'a Arc<Grid>;
    type IntoIter = std::slice::Iter<'a, Arc<Grid>>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
