//! Movement genome: sampling a heading and reinforcing the gene that was used.
//!
//! A genome is a probability distribution over the eight turns an organism can
//! make relative to its last heading. Gene `i` means "turn `i` eighths
//! clockwise", so gene 0 keeps going straight and gene 4 reverses.

use crate::rng::RandomSource;
use eco_core::{Direction, Error, Result};
use serde::{Deserialize, Serialize};

pub const GENOME_LEN: usize = Direction::COUNT;

/// Allowed drift of the gene sum away from 1.0
pub const GENOME_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome([f64; GENOME_LEN]);

impl Genome {
    /// Every turn equally likely
    pub fn uniform() -> Self {
        Self([1.0 / GENOME_LEN as f64; GENOME_LEN])
    }

    /// Build from explicit weights; they must be finite, non-negative and sum to 1
    pub fn from_weights(weights: [f64; GENOME_LEN]) -> Result<Self> {
        let genome = Self(weights);
        genome.check()?;
        Ok(genome)
    }

    pub fn weights(&self) -> &[f64; GENOME_LEN] {
        &self.0
    }

    pub fn weight(&self, gene: usize) -> f64 {
        self.0[gene]
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Verify the normalisation invariant
    pub fn check(&self) -> Result<()> {
        if let Some(bad) = self.0.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::invariant(format!(
                "genome weight {bad} is negative or not finite: {:?}",
                self.0
            )));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() >= GENOME_TOLERANCE {
            return Err(Error::invariant(format!(
                "genome sums to {sum}, expected 1 +/- {GENOME_TOLERANCE}: {:?}",
                self.0
            )));
        }
        Ok(())
    }

    /// Inverse-CDF sampling: the first gene whose running sum reaches `r`.
    /// Falls back to gene 0 when rounding leaves the total just short of `r`.
    pub fn sample(&self, r: f64) -> usize {
        let mut running = 0.0;
        for (gene, weight) in self.0.iter().enumerate() {
            running += weight;
            if running >= r {
                return gene;
            }
        }
        0
    }

    /// Shift probability mass toward `gene`.
    ///
    /// Every other gene gives up `learning_rate * w[gene] / 7`, unless that would
    /// take it below zero, in which case it gives nothing. `gene` receives exactly
    /// what was given up, which is `learning_rate * w[gene]` when nobody abstains,
    /// so the sum stays at 1.
    pub fn reinforce(&mut self, gene: usize, learning_rate: f64) -> Result<()> {
        let share = learning_rate * self.0[gene] / (GENOME_LEN - 1) as f64;
        let mut reclaimed = 0.0;
        for (i, weight) in self.0.iter_mut().enumerate() {
            if i == gene {
                continue;
            }
            if *weight - share >= 0.0 {
                *weight -= share;
                reclaimed += share;
            }
        }
        self.0[gene] += reclaimed;
        self.check()
    }
}

impl Default for Genome {
    fn default() -> Self {
        Self::uniform()
    }
}

/// Outcome of heading selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveChoice {
    pub gene_index: usize,
    pub direction: Direction,
    pub d_row: i32,
    pub d_col: i32,
}

impl MoveChoice {
    fn toward(gene_index: usize, direction: Direction) -> Self {
        let (d_row, d_col) = direction.to_delta();
        Self {
            gene_index,
            direction,
            d_row,
            d_col,
        }
    }

    /// Retry budget exhausted: keep heading, zero displacement
    pub fn stay(last_direction: Direction) -> Self {
        Self {
            gene_index: 0,
            direction: last_direction,
            d_row: 0,
            d_col: 0,
        }
    }

    pub fn is_move(&self) -> bool {
        self.d_row != 0 || self.d_col != 0
    }
}

/// Sample a heading from `genome`, resampling while `is_blocked` rejects it.
///
/// After `max_attempts` blocked draws the organism stays put, even if some
/// unsampled heading was open. Dense neighbourhoods can therefore pin an
/// organism in place for several ticks.
pub fn select_direction<R, F>(
    genome: &Genome,
    last_direction: Direction,
    max_attempts: u32,
    rng: &mut R,
    mut is_blocked: F,
) -> MoveChoice
where
    R: RandomSource,
    F: FnMut(Direction) -> bool,
{
    for _ in 0..max_attempts {
        let gene_index = genome.sample(rng.unit());
        let direction = last_direction.rotate(gene_index);
        if !is_blocked(direction) {
            return MoveChoice::toward(gene_index, direction);
        }
    }
    MoveChoice::stay(last_direction)
}
