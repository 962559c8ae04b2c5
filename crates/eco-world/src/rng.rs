//! Injectable random source.
//!
//! The engine never reaches for a global or time-seeded generator; a single
//! handle is owned by the scheduler and threaded into every stochastic decision.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The draws the engine needs.
pub trait RandomSource {
    /// Uniform draw on the half-open interval `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Uniform index in `0..n`. `n` must be positive.
    fn below(&mut self, n: usize) -> usize;

    /// Uniform in-place permutation
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

impl RandomSource for ChaCha8Rng {
    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn below(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(self);
    }
}

/// Deterministic generator for a run seed
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::RandomSource;
    use std::collections::VecDeque;

    /// Replays scripted draws; panics when the script runs out.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedSource {
        units: VecDeque<f64>,
        indices: VecDeque<usize>,
    }

    impl ScriptedSource {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_units(mut self, units: &[f64]) -> Self {
            self.units.extend(units.iter().copied());
            self
        }

        pub(crate) fn with_indices(mut self, indices: &[usize]) -> Self {
            self.indices.extend(indices.iter().copied());
            self
        }

        pub(crate) fn units_left(&self) -> usize {
            self.units.len()
        }
    }

    impl RandomSource for ScriptedSource {
        fn unit(&mut self) -> f64 {
            self.units.pop_front().expect("scripted unit draws exhausted")
        }

        fn below(&mut self, n: usize) -> usize {
            let index = self.indices.pop_front().expect("scripted index draws exhausted");
            assert!(index < n, "scripted index {index} out of range 0..{n}");
            index
        }

        // Identity permutation keeps scripted scenarios readable.
        fn shuffle<T>(&mut self, _items: &mut [T]) {}
    }
}
