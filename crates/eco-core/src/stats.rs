//! Population statistics and per-tick event counters.

use crate::types::Species;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Raw occupancy totals of one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub prey: usize,
    pub predators: usize,
    pub food: usize,
}

impl PopulationCounts {
    pub fn of(&self, species: Species) -> usize {
        match species {
            Species::Prey => self.prey,
            Species::Predator => self.predators,
        }
    }

    pub fn is_extinct(&self) -> bool {
        self.prey == 0 && self.predators == 0
    }
}

/// Aggregate energy/age statistics for one species in one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    pub count: usize,
    pub mean_energy: f64,
    pub max_energy: i32,
    pub mean_age: f64,
    pub max_age: u32,
}

impl SpeciesStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one organism into the statistics
    pub fn record(&mut self, energy: i32, age: u32) {
        let n = self.count as f64;
        let new_n = n + 1.0;

        // Incremental mean
        self.mean_energy = (self.mean_energy * n + energy as f64) / new_n;
        self.mean_age = (self.mean_age * n + age as f64) / new_n;

        if self.count == 0 || energy > self.max_energy {
            self.max_energy = energy;
        }
        self.max_age = self.max_age.max(age);
        self.count += 1;
    }
}

/// Summary of one generation, suitable for telemetry or plotting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub prey: SpeciesStats,
    pub predators: SpeciesStats,
    pub food_cells: usize,
}

impl GenerationStats {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            ..Default::default()
        }
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesStats {
        match species {
            Species::Prey => &mut self.prey,
            Species::Predator => &mut self.predators,
        }
    }

    pub fn counts(&self) -> PopulationCounts {
        PopulationCounts {
            prey: self.prey.count,
            predators: self.predators.count,
            food: self.food_cells,
        }
    }
}

/// Event counters for one species
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCounters {
    pub births: u64,
    /// Removed because energy reached zero
    pub starved: u64,
    /// Exhausted the movement retry budget and stayed put
    pub stuck: u64,
}

impl AddAssign for SpeciesCounters {
    fn add_assign(&mut self, other: Self) {
        self.births += other.births;
        self.starved += other.starved;
        self.stuck += other.stuck;
    }
}

/// What happened during one tick (or, summed, during a whole run)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickCounters {
    pub prey: SpeciesCounters,
    pub predators: SpeciesCounters,
    /// Prey eaten by predators
    pub predations: u64,
    /// Food cells eaten by prey
    pub meals: u64,
    pub food_spawned: u64,
}

impl TickCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesCounters {
        match species {
            Species::Prey => &mut self.prey,
            Species::Predator => &mut self.predators,
        }
    }

    pub fn births(&self) -> u64 {
        self.prey.births + self.predators.births
    }

    pub fn deaths(&self) -> u64 {
        self.prey.starved + self.predators.starved + self.predations
    }
}

impl AddAssign for TickCounters {
    fn add_assign(&mut self, other: Self) {
        self.prey += other.prey;
        self.predators += other.predators;
        self.predations += other.predations;
        self.meals += other.meals;
        self.food_spawned += other.food_spawned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_stats_record() {
        let mut stats = SpeciesStats::new();
        stats.record(100, 4);
        stats.record(200, 10);
        stats.record(-30, 1);

        assert_eq!(stats.count, 3);
        assert!((stats.mean_energy - 90.0).abs() < 1e-9);
        assert!((stats.mean_age - 5.0).abs() < 1e-9);
        assert_eq!(stats.max_energy, 200);
        assert_eq!(stats.max_age, 10);
    }

    #[test]
    fn test_max_energy_starts_from_first_record() {
        let mut stats = SpeciesStats::new();
        stats.record(-5, 0);
        assert_eq!(stats.max_energy, -5);
    }

    #[test]
    fn test_generation_counts() {
        let mut stats = GenerationStats::new(7);
        stats.species_mut(Species::Prey).record(10, 1);
        stats.species_mut(Species::Prey).record(10, 1);
        stats.species_mut(Species::Predator).record(10, 1);
        stats.food_cells = 4;

        let counts = stats.counts();
        assert_eq!(stats.generation, 7);
        assert_eq!(counts.of(Species::Prey), 2);
        assert_eq!(counts.of(Species::Predator), 1);
        assert_eq!(counts.food, 4);
        assert!(!counts.is_extinct());
    }

    #[test]
    fn test_counters_accumulate() {
        let mut total = TickCounters::new();
        let mut tick = TickCounters::new();
        tick.species_mut(Species::Prey).births = 2;
        tick.species_mut(Species::Predator).starved = 1;
        tick.predations = 3;
        tick.meals = 5;

        total += tick;
        total += tick;

        assert_eq!(total.births(), 4);
        assert_eq!(total.deaths(), 8);
        assert_eq!(total.meals, 10);
    }
}
