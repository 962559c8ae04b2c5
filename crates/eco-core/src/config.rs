//! Configuration types for the simulation.
//!
//! Every tunable constant of the model lives here and is passed explicitly to the
//! engine; nothing is read from global state. Configs deserialize from
//! camelCase JSON and missing fields fall back to the compiled-in defaults.

use crate::error::{Error, Result};
use crate::types::Species;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-species energy economics and reproduction thresholds.
///
/// A species block in JSON is all-or-nothing: omit it to keep the species
/// defaults, or give every field (`maxEnergy` may be omitted for no ceiling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesConfig {
    /// Energy of organisms placed at seeding time
    pub initial_energy: i32,
    /// Minimum energy required to reproduce
    pub energy_threshold: i32,
    /// Minimum age required to reproduce
    pub age_threshold: u32,
    /// Energy charged every tick, moving or not
    pub cost_of_living: i32,
    /// Energy gained per meal (plankton for prey, a prey for predators)
    pub feeding_energy: i32,
    /// Hard energy ceiling; `None` means unbounded
    pub max_energy: Option<i32>,
}

impl SpeciesConfig {
    pub fn prey() -> Self {
        Self {
            initial_energy: 50,
            energy_threshold: 50,
            age_threshold: 21,
            cost_of_living: 0,
            feeding_energy: 50,
            max_energy: Some(1500),
        }
    }

    pub fn predator() -> Self {
        Self {
            initial_energy: 50,
            energy_threshold: 100,
            age_threshold: 42,
            cost_of_living: 0,
            feeding_energy: 40,
            max_energy: None,
        }
    }

    fn validate(&self, species: Species) -> Result<()> {
        if self.initial_energy <= 0 {
            return Err(Error::config(format!(
                "{species} initialEnergy must be positive, got {}",
                self.initial_energy
            )));
        }
        if self.cost_of_living < 0 || self.feeding_energy < 0 {
            return Err(Error::config(format!(
                "{species} costOfLiving and feedingEnergy must be non-negative"
            )));
        }
        // Reproduction halves energy; both halves must stay alive.
        if self.energy_threshold < 2 {
            return Err(Error::config(format!(
                "{species} energyThreshold must be at least 2, got {}",
                self.energy_threshold
            )));
        }
        if let Some(max) = self.max_energy {
            if max <= 0 {
                return Err(Error::config(format!(
                    "{species} maxEnergy must be positive, got {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Genome-driven movement parameters shared by both species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovementConfig {
    /// Fraction of a gene's weight reallocated to it on reinforcement
    pub learning_rate: f64,
    /// Resampling budget before an organism gives up and stays put
    pub max_attempts: u32,
    /// Energy cost of a move, indexed by gene index (turn relative to last heading)
    pub move_costs: [i32; 8],
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.8,
            max_attempts: 20,
            move_costs: [0, 1, 2, 4, 8, 4, 2, 1],
        }
    }
}

/// Named food spawn rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FoodRule {
    /// Same low probability everywhere
    #[serde(alias = "even")]
    Uniform,
    /// Dense central rectangle, sparse elsewhere
    GardenOfEden,
    /// Dense lattice lines, almost nothing elsewhere
    LineRunner,
}

impl FoodRule {
    pub fn name(&self) -> &'static str {
        match self {
            FoodRule::Uniform => "uniform",
            FoodRule::GardenOfEden => "gardenOfEden",
            FoodRule::LineRunner => "lineRunner",
        }
    }
}

impl fmt::Display for FoodRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FoodRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uniform" | "even" => Ok(FoodRule::Uniform),
            "gardenOfEden" => Ok(FoodRule::GardenOfEden),
            "lineRunner" => Ok(FoodRule::LineRunner),
            other => Err(Error::config(format!(
                "unknown food rule '{other}', expected uniform, gardenOfEden or lineRunner"
            ))),
        }
    }
}

/// Geometry and thresholds of the food spawn rules.
///
/// A food-empty cell gains food when a uniform draw `u` satisfies `u >= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoodFieldConfig {
    pub uniform_threshold: f64,
    /// The eden rectangle extends `dimension / edenFraction` on each side of the center
    pub eden_fraction: usize,
    pub eden_inside_threshold: f64,
    pub eden_outside_threshold: f64,
    /// Lattice lines every `dimension / latticeDivisions` rows and columns
    pub lattice_divisions: usize,
    pub lattice_on_threshold: f64,
    pub lattice_off_threshold: f64,
}

impl Default for FoodFieldConfig {
    fn default() -> Self {
        Self {
            uniform_threshold: 0.999,
            eden_fraction: 10,
            eden_inside_threshold: 0.90,
            eden_outside_threshold: 0.99,
            lattice_divisions: 4,
            lattice_on_threshold: 0.95,
            lattice_off_threshold: 0.99999,
        }
    }
}

impl FoodFieldConfig {
    fn validate(&self) -> Result<()> {
        if self.eden_fraction == 0 || self.lattice_divisions == 0 {
            return Err(Error::config(
                "edenFraction and latticeDivisions must be positive",
            ));
        }
        let thresholds = [
            self.uniform_threshold,
            self.eden_inside_threshold,
            self.eden_outside_threshold,
            self.lattice_on_threshold,
            self.lattice_off_threshold,
        ];
        if thresholds.iter().any(|t| !(0.0..=1.0).contains(t)) {
            return Err(Error::config("food spawn thresholds must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Complete ecosystem configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EcosystemConfig {
    pub num_rows: usize,
    pub num_cols: usize,
    pub num_prey: usize,
    pub num_predators: usize,
    pub food_rule: FoodRule,
    /// Number of ticks to simulate; 0 yields only the initial snapshot
    pub total_timesteps: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Chance that a cell starts with food
    pub initial_food_probability: f64,
    pub prey: SpeciesConfig,
    pub predator: SpeciesConfig,
    pub movement: MovementConfig,
    pub food: FoodFieldConfig,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            num_rows: 50,
            num_cols: 50,
            num_prey: 10,
            num_predators: 50,
            food_rule: FoodRule::GardenOfEden,
            total_timesteps: 10,
            seed: 0,
            initial_food_probability: 0.10,
            prey: SpeciesConfig::prey(),
            predator: SpeciesConfig::predator(),
            movement: MovementConfig::default(),
            food: FoodFieldConfig::default(),
        }
    }
}

impl EcosystemConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("malformed configuration: {e}")))?;
        Ok(config)
    }

    pub fn species(&self, species: Species) -> &SpeciesConfig {
        match species {
            Species::Prey => &self.prey,
            Species::Predator => &self.predator,
        }
    }

    pub fn num_cells(&self) -> usize {
        self.num_rows.saturating_mul(self.num_cols)
    }

    /// Reject configurations the engine cannot run. Called before any state is built.
    pub fn validate(&self) -> Result<()> {
        if self.num_rows == 0 || self.num_cols == 0 {
            return Err(Error::config(format!(
                "grid must be non-empty, got {}x{}",
                self.num_rows, self.num_cols
            )));
        }
        let cells = self
            .num_rows
            .checked_mul(self.num_cols)
            .ok_or_else(|| Error::config("grid dimensions overflow"))?;
        let organisms = self
            .num_prey
            .checked_add(self.num_predators)
            .ok_or_else(|| Error::config("population size overflows"))?;
        if organisms > cells {
            return Err(Error::config(format!(
                "too many organisms: {} prey + {} predators exceed {} cells",
                self.num_prey, self.num_predators, cells
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_food_probability) {
            return Err(Error::config(format!(
                "initialFoodProbability must lie in [0, 1], got {}",
                self.initial_food_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.movement.learning_rate) {
            return Err(Error::config(format!(
                "learningRate must lie in [0, 1], got {}",
                self.movement.learning_rate
            )));
        }
        if self.movement.max_attempts == 0 {
            return Err(Error::config("maxAttempts must be at least 1"));
        }
        if self.movement.move_costs.iter().any(|&c| c < 0) {
            return Err(Error::config("moveCosts must be non-negative"));
        }
        self.prey.validate(Species::Prey)?;
        self.predator.validate(Species::Predator)?;
        self.food.validate()
    }
}
