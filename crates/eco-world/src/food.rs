//! Food field: spontaneous food spawning on empty cells.
//!
//! Each rule maps a position to a spawn threshold; a food-empty cell gains food
//! when a uniform draw is at or above its threshold.

use crate::grid::Cell;
use crate::rng::RandomSource;
use eco_core::{EcosystemConfig, FoodFieldConfig, FoodRule, Position, Result};
use std::fmt;

/// A spawn rule, fixed for the lifetime of a run
pub trait SpawnRule: fmt::Debug + Send + Sync {
    /// Draws at or above this value spawn food at `pos`
    fn threshold(&self, pos: Position) -> f64;
}

/// Same threshold everywhere
#[derive(Debug, Clone)]
pub struct UniformRule {
    threshold: f64,
}

impl UniformRule {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl SpawnRule for UniformRule {
    fn threshold(&self, _pos: Position) -> f64 {
        self.threshold
    }
}

/// A central rectangle ("garden") with a much lower threshold than the rest
#[derive(Debug, Clone)]
pub struct GardenOfEdenRule {
    center_row: i64,
    center_col: i64,
    half_rows: i64,
    half_cols: i64,
    inside: f64,
    outside: f64,
}

impl GardenOfEdenRule {
    pub fn new(num_rows: usize, num_cols: usize, config: &FoodFieldConfig) -> Self {
        Self {
            center_row: (num_rows / 2) as i64,
            center_col: (num_cols / 2) as i64,
            half_rows: (num_rows / config.eden_fraction) as i64,
            half_cols: (num_cols / config.eden_fraction) as i64,
            inside: config.eden_inside_threshold,
            outside: config.eden_outside_threshold,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        let (row, col) = (pos.row as i64, pos.col as i64);
        (row - self.center_row).abs() <= self.half_rows
            && (col - self.center_col).abs() <= self.half_cols
    }
}

impl SpawnRule for GardenOfEdenRule {
    fn threshold(&self, pos: Position) -> f64 {
        if self.contains(pos) {
            self.inside
        } else {
            self.outside
        }
    }
}

/// Lattice lines every `rows / divisions` rows and `cols / divisions` columns.
/// Row 0 and column 0 are never on the lattice.
#[derive(Debug, Clone)]
pub struct LineRunnerRule {
    row_spacing: usize,
    col_spacing: usize,
    on_line: f64,
    off_line: f64,
}

impl LineRunnerRule {
    pub fn new(num_rows: usize, num_cols: usize, config: &FoodFieldConfig) -> Self {
        Self {
            row_spacing: num_rows / config.lattice_divisions,
            col_spacing: num_cols / config.lattice_divisions,
            on_line: config.lattice_on_threshold,
            off_line: config.lattice_off_threshold,
        }
    }

    pub fn on_lattice(&self, pos: Position) -> bool {
        if pos.row == 0 || pos.col == 0 {
            return false;
        }
        // A dimension smaller than the division count has no lines.
        (self.row_spacing > 0 && pos.row % self.row_spacing == 0)
            || (self.col_spacing > 0 && pos.col % self.col_spacing == 0)
    }
}

impl SpawnRule for LineRunnerRule {
    fn threshold(&self, pos: Position) -> f64 {
        if self.on_lattice(pos) {
            self.on_line
        } else {
            self.off_line
        }
    }
}

/// The configured spawn rule bound to one grid geometry
#[derive(Debug)]
pub struct FoodField {
    rule: FoodRule,
    spawner: Box<dyn SpawnRule>,
}

impl FoodField {
    pub fn new(rule: FoodRule, num_rows: usize, num_cols: usize, config: &FoodFieldConfig) -> Self {
        let spawner: Box<dyn SpawnRule> = match rule {
            FoodRule::Uniform => Box::new(UniformRule::new(config.uniform_threshold)),
            FoodRule::GardenOfEden => Box::new(GardenOfEdenRule::new(num_rows, num_cols, config)),
            FoodRule::LineRunner => Box::new(LineRunnerRule::new(num_rows, num_cols, config)),
        };
        Self { rule, spawner }
    }

    /// Validates the configuration first, so a bad rule fails at setup
    pub fn from_config(config: &EcosystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.food_rule,
            config.num_rows,
            config.num_cols,
            &config.food,
        ))
    }

    pub fn rule(&self) -> FoodRule {
        self.rule
    }

    pub fn should_spawn(&self, pos: Position, draw: f64) -> bool {
        draw >= self.spawner.threshold(pos)
    }

    /// Draw once for a food-empty cell and spawn food if the rule allows.
    /// Cells that already hold food consume no draw.
    pub fn replenish<R: RandomSource>(&self, cell: &mut Cell, pos: Position, rng: &mut R) -> bool {
        if cell.food {
            return false;
        }
        let spawned = self.should_spawn(pos, rng.unit());
        cell.food = spawned;
        spawned
    }
}
