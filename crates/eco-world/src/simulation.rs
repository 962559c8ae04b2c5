//! Generation scheduler: one randomized pass over the grid per tick.

use crate::food::FoodField;
use crate::grid::Grid;
use crate::lifecycle::{update_organism, TickContext};
use crate::organism::{IdAllocator, Organism};
use crate::rng::{seeded, RandomSource};
use crate::snapshot::SnapshotSequence;
use eco_core::{EcosystemConfig, Error, Position, Result, Species, TickCounters};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub struct Simulation<R = ChaCha8Rng> {
    config: EcosystemConfig,
    food: FoodField,
    rng: R,
    ids: IdAllocator,
    snapshots: Vec<Arc<Grid>>,
    tick_counters: Vec<TickCounters>,
    totals: TickCounters,
    tick: u64,
}

impl Simulation<ChaCha8Rng> {
    /// Seed a new world from `config.seed`
    pub fn new(config: EcosystemConfig) -> Result<Self> {
        let rng = seeded(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Seed a new world drawing from `rng`
    pub fn with_rng(config: EcosystemConfig, mut rng: R) -> Result<Self> {
        let food = FoodField::from_config(&config)?;
        let mut ids = IdAllocator::new();
        let grid = seed_grid(&config, &mut rng, &mut ids)?;

        let counts = grid.counts();
        debug!(
            rows = config.num_rows,
            cols = config.num_cols,
            prey = counts.prey,
            predators = counts.predators,
            food = counts.food,
            "Seeded initial grid"
        );

        Ok(Self::assemble(config, food, rng, ids, grid))
    }

    /// Start from a caller-built initial grid instead of random seeding.
    /// Population sizes in `config` are ignored; the grid must match its
    /// dimensions and satisfy the snapshot invariants. Update marks are reset
    /// so every organism takes part in tick 1.
    pub fn from_grid(config: EcosystemConfig, mut grid: Grid, rng: R) -> Result<Self> {
        let food = FoodField::from_config(&config)?;
        if grid.num_rows() != config.num_rows || grid.num_cols() != config.num_cols {
            return Err(Error::config(format!(
                "initial grid is {}x{} but the configuration expects {}x{}",
                grid.num_rows(),
                grid.num_cols(),
                config.num_rows,
                config.num_cols
            )));
        }
        grid.audit()?;
        grid.clear_update_marks();
        let ids = IdAllocator::starting_after(grid.max_id());
        Ok(Self::assemble(config, food, rng, ids, grid))
    }

    fn assemble(config: EcosystemConfig, food: FoodField, rng: R, ids: IdAllocator, grid: Grid) -> Self {
        Self {
            config,
            food,
            rng,
            ids,
            snapshots: vec![Arc::new(grid)],
            tick_counters: Vec::new(),
            totals: TickCounters::new(),
            tick: 0,
        }
    }

    pub fn config(&self) -> &EcosystemConfig {
        &self.config
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The most recently published snapshot
    pub fn latest(&self) -> &Arc<Grid> {
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// Event counters summed over all completed ticks
    pub fn totals(&self) -> TickCounters {
        self.totals
    }

    /// The snapshots published so far
    pub fn sequence(&self) -> SnapshotSequence {
        SnapshotSequence::new(self.snapshots.clone(), self.tick_counters.clone())
    }

    pub fn into_sequence(self) -> SnapshotSequence {
        SnapshotSequence::new(self.snapshots, self.tick_counters)
    }

    /// Execute one tick and publish its snapshot.
    ///
    /// Works on a deep copy of the latest snapshot; earlier snapshots are never
    /// touched. An invariant violation aborts the tick without publishing.
    pub fn step(&mut self) -> Result<TickCounters> {
        let tick = self.tick + 1;
        let mut grid = self.latest().deep_copy();

        let mut order: Vec<Position> = grid.positions().collect();
        self.rng.shuffle(&mut order);

        let mut counters = TickCounters::new();
        let mut ctx = TickContext {
            grid: &mut grid,
            config: &self.config,
            rng: &mut self.rng,
            ids: &mut self.ids,
            counters: &mut counters,
            tick,
        };
        for pos in order {
            for species in Species::ALL {
                update_organism(&mut ctx, species, pos)?;
            }
            if self.food.replenish(ctx.grid.cell_mut(pos), pos, &mut *ctx.rng) {
                ctx.counters.food_spawned += 1;
            }
        }

        grid.audit()?;

        let counts = grid.counts();
        debug!(
            tick,
            prey = counts.prey,
            predators = counts.predators,
            food = counts.food,
            prey_births = counters.prey.births,
            predator_births = counters.predators.births,
            prey_starved = counters.prey.starved,
            predators_starved = counters.predators.starved,
            predations = counters.predations,
            meals = counters.meals,
            stuck = counters.prey.stuck + counters.predators.stuck,
            food_spawned = counters.food_spawned,
            "Tick complete"
        );

        self.snapshots.push(Arc::new(grid));
        self.tick_counters.push(counters);
        self.totals += counters;
        self.tick = tick;
        Ok(counters)
    }

    /// Run the remaining ticks up to `total_timesteps`
    #[instrument(skip(self), fields(total_timesteps = self.config.total_timesteps, seed = self.config.seed))]
    pub fn run(mut self) -> Result<SnapshotSequence> {
        self.advance(None)?;
        Ok(self.into_sequence())
    }

    /// Like [`Simulation::run`], but stops at the first tick boundary after
    /// `cancel` fires and returns the snapshots produced so far.
    #[instrument(skip(self, cancel), fields(total_timesteps = self.config.total_timesteps, seed = self.config.seed))]
    pub fn run_until_cancelled(mut self, cancel: &CancellationToken) -> Result<SnapshotSequence> {
        self.advance(Some(cancel))?;
        Ok(self.into_sequence())
    }

    fn advance(&mut self, cancel: Option<&CancellationToken>) -> Result<()> {
        let total = self.config.total_timesteps;
        let start = self.latest().counts();
        info!(
            rows = self.config.num_rows,
            cols = self.config.num_cols,
            food_rule = %self.food.rule(),
            prey = start.prey,
            predators = start.predators,
            "Starting simulation for {} ticks",
            total
        );

        while self.tick < total {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                warn!(tick = self.tick, total, "Simulation cancelled");
                break;
            }
            let counters = self.step()?;
            if reports_progress(self.tick, total) {
                let counts = self.latest().counts();
                info!(
                    prey = counts.prey,
                    predators = counts.predators,
                    food = counts.food,
                    births = counters.births(),
                    deaths = counters.deaths(),
                    "Tick {}/{}",
                    self.tick,
                    total
                );
            }
        }

        let end = self.latest().counts();
        info!(
            ticks = self.tick,
            prey = end.prey,
            predators = end.predators,
            food = end.food,
            births = self.totals.births(),
            deaths = self.totals.deaths(),
            predations = self.totals.predations,
            organisms_created = self.ids.allocated(),
            "Simulation finished"
        );
        Ok(())
    }
}

/// Progress is logged after tick 1 and every `total / 10` ticks; runs shorter
/// than ten ticks only report tick 1.
fn reports_progress(tick: u64, total: u64) -> bool {
    let every = total / 10;
    tick == 1 || (every > 0 && tick % every == 0)
}

/// Build the initial grid: food first, then predators, then prey, each
/// organism in its own uniformly random cell.
fn seed_grid<R: RandomSource>(
    config: &EcosystemConfig,
    rng: &mut R,
    ids: &mut IdAllocator,
) -> Result<Grid> {
    let mut grid = Grid::new(config.num_rows, config.num_cols)?;

    let food_cutoff = 1.0 - config.initial_food_probability;
    for cell in grid.cells_mut() {
        cell.food = rng.unit() > food_cutoff;
    }

    let mut order: Vec<Position> = grid.positions().collect();
    rng.shuffle(&mut order);

    let mut free = order.into_iter();
    for (species, count) in [
        (Species::Predator, config.num_predators),
        (Species::Prey, config.num_prey),
    ] {
        for _ in 0..count {
            let pos = free.next().ok_or_else(|| {
                Error::config(format!("no room left to place {species} on the grid"))
            })?;
            let organism = Organism::seeded(ids.allocate(), config.species(species));
            grid.cell_mut(pos).place(species, organism)?;
        }
    }
    Ok(grid)
}
