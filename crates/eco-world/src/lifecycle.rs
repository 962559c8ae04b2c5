//! Per-organism update: reproduce, move, feed, age, or die.
//!
//! Both species run the same sequence; the differences (what blocks a move,
//! where a child may be born, what counts as a meal) are captured by
//! [`SpeciesRules`], dispatched on the [`Species`] tag.

use crate::genome::select_direction;
use crate::grid::{Cell, Grid};
use crate::organism::{IdAllocator, Organism};
use crate::rng::RandomSource;
use eco_core::{Direction, EcosystemConfig, OrganismId, Position, Result, Species, SpeciesConfig, TickCounters};
use tracing::trace;

/// What an organism ate this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meal {
    Food,
    Prey(OrganismId),
}

/// Species-specific occupancy and feeding behaviour
pub trait SpeciesRules {
    /// Whether `destination` refuses an organism of this species
    fn blocks_movement(&self, destination: &Cell) -> bool;

    /// Whether a newborn of this species may be placed in `cell`
    fn accepts_offspring(&self, cell: &Cell) -> bool;

    /// Eat whatever `cell` offers, if anything
    fn feed(&self, organism: &mut Organism, cell: &mut Cell, config: &SpeciesConfig) -> Option<Meal>;
}

impl SpeciesRules for Species {
    fn blocks_movement(&self, destination: &Cell) -> bool {
        match self {
            Species::Prey => !destination.is_vacant(),
            // Prey never block a predator; the predator eats them instead.
            Species::Predator => destination.has(Species::Predator),
        }
    }

    fn accepts_offspring(&self, cell: &Cell) -> bool {
        match self {
            Species::Prey => cell.is_vacant(),
            // A newborn predator may share a cell with a prey, which is left untouched.
            Species::Predator => !cell.has(Species::Predator),
        }
    }

    fn feed(&self, organism: &mut Organism, cell: &mut Cell, config: &SpeciesConfig) -> Option<Meal> {
        match self {
            Species::Prey => {
                let hungry = config.max_energy.map_or(true, |max| organism.energy < max);
                if cell.food && hungry {
                    cell.food = false;
                    organism.add_energy(config.feeding_energy, config.max_energy);
                    Some(Meal::Food)
                } else {
                    None
                }
            }
            Species::Predator => {
                let victim = cell.take(Species::Prey)?;
                organism.add_energy(config.feeding_energy, config.max_energy);
                Some(Meal::Prey(victim.id))
            }
        }
    }
}

/// Mutable state one tick threads through every organism update
pub(crate) struct TickContext<'a, R> {
    pub grid: &'a mut Grid,
    pub config: &'a EcosystemConfig,
    pub rng: &'a mut R,
    pub ids: &'a mut IdAllocator,
    pub counters: &'a mut TickCounters,
    pub tick: u64,
}

/// Process the `species` organism at `pos`, if there is one that has not been
/// processed this tick. The organism is lifted out of its slot for the whole
/// update and re-inserted at its destination, or dropped if it died.
pub(crate) fn update_organism<R: RandomSource>(
    ctx: &mut TickContext<'_, R>,
    species: Species,
    pos: Position,
) -> Result<()> {
    let pending = ctx
        .grid
        .cell(pos)
        .organism(species)
        .is_some_and(|org| org.last_updated != ctx.tick);
    if !pending {
        return Ok(());
    }
    let Some(mut organism) = ctx.grid.cell_mut(pos).take(species) else {
        return Ok(());
    };
    organism.last_updated = ctx.tick;

    if !organism.is_alive() {
        starve(ctx, species, pos, &organism);
        return Ok(());
    }

    let ecosystem = ctx.config;
    let config = ecosystem.species(species);

    if organism.can_reproduce(config) {
        reproduce(ctx, species, pos, &mut organism)?;
    }

    let grid: &Grid = &*ctx.grid;
    let choice = select_direction(
        &organism.genome,
        organism.last_direction,
        ecosystem.movement.max_attempts,
        &mut *ctx.rng,
        |direction| species.blocks_movement(grid.cell(grid.neighbor(pos, direction))),
    );

    let mut cost = config.cost_of_living;
    if choice.is_move() {
        cost = cost.saturating_add(ecosystem.movement.move_costs[choice.gene_index]);
    } else {
        ctx.counters.species_mut(species).stuck += 1;
    }
    organism.consume_energy(cost);
    if !organism.is_alive() {
        starve(ctx, species, pos, &organism);
        return Ok(());
    }

    let destination = ctx.grid.offset(pos, choice.d_row, choice.d_col);
    organism.last_direction = choice.direction;

    let cell = ctx.grid.cell_mut(destination);
    match species.feed(&mut organism, cell, config) {
        Some(Meal::Food) => ctx.counters.meals += 1,
        Some(Meal::Prey(victim)) => {
            ctx.counters.predations += 1;
            trace!(
                tick = ctx.tick,
                predator_id = %organism.id,
                prey_id = %victim,
                row = destination.row,
                col = destination.col,
                energy = organism.energy,
                "Predator ate prey"
            );
        }
        None => {}
    }

    organism.tick();
    cell.place(species, organism)
}

/// Place a child in a random free neighbour, if any. A missing free neighbour
/// is not an error; the organism simply does not reproduce this tick.
fn reproduce<R: RandomSource>(
    ctx: &mut TickContext<'_, R>,
    species: Species,
    pos: Position,
    parent: &mut Organism,
) -> Result<()> {
    // On very small grids several directions can wrap onto the same cell,
    // including the parent's own; each cell is a candidate at most once.
    let mut free: Vec<(Direction, Position)> = Vec::with_capacity(Direction::COUNT);
    for direction in Direction::ALL {
        let neighbor = ctx.grid.neighbor(pos, direction);
        if neighbor == pos || free.iter().any(|(_, p)| *p == neighbor) {
            continue;
        }
        if species.accepts_offspring(ctx.grid.cell(neighbor)) {
            free.push((direction, neighbor));
        }
    }
    if free.is_empty() {
        return Ok(());
    }

    let (toward, birthplace) = free[ctx.rng.below(free.len())];
    let child = parent.reproduce(
        ctx.ids.allocate(),
        toward,
        ctx.config.movement.learning_rate,
        ctx.tick,
    )?;
    trace!(
        tick = ctx.tick,
        species = %species,
        parent_id = %parent.id,
        child_id = %child.id,
        row = birthplace.row,
        col = birthplace.col,
        energy = child.energy,
        "Organism reproduced"
    );
    ctx.grid.cell_mut(birthplace).place(species, child)?;
    ctx.counters.species_mut(species).births += 1;
    Ok(())
}

fn starve<R>(ctx: &mut TickContext<'_, R>, species: Species, pos: Position, organism: &Organism) {
    ctx.counters.species_mut(species).starved += 1;
    trace!(
        tick = ctx.tick,
        species = %species,
        organism_id = %organism.id,
        row = pos.row,
        col = pos.col,
        age = organism.age,
        "Organism starved"
    );
}
