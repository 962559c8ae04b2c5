//! 2D toroidal grid of cells.

use crate::organism::Organism;
use eco_core::{
    Direction, Error, GenerationStats, OrganismId, PopulationCounts, Position, Result, Species,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One grid location. Food, a predator and a prey are independent; each
/// organism slot holds at most one organism.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub food: bool,
    predator: Option<Organism>,
    prey: Option<Organism>,
}

impl Cell {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_food(&self) -> bool {
        self.food
    }

    pub fn predator(&self) -> Option<&Organism> {
        self.predator.as_ref()
    }

    pub fn prey(&self) -> Option<&Organism> {
        self.prey.as_ref()
    }

    pub fn organism(&self, species: Species) -> Option<&Organism> {
        self.slot(species).as_ref()
    }

    pub fn has(&self, species: Species) -> bool {
        self.slot(species).is_some()
    }

    /// No predator and no prey
    pub fn is_vacant(&self) -> bool {
        self.predator.is_none() && self.prey.is_none()
    }

    /// Insert an organism into its species slot. An occupied slot means two
    /// organisms of one species would share the cell, which is never allowed.
    pub fn place(&mut self, species: Species, organism: Organism) -> Result<()> {
        let slot = self.slot_mut(species);
        if let Some(existing) = slot {
            return Err(Error::invariant(format!(
                "{species} {} would share a cell with {species} {}",
                organism.id, existing.id
            )));
        }
        *slot = Some(organism);
        Ok(())
    }

    /// Remove and return the organism of `species`, if any
    pub fn take(&mut self, species: Species) -> Option<Organism> {
        self.slot_mut(species).take()
    }

    fn slot(&self, species: Species) -> &Option<Organism> {
        match species {
            Species::Prey => &self.prey,
            Species::Predator => &self.predator,
        }
    }

    fn slot_mut(&mut self, species: Species) -> &mut Option<Organism> {
        match species {
            Species::Prey => &mut self.prey,
            Species::Predator => &mut self.predator,
        }
    }
}

/// A rectangular toroidal grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    num_rows: usize,
    num_cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Empty grid; both dimensions must be positive
    pub fn new(num_rows: usize, num_cols: usize) -> Result<Self> {
        if num_rows == 0 || num_cols == 0 {
            return Err(Error::config(format!(
                "grid must be non-empty, got {num_rows}x{num_cols}"
            )));
        }
        let size = num_rows
            .checked_mul(num_cols)
            .ok_or_else(|| Error::config("grid dimensions overflow"))?;
        Ok(Self {
            num_rows,
            num_cols,
            cells: vec![Cell::empty(); size],
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at an in-range position
    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[self.pos_to_index(pos)]
    }

    pub fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        let index = self.pos_to_index(pos);
        &mut self.cells[index]
    }

    /// Checked lookup for external consumers
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.num_rows && col < self.num_cols {
            Some(self.cell(Position::new(row, col)))
        } else {
            None
        }
    }

    /// Neighbour one step away, wrapping at the edges
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Position {
        pos.step(direction, self.num_rows, self.num_cols)
    }

    /// Apply an arbitrary offset, wrapping at the edges
    pub fn offset(&self, pos: Position, d_row: i32, d_col: i32) -> Position {
        pos.offset(d_row, d_col, self.num_rows, self.num_cols)
    }

    /// Independent copy: food flags and organisms are copied by value
    pub fn deep_copy(&self) -> Grid {
        self.clone()
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        debug_assert!(pos.row < self.num_rows && pos.col < self.num_cols);
        pos.row * self.num_cols + pos.col
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        Position::new(index / self.num_cols, index % self.num_cols)
    }

    /// Iterator over all positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), cell))
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut()
    }

    /// Forget which tick each organism was last processed in
    pub(crate) fn clear_update_marks(&mut self) {
        for cell in &mut self.cells {
            for org in [cell.predator.as_mut(), cell.prey.as_mut()].into_iter().flatten() {
                org.last_updated = 0;
            }
        }
    }

    /// Every organism of one species with its position
    pub fn organisms(&self, species: Species) -> impl Iterator<Item = (Position, &Organism)> + '_ {
        self.iter()
            .filter_map(move |(pos, cell)| cell.organism(species).map(|org| (pos, org)))
    }

    pub fn find(&self, id: OrganismId) -> Option<(Position, Species, &Organism)> {
        Species::ALL.into_iter().find_map(|species| {
            self.organisms(species)
                .find(|(_, org)| org.id == id)
                .map(|(pos, org)| (pos, species, org))
        })
    }

    pub fn max_id(&self) -> Option<OrganismId> {
        Species::ALL
            .into_iter()
            .flat_map(|species| self.organisms(species).map(|(_, org)| org.id))
            .max()
    }

    pub fn counts(&self) -> PopulationCounts {
        let mut counts = PopulationCounts::default();
        for cell in &self.cells {
            counts.prey += cell.prey.is_some() as usize;
            counts.predators += cell.predator.is_some() as usize;
            counts.food += cell.food as usize;
        }
        counts
    }

    pub fn stats(&self, generation: u64) -> GenerationStats {
        let mut stats = GenerationStats::new(generation);
        for cell in &self.cells {
            for species in Species::ALL {
                if let Some(org) = cell.organism(species) {
                    stats.species_mut(species).record(org.energy, org.age);
                }
            }
            stats.food_cells += cell.food as usize;
        }
        stats
    }

    /// Verify the state a published snapshot must satisfy: every organism is
    /// alive, has a normalised genome, and appears exactly once.
    pub fn audit(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (pos, cell) in self.iter() {
            for species in Species::ALL {
                let Some(org) = cell.organism(species) else {
                    continue;
                };
                if !org.is_alive() {
                    return Err(Error::invariant(format!(
                        "{species} {} at {pos} survived with energy {}",
                        org.id, org.energy
                    )));
                }
                org.genome.check()?;
                if !seen.insert(org.id) {
                    return Err(Error::invariant(format!(
                        "organism {} appears in more than one slot",
                        org.id
                    )));
                }
            }
        }
        Ok(())
    }
}
