//! Organism state shared by prey and predators.

use crate::genome::Genome;
use eco_core::{Direction, OrganismId, Result, SpeciesConfig};
use serde::{Deserialize, Serialize};

/// A prey or predator. Which one it is depends on the cell slot holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub energy: i32,
    pub age: u32,
    pub genome: Genome,
    /// Tick in which this organism was last processed
    pub last_updated: u64,
    pub last_direction: Direction,
}

impl Organism {
    pub fn new(id: OrganismId, energy: i32, genome: Genome) -> Self {
        Self {
            id,
            energy,
            age: 0,
            genome,
            last_updated: 0,
            last_direction: Direction::North,
        }
    }

    /// Fresh organism for the initial population
    pub fn seeded(id: OrganismId, config: &SpeciesConfig) -> Self {
        Self::new(id, config.initial_energy, Genome::uniform())
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    pub fn can_reproduce(&self, config: &SpeciesConfig) -> bool {
        self.age >= config.age_threshold && self.energy >= config.energy_threshold
    }

    pub fn consume_energy(&mut self, amount: i32) {
        self.energy = self.energy.saturating_sub(amount);
    }

    /// Add energy, clamped at `ceiling` when the species has one
    pub fn add_energy(&mut self, amount: i32, ceiling: Option<i32>) {
        self.energy = self.energy.saturating_add(amount);
        if let Some(max) = ceiling {
            self.energy = self.energy.min(max);
        }
    }

    pub fn tick(&mut self) {
        self.age += 1;
    }

    /// Split off a child heading `toward`.
    ///
    /// Energy is halved between parent and child, the parent's age resets, and
    /// the child's copy of the genome is reinforced toward the birth direction.
    /// The child is stamped with `tick` so it is not processed again this tick.
    pub fn reproduce(
        &mut self,
        child_id: OrganismId,
        toward: Direction,
        learning_rate: f64,
        tick: u64,
    ) -> Result<Organism> {
        self.age = 0;
        self.energy /= 2;

        let mut genome = self.genome.clone();
        genome.reinforce(toward.index(), learning_rate)?;

        Ok(Organism {
            id: child_id,
            energy: self.energy,
            age: 0,
            genome,
            last_updated: tick,
            last_direction: toward,
        })
    }
}

/// Hands out organism ids in allocation order
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after the highest id already in use
    pub fn starting_after(max_used: Option<OrganismId>) -> Self {
        Self {
            next: max_used.map_or(0, |id| id.0 + 1),
        }
    }

    pub fn allocate(&mut self) -> OrganismId {
        let id = OrganismId(self.next);
        self.next += 1;
        id
    }

    pub fn allocated(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organism_creation() {
        let organism = Organism::seeded(OrganismId(3), &SpeciesConfig::prey());

        assert_eq!(organism.id, OrganismId(3));
        assert_eq!(organism.energy, 50);
        assert_eq!(organism.age, 0);
        assert_eq!(organism.last_direction, Direction::North);
        assert_eq!(organism.genome, Genome::uniform());
        assert!(organism.is_alive());
    }

    #[test]
    fn test_energy_management() {
        let mut organism = Organism::new(OrganismId(0), 100, Genome::uniform());

        organism.consume_energy(60);
        assert_eq!(organism.energy, 40);

        organism.add_energy(50, Some(70));
        assert_eq!(organism.energy, 70);

        organism.add_energy(50, None);
        assert_eq!(organism.energy, 120);

        organism.consume_energy(120);
        assert!(!organism.is_alive());

        organism.consume_energy(i32::MAX);
        organism.consume_energy(i32::MAX);
        assert_eq!(organism.energy, i32::MIN);
    }

    #[test]
    fn test_reproduction_gating() {
        let config = SpeciesConfig::prey();
        let mut organism = Organism::new(OrganismId(0), config.energy_threshold, Genome::uniform());

        organism.age = config.age_threshold - 1;
        assert!(!organism.can_reproduce(&config));

        organism.age = config.age_threshold;
        assert!(organism.can_reproduce(&config));

        organism.energy = config.energy_threshold - 1;
        assert!(!organism.can_reproduce(&config));
    }

    #[test]
    fn test_reproduce_splits_energy() {
        let mut parent = Organism::new(OrganismId(1), 101, Genome::uniform());
        parent.age = 30;

        let child = parent
            .reproduce(OrganismId(9), Direction::SouthEast, 0.8, 12)
            .unwrap();

        assert_eq!(parent.age, 0);
        assert_eq!(parent.energy, 50);
        assert_eq!(child.energy, 50);
        assert_eq!(child.age, 0);
        assert_eq!(child.id, OrganismId(9));
        assert_eq!(child.last_updated, 12);
        assert_eq!(child.last_direction, Direction::SouthEast);
        assert!((child.genome.weight(3) - 0.225).abs() < 1e-12);
        assert_eq!(parent.genome, Genome::uniform());
    }

    #[test]
    fn test_id_allocation() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), OrganismId(0));
        assert_eq!(ids.allocate(), OrganismId(1));
        assert_eq!(ids.allocated(), 2);

        let mut ids = IdAllocator::starting_after(Some(OrganismId(41)));
        assert_eq!(ids.allocate(), OrganismId(42));
    }
}
