//! Predator/prey ecosystem engine.
//!
//! Organisms live on a toroidal grid and are updated once per tick in a random
//! order. Every tick works on a fresh copy of the previous grid and publishes
//! the result as an immutable snapshot.

pub mod food;
pub mod genome;
pub mod grid;
pub mod lifecycle;
pub mod organism;
pub mod rng;
pub mod simulation;
pub mod snapshot;

pub use food::{FoodField, SpawnRule};
pub use genome::{select_direction, Genome, MoveChoice};
pub use grid::{Cell, Grid};
pub use lifecycle::{Meal, SpeciesRules};
pub use organism::{IdAllocator, Organism};
pub use rng::{seeded, RandomSource};
pub use simulation::Simulation;
pub use snapshot::SnapshotSequence;
