//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an organism, allocated sequentially and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganismId(pub u64);

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two agent species sharing the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Species {
    Prey,
    Predator,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Predator, Species::Prey];

    pub fn name(&self) -> &'static str {
        match self {
            Species::Prey => "prey",
            Species::Predator => "predator",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Toroidal wraparound of a single coordinate.
///
/// `((index + delta) mod bound + bound) mod bound`, so any delta lands inside `0..bound`.
pub fn wrap(index: usize, delta: i32, bound: usize) -> usize {
    debug_assert!(bound > 0, "wrap bound must be positive");
    let bound = bound as i64;
    ((((index as i64) + delta as i64) % bound + bound) % bound) as usize
}

/// Cell coordinate in the world (row-major)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Apply an offset with toroidal wrapping for the given world dimensions
    pub fn offset(&self, d_row: i32, d_col: i32, num_rows: usize, num_cols: usize) -> Self {
        Self {
            row: wrap(self.row, d_row, num_rows),
            col: wrap(self.col, d_col, num_cols),
        }
    }

    /// Neighbouring position one step in `direction`
    pub fn step(&self, direction: Direction, num_rows: usize, num_cols: usize) -> Self {
        let (d_row, d_col) = direction.to_delta();
        self.offset(d_row, d_col, num_rows, num_cols)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Compass direction. The discriminant is the index into the compass table,
/// numbered clockwise from north so that a gene index is a clockwise turn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const COUNT: usize = 8;

    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Index into the compass table (0..8)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Direction for a compass index, taken modulo 8
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    /// Turn clockwise by `steps` eighths: `(self + steps) mod 8`
    pub fn rotate(&self, steps: usize) -> Self {
        Self::from_index(self.index() + steps)
    }

    /// `(Δrow, Δcol)`; rows grow southward, columns grow eastward
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }
}
