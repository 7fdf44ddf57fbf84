//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a snake; equal to its creation index within a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnakeId(pub usize);

impl fmt::Display for SnakeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Grid cell coordinate. Signed so that a step off the board is representable.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn manhattan(&self, other: &Position) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Vector pointing from `self` to `dest`
    pub fn diff(&self, dest: &Position) -> Vector {
        Vector::new(dest.row - self.row, dest.col - self.col)
    }

    pub fn offset(&self, vector: Vector) -> Position {
        Position::new(self.row + vector.row, self.col + vector.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Integer displacement in (row, column) space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Vector {
    pub row: i32,
    pub col: i32,
}

impl Vector {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn scale(&self, factor: i32) -> Vector {
        Vector::new(self.row * factor, self.col * factor)
    }

    /// Counter-clockwise angle against the (1, 0) axis, treating `row` as x
    /// and `col` as y. Result lies in [-pi, pi].
    pub fn angle(&self) -> f64 {
        (self.col as f64).atan2(self.row as f64)
    }
}

/// Heading of a snake on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Clockwise order, starting at `Up`
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub fn vector(self) -> Vector {
        match self {
            Direction::Up => Vector::new(-1, 0),
            Direction::Down => Vector::new(1, 0),
            Direction::Left => Vector::new(0, -1),
            Direction::Right => Vector::new(0, 1),
        }
    }

    pub fn left_of(self) -> Direction {
        Self::ALL[(self.index() + 3) % 4]
    }

    pub fn right_of(self) -> Direction {
        Self::ALL[(self.index() + 1) % 4]
    }

    pub fn opposite(self) -> Direction {
        Self::ALL[(self.index() + 2) % 4]
    }

    /// Heading after applying a relative turn
    pub fn turn(self, turn: Turn) -> Direction {
        match turn {
            Turn::Forward => self,
            Turn::Left => self.left_of(),
            Turn::Right => self.right_of(),
        }
    }
}

/// Relative steering decision produced by a brain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Forward,
    Left,
    Right,
}

impl Turn {
    /// Output-unit order expected from decision oracles
    pub const ALL: [Turn; 3] = [Turn::Forward, Turn::Left, Turn::Right];
}
