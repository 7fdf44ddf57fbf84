//! Snake - one agent's body, heading, fruit target and score

use ahash::AHashMap;
use std::collections::VecDeque;

use crate::board::Board;
use crate::brain::Brain;
use crate::core::error::{Result, SimError};
use crate::core::types::{Direction, Position, SnakeId, Turn};

pub struct Snake {
    pub id: SnakeId,
    /// Display color, a pure function of `id`
    pub color: String,
    /// Body cells, tail at the front and head at the back
    positions: VecDeque<Position>,
    pub direction: Direction,
    pub fruit: Option<Position>,
    pub score: f64,
    /// Fruits eaten this generation
    pub fruits: u32,
    pub alive: bool,
    /// Visits per cell since the last fruit
    history: AHashMap<Position, u32>,
    brain: Option<Brain>,
}

impl Snake {
    pub fn new(id: SnakeId, positions: Vec<Position>, direction: Direction) -> Self {
        Self {
            id,
            color: color_for(id),
            positions: positions.into(),
            direction,
            fruit: None,
            score: 0.0,
            fruits: 0,
            alive: true,
            history: AHashMap::new(),
            brain: None,
        }
    }

    pub fn positions(&self) -> &VecDeque<Position> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get_head(&self) -> Result<Position> {
        self.positions
            .back()
            .copied()
            .ok_or(SimError::EmptySnake(self.id))
    }

    /// Cell the head would enter following the current direction
    pub fn get_next_position(&self) -> Result<Position> {
        Ok(self.get_head()?.offset(self.direction.vector()))
    }

    /// Shift the body forward: `pos` becomes the head and the old tail is
    /// removed and returned.
    pub fn move_to(&mut self, pos: Position) -> Result<Position> {
        self.extend_to(pos)?;
        self.positions
            .pop_front()
            .ok_or(SimError::EmptySnake(self.id))
    }

    /// Grow by one: `pos` becomes the head and the tail stays put
    pub fn extend_to(&mut self, pos: Position) -> Result<()> {
        let head = self.get_head()?;
        if head.manhattan(&pos) != 1 {
            return Err(SimError::NonAdjacentExtend { from: head, to: pos });
        }
        self.positions.push_back(pos);
        Ok(())
    }

    pub fn add_history(&mut self, pos: Position) {
        *self.history.entry(pos).or_insert(0) += 1;
    }

    pub fn get_history_count(&self, pos: Position) -> u32 {
        self.history.get(&pos).copied().unwrap_or(0)
    }

    /// Record a fruit and target the next one (if any cell was free)
    pub fn eat_fruit(&mut self, new_fruit: Option<Position>) {
        self.fruit = new_fruit;
        self.fruits += 1;
        self.history.clear();
    }

    pub fn brain(&self) -> Option<&Brain> {
        self.brain.as_ref()
    }

    pub fn set_brain(&mut self, brain: Brain) {
        self.brain = Some(brain);
    }

    pub fn clear_brain(&mut self) {
        self.brain = None;
    }

    /// Ask the bound brain for a turn and rotate the heading accordingly
    pub fn think(&mut self, board: &Board) -> Result<Turn> {
        let turn = match &self.brain {
            Some(brain) => brain.decide(self, board)?,
            None => return Err(SimError::NoBrain(self.id)),
        };
        self.direction = self.direction.turn(turn);
        Ok(turn)
    }
}

impl std::fmt::Debug for Snake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snake")
            .field("id", &self.id)
            .field("positions", &self.positions)
            .field("direction", &self.direction)
            .field("fruit", &self.fruit)
            .field("score", &self.score)
            .field("fruits", &self.fruits)
            .field("alive", &self.alive)
            .finish()
    }
}

/// Deterministic pseudo-random `#rrggbb` color for a snake id
pub fn color_for(id: SnakeId) -> String {
    let x = ((id.0 + 1) as f64).sin() * 10000.0;
    let unit = x - x.floor();
    format!("#{:06x}", (unit * 16_777_215.0).floor() as u32)
}
