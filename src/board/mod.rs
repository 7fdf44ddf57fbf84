//! Board - the shared grid every snake moves on
//!
//! Nodes live in a single row-major arena indexed by position. Walls and
//! free (non-wall) cells are mirrored in ordered sets so random placement
//! is reproducible under a seeded RNG.

pub mod node;

pub use node::Node;

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

use crate::core::types::{Direction, Position, SnakeId};
use crate::entity::Snake;

pub struct Board {
    rows: usize,
    columns: usize,
    nodes: Vec<Node>,
    walls: BTreeSet<Position>,
    /// Every non-wall cell; occupied cells still count as free
    free: BTreeSet<Position>,
    rng: ChaCha8Rng,
}

impl Board {
    pub fn new(rows: usize, columns: usize, rng: ChaCha8Rng) -> Self {
        let mut nodes = Vec::with_capacity(rows * columns);
        let mut free = BTreeSet::new();
        for row in 0..rows {
            for col in 0..columns {
                let position = Position::new(row as i32, col as i32);
                nodes.push(Node::new(position));
                free.insert(position);
            }
        }

        Self {
            rows,
            columns,
            nodes,
            walls: BTreeSet::new(),
            free,
            rng,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn walls(&self) -> &BTreeSet<Position> {
        &self.walls
    }

    pub fn free_spaces(&self) -> &BTreeSet<Position> {
        &self.free
    }

    #[inline]
    pub fn out_of_bounds(&self, pos: Position) -> bool {
        pos.row < 0 || pos.col < 0 || pos.row as usize >= self.rows || pos.col as usize >= self.columns
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        if self.out_of_bounds(pos) {
            None
        } else {
            Some(pos.row as usize * self.columns + pos.col as usize)
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Node> {
        self.index(pos).map(|i| &self.nodes[i])
    }

    fn get_mut(&mut self, pos: Position) -> Option<&mut Node> {
        self.index(pos).map(move |i| &mut self.nodes[i])
    }

    /// In-bounds neighbours in clockwise order starting above `pos`
    pub fn get_adjacent(&self, pos: Position) -> Vec<&Node> {
        Direction::ALL
            .iter()
            .filter_map(|d| self.get(pos.offset(d.vector())))
            .collect()
    }

    /// True if `snake` would die entering `pos`
    pub fn is_obstacle(&self, pos: Position, snake: SnakeId) -> bool {
        self.get(pos).map_or(true, |node| node.has_obstacle(snake))
    }

    // === WALLS ===

    pub fn add_wall(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.nodes[i].set_wall(true);
            self.walls.insert(pos);
            self.free.remove(&pos);
        }
    }

    pub fn remove_wall(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.nodes[i].set_wall(false);
            self.walls.remove(&pos);
            self.free.insert(pos);
        }
    }

    /// Flip the wall flag of a cell, returning whether it is now a wall
    pub fn toggle_wall(&mut self, pos: Position) -> bool {
        match self.get(pos).map(Node::is_wall) {
            Some(true) => {
                self.remove_wall(pos);
                false
            }
            Some(false) => {
                self.add_wall(pos);
                true
            }
            None => false,
        }
    }

    pub fn remove_walls(&mut self) {
        let walls: Vec<Position> = self.walls.iter().copied().collect();
        for pos in walls {
            self.remove_wall(pos);
        }
    }

    /// Wall each eligible cell with probability `density`.
    ///
    /// Cells for which `reserved` returns true, and cells holding a snake or
    /// fruit, are never walled. Returns the number of walls added.
    pub fn add_random_walls<F>(&mut self, density: f64, reserved: F) -> usize
    where
        F: Fn(Position) -> bool,
    {
        use rand::Rng;

        if density <= 0.0 {
            return 0;
        }

        let candidates: Vec<Position> = self
            .free
            .iter()
            .copied()
            .filter(|&pos| !reserved(pos))
            .filter(|&pos| self.get(pos).map_or(false, Node::is_empty))
            .collect();

        let mut added = 0;
        for pos in candidates {
            if self.rng.gen_bool(density.min(1.0)) {
                self.add_wall(pos);
                added += 1;
            }
        }
        added
    }

    // === SNAKES ===

    /// Register every body cell of `snake`, plus its fruit
    pub fn add_snake(&mut self, snake: &Snake) {
        for &pos in snake.positions() {
            self.add_snake_position(snake.id, pos);
        }
        if let Some(fruit) = snake.fruit {
            self.add_fruit(snake.id, Some(fruit));
        }
    }

    /// Unregister every body cell of `snake`, plus its fruit
    pub fn delete_snake(&mut self, snake: &Snake) {
        for &pos in snake.positions() {
            self.remove_snake_position(snake.id, pos);
        }
        if let Some(fruit) = snake.fruit {
            self.delete_fruit(snake.id, fruit);
        }
    }

    pub fn add_snake_position(&mut self, snake: SnakeId, pos: Position) {
        if let Some(node) = self.get_mut(pos) {
            node.add_snake(snake);
        }
    }

    pub fn remove_snake_position(&mut self, snake: SnakeId, pos: Position) {
        if let Some(node) = self.get_mut(pos) {
            node.remove_snake(snake);
        }
    }

    // === FRUIT ===

    /// Place a fruit for `snake`.
    ///
    /// With no explicit position, a cell is drawn uniformly among free cells
    /// not covered by the snake's own body. Other snakes and their fruit do
    /// not exclude a cell. Returns `None` when no cell is eligible.
    pub fn add_fruit(&mut self, snake: SnakeId, pos: Option<Position>) -> Option<Position> {
        let pos = match pos {
            Some(pos) => pos,
            None => self.random_free_space(snake)?,
        };
        let node = self.get_mut(pos)?;
        node.add_fruit(snake);
        Some(pos)
    }

    pub fn delete_fruit(&mut self, snake: SnakeId, pos: Position) {
        if let Some(node) = self.get_mut(pos) {
            node.remove_fruit(snake);
        }
    }

    fn random_free_space(&mut self, snake: SnakeId) -> Option<Position> {
        let eligible: Vec<Position> = self
            .free
            .iter()
            .copied()
            .filter(|&pos| self.get(pos).map_or(false, |node| !node.has_snake(snake)))
            .collect();
        eligible.choose(&mut self.rng).copied()
    }

    /// Drop all snake and fruit references, keeping walls
    pub fn clear_objects(&mut self) {
        for node in &mut self.nodes {
            node.clear_objects();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn board(rows: usize, columns: usize) -> Board {
        Board::new(rows, columns, ChaCha8Rng::seed_from_u64(7))
    }

    #[test]
    fn test_get_out_of_range_is_none() {
        let board = board(3, 4);
        assert!(board.get(Position::new(2, 3)).is_some());
        assert!(board.get(Position::new(3, 0)).is_none());
        assert!(board.get(Position::new(0, -1)).is_none());
        assert!(board.out_of_bounds(Position::new(-1, 0)));
    }

    #[test]
    fn test_adjacent_corner_and_center() {
        let board = board(3, 3);
        assert_eq!(board.get_adjacent(Position::new(0, 0)).len(), 2);
        assert_eq!(board.get_adjacent(Position::new(1, 1)).len(), 4);
        assert_eq!(board.get_adjacent(Position::new(0, 1)).len(), 3);
    }

    #[test]
    fn test_walls_leave_free_space() {
        let mut board = board(3, 3);
        let pos = Position::new(1, 1);
        board.add_wall(pos);
        assert!(board.walls().contains(&pos));
        assert!(!board.free_spaces().contains(&pos));
        assert_eq!(board.free_spaces().len(), 8);

        assert!(!board.toggle_wall(pos));
        assert!(board.free_spaces().contains(&pos));
        assert!(board.toggle_wall(pos));
        board.remove_walls();
        assert!(board.walls().is_empty());
        assert_eq!(board.free_spaces().len(), 9);
    }

    #[test]
    fn test_random_fruit_avoids_own_body_and_walls() {
        let mut board = board(2, 2);
        let me = SnakeId(0);
        board.add_snake_position(me, Position::new(0, 0));
        board.add_snake_position(me, Position::new(0, 1));
        board.add_wall(Position::new(1, 0));

        for _ in 0..20 {
            let fruit = board.add_fruit(me, None);
            assert_eq!(fruit, Some(Position::new(1, 1)));
        }
    }

    #[test]
    fn test_fruit_may_sit_under_other_snake() {
        let mut board = board(1, 2);
        board.add_snake_position(SnakeId(0), Position::new(0, 0));
        board.add_snake_position(SnakeId(1), Position::new(0, 1));

        assert_eq!(board.add_fruit(SnakeId(0), None), Some(Position::new(0, 1)));
    }

    #[test]
    fn test_saturated_board_has_no_fruit() {
        let mut board = board(1, 2);
        board.add_snake_position(SnakeId(0), Position::new(0, 0));
        board.add_wall(Position::new(0, 1));
        assert_eq!(board.add_fruit(SnakeId(0), None), None);
    }

    #[test]
    fn test_random_walls_respect_reserved_and_occupied() {
        let mut board = board(6, 6);
        board.add_snake_position(SnakeId(0), Position::new(0, 0));
        let added = board.add_random_walls(1.0, |pos| pos.row == 3);
        // 36 cells minus a reserved row of 6 minus the occupied cell
        assert_eq!(added, 29);
        assert!(board.walls().iter().all(|pos| pos.row != 3));
        assert!(!board.get(Position::new(0, 0)).map_or(true, Node::is_wall));
    }

    #[test]
    fn test_clear_objects_keeps_walls() {
        let mut board = board(3, 3);
        board.add_wall(Position::new(0, 0));
        board.add_snake_position(SnakeId(0), Position::new(1, 1));
        board.add_fruit(SnakeId(0), Some(Position::new(2, 2)));
        board.clear_objects();

        assert!(board.get(Position::new(1, 1)).map_or(false, Node::is_empty));
        assert!(board.get(Position::new(2, 2)).map_or(false, Node::is_empty));
        assert_eq!(board.walls().len(), 1);
    }
}
