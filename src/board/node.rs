//! A single grid cell and the snakes that reference it

use ahash::AHashSet;

use crate::core::types::{Position, SnakeId};

/// One cell of the board
///
/// Occupancy is tracked by snake id so that several snakes can overlap:
/// snakes only ever collide with walls and with their own body.
#[derive(Debug, Clone)]
pub struct Node {
    pub position: Position,
    is_wall: bool,
    /// Snakes with a body segment on this cell
    snakes: AHashSet<SnakeId>,
    /// Snakes whose current fruit target is this cell
    fruits: AHashSet<SnakeId>,
}

impl Node {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            is_wall: false,
            snakes: AHashSet::new(),
            fruits: AHashSet::new(),
        }
    }

    pub fn is_wall(&self) -> bool {
        self.is_wall
    }

    pub(crate) fn set_wall(&mut self, is_wall: bool) {
        self.is_wall = is_wall;
    }

    pub fn snakes(&self) -> &AHashSet<SnakeId> {
        &self.snakes
    }

    pub fn fruits(&self) -> &AHashSet<SnakeId> {
        &self.fruits
    }

    pub fn has_snake(&self, snake: SnakeId) -> bool {
        self.snakes.contains(&snake)
    }

    pub fn has_fruit_for(&self, snake: SnakeId) -> bool {
        self.fruits.contains(&snake)
    }

    /// True if `snake` would die entering this cell: a wall or its own body.
    /// Other snakes never block.
    pub fn has_obstacle(&self, snake: SnakeId) -> bool {
        self.is_wall || self.snakes.contains(&snake)
    }

    pub fn is_empty(&self) -> bool {
        self.snakes.is_empty() && self.fruits.is_empty()
    }

    pub(crate) fn add_snake(&mut self, snake: SnakeId) {
        self.snakes.insert(snake);
    }

    pub(crate) fn remove_snake(&mut self, snake: SnakeId) {
        self.snakes.remove(&snake);
    }

    pub(crate) fn add_fruit(&mut self, snake: SnakeId) {
        self.fruits.insert(snake);
    }

    pub(crate) fn remove_fruit(&mut self, snake: SnakeId) {
        self.fruits.remove(&snake);
    }

    pub fn clear_objects(&mut self) {
        self.snakes.clear();
        self.fruits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_snakes_are_not_obstacles() {
        let mut node = Node::new(Position::new(0, 0));
        node.add_snake(SnakeId(1));
        assert!(node.has_obstacle(SnakeId(1)));
        assert!(!node.has_obstacle(SnakeId(2)));
    }

    #[test]
    fn test_wall_blocks_everyone() {
        let mut node = Node::new(Position::new(0, 0));
        node.set_wall(true);
        assert!(node.has_obstacle(SnakeId(0)));
        assert!(node.has_obstacle(SnakeId(7)));
    }

    #[test]
    fn test_clear_objects_keeps_wall() {
        let mut node = Node::new(Position::new(3, 4));
        node.set_wall(true);
        node.add_snake(SnakeId(0));
        node.add_fruit(SnakeId(2));
        node.clear_objects();
        assert!(node.is_empty());
        assert!(node.is_wall());
    }
}
