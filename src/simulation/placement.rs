//! Closed-form spawn placement along the inner perimeter
//!
//! Snakes are spread evenly around a ring inset `spawn_margin` cells from
//! the board edge, travelling clockwise. Placement depends only on the
//! snake index and population size, so every reset reproduces it exactly.

use crate::core::config::GameConfig;
use crate::core::types::{Direction, Position};

/// Cell and heading at `distance` steps clockwise around the ring,
/// starting from its top-left corner.
fn ring_cell(distance: usize, width: usize, height: usize, margin: usize) -> (Position, Direction) {
    let perimeter = 2 * width + 2 * height - 4;
    let d = distance % perimeter;

    let top_end = width - 1;
    let right_end = width + height - 2;
    let bottom_end = 2 * width + height - 3;

    let (row, col, direction) = if d < top_end {
        (0, d, Direction::Right)
    } else if d < right_end {
        (d - top_end, width - 1, Direction::Down)
    } else if d < bottom_end {
        (height - 1, perimeter + 1 - height - d, Direction::Left)
    } else {
        (perimeter - d, 0, Direction::Up)
    };

    (
        Position::new((row + margin) as i32, (col + margin) as i32),
        direction,
    )
}

/// Body (tail to head) and heading of snake `index` out of `population`.
///
/// Assumes a validated config.
pub fn spawn(index: usize, config: &GameConfig) -> (Vec<Position>, Direction) {
    let (width, height) = config.spawn_ring();
    let perimeter = config.spawn_perimeter();
    let start = index * perimeter / config.population.max(1);

    let mut direction = Direction::Right;
    let mut positions = Vec::with_capacity(config.initial_length);
    for step in 0..config.initial_length {
        let (cell, heading) = ring_cell(start + step, width, height, config.spawn_margin);
        positions.push(cell);
        direction = heading;
    }
    (positions, direction)
}

/// True for cells on the rows and columns of the spawn ring, which never
/// receive random walls.
pub fn is_reserved(pos: Position, config: &GameConfig) -> bool {
    let margin = config.spawn_margin as i32;
    let last_row = config.rows as i32 - 1 - margin;
    let last_col = config.columns as i32 - 1 - margin;
    pos.row == margin || pos.row == last_row || pos.col == margin || pos.col == last_col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rows: usize, columns: usize, population: usize, length: usize) -> GameConfig {
        GameConfig {
            rows,
            columns,
            population,
            initial_length: length,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_first_snake_starts_top_left_heading_right() {
        let (body, direction) = spawn(0, &config(10, 10, 1, 3));
        assert_eq!(
            body,
            vec![Position::new(2, 2), Position::new(2, 3), Position::new(2, 4)]
        );
        assert_eq!(direction, Direction::Right);
    }

    #[test]
    fn test_bodies_are_contiguous_around_corners() {
        let cfg = config(10, 12, 5, 6);
        for index in 0..cfg.population {
            let (body, _) = spawn(index, &cfg);
            assert_eq!(body.len(), 6);
            for pair in body.windows(2) {
                assert_eq!(pair[0].manhattan(&pair[1]), 1, "snake {} body {:?}", index, body);
            }
        }
    }

    #[test]
    fn test_ring_covers_every_side() {
        // 6x6 ring inside a 10x10 board
        let (w, h, m) = (6, 6, 2);
        assert_eq!(ring_cell(0, w, h, m), (Position::new(2, 2), Direction::Right));
        assert_eq!(ring_cell(5, w, h, m), (Position::new(2, 7), Direction::Down));
        assert_eq!(ring_cell(10, w, h, m), (Position::new(7, 7), Direction::Left));
        assert_eq!(ring_cell(15, w, h, m), (Position::new(7, 2), Direction::Up));
        assert_eq!(ring_cell(19, w, h, m), (Position::new(3, 2), Direction::Up));
        assert_eq!(ring_cell(20, w, h, m), (Position::new(2, 2), Direction::Right));
    }

    #[test]
    fn test_heads_face_along_the_ring() {
        let cfg = config(10, 10, 4, 2);
        for index in 0..cfg.population {
            let (body, direction) = spawn(index, &cfg);
            let head = body[body.len() - 1];
            let behind = body[body.len() - 2];
            assert_ne!(behind, head.offset(direction.vector()));
        }
    }

    #[test]
    fn test_spawn_cells_are_reserved() {
        let cfg = config(12, 16, 7, 4);
        for index in 0..cfg.population {
            let (body, _) = spawn(index, &cfg);
            assert!(body.iter().all(|&p| is_reserved(p, &cfg)));
        }
        assert!(!is_reserved(Position::new(5, 5), &cfg));
    }
}
