//! Sensor encodings - turn a snake's view of the board into oracle inputs
//!
//! Every encoding looks in the three facing-relative directions (forward,
//! left, right) and at the snake's fruit. A missing fruit (saturated board)
//! yields a neutral zero signal instead of an error.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::board::Board;
use crate::core::config::EncodingKind;
use crate::core::error::Result;
use crate::core::types::Direction;
use crate::entity::Snake;

/// Fixed-width sensor encoding shared by every brain in a run
pub trait Encoding: Send + Sync {
    fn name(&self) -> &'static str;

    /// Length of the vector `encode` produces
    fn input_size(&self) -> usize;

    fn encode(&self, snake: &Snake, board: &Board) -> Result<Vec<f64>>;
}

/// Build the reference encoding for a configured kind
pub fn encoding_for(kind: EncodingKind) -> Arc<dyn Encoding> {
    match kind {
        EncodingKind::Distance => Arc::new(DistanceEncoding),
        EncodingKind::Proximity => Arc::new(ProximityEncoding),
    }
}

/// Forward, left and right of the current heading
fn facing_directions(heading: Direction) -> [Direction; 3] {
    [heading, heading.left_of(), heading.right_of()]
}

/// Steps from the head to the first cell that is off the board or an
/// obstacle for this snake (wall or own body), walking along `direction`.
///
/// Always at least 1.
pub fn distance_to_obstacle(snake: &Snake, board: &Board, direction: Direction) -> Result<u32> {
    let head = snake.get_head()?;
    let step = direction.vector();
    let mut distance = 0;
    loop {
        distance += 1;
        let probe = head.offset(step.scale(distance));
        if board.is_obstacle(probe, snake.id) {
            return Ok(head.manhattan(&probe));
        }
    }
}

/// Head-to-fruit vector in the snake's own frame: forward along +x, with
/// positive y to the snake's left. `None` when no fruit is targeted.
pub fn relative_fruit_position(snake: &Snake) -> Result<Option<(f64, f64)>> {
    let Some(fruit) = snake.fruit else {
        return Ok(None);
    };
    let head = snake.get_head()?;
    let delta = head.diff(&fruit);
    let (dx, dy) = (delta.row as f64, delta.col as f64);
    let alpha = snake.direction.vector().angle();

    // Headings are quarter turns, so the rotated coordinates are integral
    let x = dx * alpha.cos() + dy * alpha.sin();
    let y = -dx * alpha.sin() + dy * alpha.cos();
    Ok(Some((x.round(), y.round())))
}

/// Raw step distances, fruit distance and fruit bearing
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceEncoding;

impl DistanceEncoding {
    /// Bearing of the fruit in [-1, 1]; positive means to the left
    pub fn fruit_angle(snake: &Snake) -> Result<f64> {
        Ok(relative_fruit_position(snake)?
            .map(|(x, y)| y.atan2(x) / PI)
            .unwrap_or(0.0))
    }

    pub fn fruit_distance(snake: &Snake) -> Result<f64> {
        let head = snake.get_head()?;
        Ok(snake
            .fruit
            .map(|fruit| head.manhattan(&fruit) as f64)
            .unwrap_or(0.0))
    }
}

impl Encoding for DistanceEncoding {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn input_size(&self) -> usize {
        5
    }

    fn encode(&self, snake: &Snake, board: &Board) -> Result<Vec<f64>> {
        let mut inputs = Vec::with_capacity(self.input_size());
        for direction in facing_directions(snake.direction) {
            inputs.push(distance_to_obstacle(snake, board, direction)? as f64);
        }
        inputs.push(Self::fruit_distance(snake)?);
        inputs.push(Self::fruit_angle(snake)?);
        Ok(inputs)
    }
}

/// Bounded signals: obstacle proximity and folded fruit proximity
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityEncoding;

impl ProximityEncoding {
    /// 1 when adjacent, decaying with the square of the distance
    pub fn obstacle_proximity(distance: u32) -> f64 {
        1.0 / (distance.max(1) as f64).powi(2)
    }

    /// Map a normalized offset in [-1, 1] to a signed closeness: near +-1
    /// when the fruit is close on that side, 0 when far or centered.
    pub fn fold(offset: f64) -> f64 {
        let offset = offset.clamp(-1.0, 1.0);
        if offset == 0.0 {
            0.0
        } else {
            offset.signum() * (1.0 - offset.abs())
        }
    }
}

impl Encoding for ProximityEncoding {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn input_size(&self) -> usize {
        5
    }

    fn encode(&self, snake: &Snake, board: &Board) -> Result<Vec<f64>> {
        let mut inputs = Vec::with_capacity(self.input_size());
        for direction in facing_directions(snake.direction) {
            let distance = distance_to_obstacle(snake, board, direction)?;
            inputs.push(Self::obstacle_proximity(distance));
        }

        let scale = board.rows().max(board.columns()).max(1) as f64;
        let (x, y) = relative_fruit_position(snake)?.unwrap_or((0.0, 0.0));
        inputs.push(Self::fold(x / scale));
        inputs.push(Self::fold(y / scale));
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Position, SnakeId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(direction: Direction) -> (Board, Snake) {
        let board = Board::new(10, 10, ChaCha8Rng::seed_from_u64(3));
        let snake = Snake::new(
            SnakeId(0),
            vec![Position::new(5, 3), Position::new(5, 4), Position::new(5, 5)],
            direction,
        );
        (board, snake)
    }

    #[test]
    fn test_distance_to_edges() {
        let (mut board, snake) = setup(Direction::Right);
        board.add_snake(&snake);
        // Head at (5, 5) on a 10x10 board
        assert_eq!(distance_to_obstacle(&snake, &board, Direction::Right).ok(), Some(5));
        assert_eq!(distance_to_obstacle(&snake, &board, Direction::Up).ok(), Some(6));
        assert_eq!(distance_to_obstacle(&snake, &board, Direction::Down).ok(), Some(5));
        // Own body directly behind
        assert_eq!(distance_to_obstacle(&snake, &board, Direction::Left).ok(), Some(1));
    }

    #[test]
    fn test_other_snakes_do_not_stop_the_probe() {
        let (mut board, snake) = setup(Direction::Right);
        board.add_snake(&snake);
        board.add_snake_position(SnakeId(9), Position::new(5, 7));
        assert_eq!(distance_to_obstacle(&snake, &board, Direction::Right).ok(), Some(5));

        board.add_wall(Position::new(5, 7));
        assert_eq!(distance_to_obstacle(&snake, &board, Direction::Right).ok(), Some(2));
    }

    #[test]
    fn test_relative_fruit_position_rotates_with_heading() {
        let (_, mut snake) = setup(Direction::Right);
        snake.fruit = Some(Position::new(5, 8));
        assert_eq!(relative_fruit_position(&snake).ok().flatten(), Some((3.0, 0.0)));

        // Fruit above the head is to the left of a right-facing snake
        snake.fruit = Some(Position::new(2, 5));
        assert_eq!(relative_fruit_position(&snake).ok().flatten(), Some((0.0, 3.0)));

        snake.direction = Direction::Up;
        assert_eq!(relative_fruit_position(&snake).ok().flatten(), Some((3.0, 0.0)));
    }

    #[test]
    fn test_fruit_angle_sign() {
        let (_, mut snake) = setup(Direction::Right);
        snake.fruit = Some(Position::new(2, 5));
        let angle = DistanceEncoding::fruit_angle(&snake).unwrap_or_default();
        assert!((angle - 0.5).abs() < 1e-9);

        snake.fruit = Some(Position::new(8, 5));
        let angle = DistanceEncoding::fruit_angle(&snake).unwrap_or_default();
        assert!((angle + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fruit_is_neutral() {
        let (mut board, snake) = setup(Direction::Down);
        board.add_snake(&snake);
        let distance = DistanceEncoding.encode(&snake, &board).unwrap_or_default();
        assert_eq!(&distance[3..], &[0.0, 0.0]);

        let proximity = ProximityEncoding.encode(&snake, &board).unwrap_or_default();
        assert_eq!(&proximity[3..], &[0.0, 0.0]);
    }

    #[test]
    fn test_proximity_is_bounded() {
        let (mut board, mut snake) = setup(Direction::Right);
        snake.fruit = Some(Position::new(5, 6));
        board.add_snake(&snake);
        let inputs = ProximityEncoding.encode(&snake, &board).unwrap_or_default();
        assert_eq!(inputs.len(), 5);
        assert!(inputs.iter().all(|v| (-1.0..=1.0).contains(v)));
        // Adjacent fruit straight ahead reads close to +1 forward, 0 sideways
        assert!((inputs[3] - 0.9).abs() < 1e-9);
        assert_eq!(inputs[4], 0.0);
    }

    #[test]
    fn test_obstacle_proximity_saturates() {
        assert_eq!(ProximityEncoding::obstacle_proximity(1), 1.0);
        assert_eq!(ProximityEncoding::obstacle_proximity(2), 0.25);
        assert!(ProximityEncoding::obstacle_proximity(40) < 0.001);
    }
}
