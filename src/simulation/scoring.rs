//! Per-tick reward strategies

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::core::config::{ScoringConfig, ScoringKind};
use crate::core::types::{Position, SnakeId, Turn};
use crate::entity::Snake;

/// What happened to one snake during one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub snake: SnakeId,
    pub from: Position,
    pub to: Position,
    pub turn: Turn,
    pub ate_fruit: bool,
    pub died: bool,
}

/// Reward strategy: a pure function of the post-move state
pub trait ScoreService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score delta for `snake` after `outcome` has been applied to `board`
    fn move_score(&self, board: &Board, snake: &Snake, outcome: &MoveOutcome) -> f64;
}

/// Build the reward strategy described by a config
pub fn scoring_for(config: &ScoringConfig) -> Box<dyn ScoreService> {
    match config.kind {
        ScoringKind::AlignedDirection => Box::new(AlignedDirection {
            fruit: config.fruit,
            toward: config.toward,
            against: config.against,
        }),
    }
}

/// Fruit bonus, otherwise a small reward when the step points towards the
/// fruit on both axes and a small penalty when it does not.
///
/// Dense shaping like this separates snakes that made partial progress in
/// early generations, when almost nobody eats anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedDirection {
    pub fruit: f64,
    pub toward: f64,
    pub against: f64,
}

impl Default for AlignedDirection {
    fn default() -> Self {
        let config = ScoringConfig::default();
        Self {
            fruit: config.fruit,
            toward: config.toward,
            against: config.against,
        }
    }
}

impl ScoreService for AlignedDirection {
    fn name(&self) -> &'static str {
        "aligned_direction"
    }

    fn move_score(&self, _board: &Board, snake: &Snake, outcome: &MoveOutcome) -> f64 {
        if outcome.died {
            return 0.0;
        }
        if outcome.ate_fruit {
            return self.fruit;
        }
        let Some(fruit) = snake.fruit else {
            return 0.0;
        };

        let to_fruit = outcome.to.diff(&fruit);
        let movement = snake.direction.vector();
        let aligned = to_fruit.row * movement.row >= 0 && to_fruit.col * movement.col >= 0;
        if aligned {
            self.toward
        } else {
            self.against
        }
    }
}
