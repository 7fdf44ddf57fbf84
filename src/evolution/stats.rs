//! Per-generation summary statistics

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;
use crate::simulation::Game;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub max_score: f64,
    pub mean_score: f64,
    /// Most fruits eaten by any single snake
    pub best_fruits: u32,
    /// Ticks the generation took to end
    pub ticks: Tick,
}

impl GenerationStats {
    /// Summarise a game that has just been played to completion
    pub fn from_game(generation: u64, game: &Game) -> Self {
        let snakes = game.snakes();
        let count = snakes.len().max(1) as f64;

        let max_score = snakes
            .iter()
            .map(|s| s.score)
            .fold(f64::NEG_INFINITY, f64::max);
        let mean_score = snakes.iter().map(|s| s.score).sum::<f64>() / count;
        let best_fruits = snakes.iter().map(|s| s.fruits).max().unwrap_or(0);

        Self {
            generation,
            max_score: if snakes.is_empty() { 0.0 } else { max_score },
            mean_score,
            best_fruits,
            ticks: game.iteration(),
        }
    }
}
