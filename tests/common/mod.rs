//! Scripted oracles shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use snake_evolver::brain::{Oracle, SharedOracle, OUTPUT_SIZE};
use snake_evolver::core::types::Turn;

/// Oracle that ignores its inputs and always picks the same turn
pub struct Always {
    turn: Turn,
    inputs: usize,
}

impl Oracle for Always {
    fn input_size(&self) -> usize {
        self.inputs
    }

    fn output_size(&self) -> usize {
        OUTPUT_SIZE
    }

    fn activate(&self, _inputs: &[f64]) -> Vec<f64> {
        Turn::ALL
            .iter()
            .map(|&turn| if turn == self.turn { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Always-`turn` oracle sized for the five-input encodings
pub fn always(turn: Turn) -> SharedOracle {
    Arc::new(Always { turn, inputs: 5 })
}

pub fn always_sized(turn: Turn, inputs: usize) -> SharedOracle {
    Arc::new(Always { turn, inputs })
}
