use thiserror::Error;

use crate::core::types::{Position, SnakeId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error(
        "Oracle width mismatch: encoding expects {expected_inputs} inputs / {expected_outputs} outputs, \
         oracle declares {found_inputs} / {found_outputs}"
    )]
    OracleWidth {
        expected_inputs: usize,
        expected_outputs: usize,
        found_inputs: usize,
        found_outputs: usize,
    },

    #[error("Oracle returned {found} outputs, expected {expected}")]
    OracleOutput { expected: usize, found: usize },

    #[error("Population size must be at least 2, got {0}")]
    PopulationTooSmall(usize),

    #[error("No brain encoding configured")]
    EncodingUnset,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Snake {0} has no brain bound")]
    NoBrain(SnakeId),

    #[error("Snake {0} has no positions")]
    EmptySnake(SnakeId),

    #[error("Cannot extend snake from {from} to {to}: not one step away")]
    NonAdjacentExtend { from: Position, to: Position },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
