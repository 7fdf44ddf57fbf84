pub mod config;
pub mod error;
pub mod types;

pub use config::{EncodingKind, EvolverParams, GameConfig, ScoringConfig, ScoringKind, Settings};
pub use error::{Result, SimError};
pub use types::{Direction, Position, SnakeId, Tick, Turn, Vector};
