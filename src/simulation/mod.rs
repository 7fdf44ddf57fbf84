pub mod control;
pub mod game;
pub mod placement;
pub mod scoring;

pub use control::{GameCommand, GameControl};
pub use game::{advance_snake, CallbackId, Game, GameCallback, GameEvent, GameState};
pub use scoring::{scoring_for, AlignedDirection, MoveOutcome, ScoreService};
