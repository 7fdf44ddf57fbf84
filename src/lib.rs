//! Snake Evolver - deterministic multi-snake grid simulation used as the
//! fitness harness for evolving snake controllers
//!
//! - `board`: grid of nodes with walls, occupancy and fruit
//! - `entity`: snakes and their movement rules
//! - `brain`: sensor encodings and the decision oracles they feed
//! - `simulation`: the tick loop, scoring and run control
//! - `evolution`: the generation loop around an optimizer

pub mod board;
pub mod brain;
pub mod core;
pub mod entity;
pub mod evolution;
pub mod simulation;
