//! Evolution - the generation loop and the optimizer it drives
//!
//! The optimizer owns the population; the evolver owns the game. Fitness
//! flows from finished games back into the optimizer's candidates.

pub mod evolver;
pub mod optimizer;
pub mod stats;

pub use evolver::{
    evaluate_population, Evolver, EvolverCallback, EvolverEvent, EvolverState, StopHandle,
};
pub use optimizer::{Candidate, ElitistOptimizer, Optimizer, Perceptron};
pub use stats::GenerationStats;
