//! Decision oracle capability
//!
//! An oracle is the external function a brain queries each tick: typically
//! an evolved neural network. Only its declared widths and `activate` are
//! visible to the simulation.

use std::sync::Arc;

/// External decision function with fixed input and output widths
pub trait Oracle: Send + Sync {
    /// Number of inputs `activate` expects
    fn input_size(&self) -> usize;

    /// Number of outputs `activate` produces
    fn output_size(&self) -> usize;

    /// Evaluate the oracle on one input vector
    fn activate(&self, inputs: &[f64]) -> Vec<f64>;
}

/// Shared handle to an oracle; candidates and brains hold the same instance
pub type SharedOracle = Arc<dyn Oracle>;
