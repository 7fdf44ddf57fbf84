//! Brains - bind a sensor encoding to a decision oracle
//!
//! Architecture: Trait + Data hybrid
//! - `Encoding` turns (snake, board) into a fixed-width input vector
//! - `Oracle` is the external decision function being evolved
//! - `Brain` pairs the two for one snake and decodes the oracle's argmax
//!
//! Widths are checked once, when the brain is bound.

pub mod encoding;
pub mod oracle;

pub use encoding::{
    distance_to_obstacle, encoding_for, relative_fruit_position, DistanceEncoding, Encoding,
    ProximityEncoding,
};
pub use oracle::{Oracle, SharedOracle};

use std::sync::Arc;

use crate::board::Board;
use crate::core::error::{Result, SimError};
use crate::core::types::Turn;
use crate::entity::Snake;

/// One output unit per relative turn: forward, left, right
pub const OUTPUT_SIZE: usize = 3;

#[derive(Clone)]
pub struct Brain {
    encoding: Arc<dyn Encoding>,
    oracle: SharedOracle,
}

impl Brain {
    /// Pair an encoding with an oracle, failing if their widths disagree
    pub fn bind(encoding: Arc<dyn Encoding>, oracle: SharedOracle) -> Result<Self> {
        check_widths(encoding.as_ref(), oracle.as_ref())?;
        Ok(Self { encoding, oracle })
    }

    pub fn encoding(&self) -> &dyn Encoding {
        self.encoding.as_ref()
    }

    pub fn oracle(&self) -> &SharedOracle {
        &self.oracle
    }

    /// Encode the snake's surroundings, query the oracle and decode a turn
    pub fn decide(&self, snake: &Snake, board: &Board) -> Result<Turn> {
        let inputs = self.encoding.encode(snake, board)?;
        let outputs = self.oracle.activate(&inputs);
        if outputs.len() != OUTPUT_SIZE {
            return Err(SimError::OracleOutput {
                expected: OUTPUT_SIZE,
                found: outputs.len(),
            });
        }
        Ok(Turn::ALL[argmax(&outputs)])
    }
}

/// Fail fast when an oracle's declared widths do not fit the encoding
pub fn check_widths(encoding: &dyn Encoding, oracle: &dyn Oracle) -> Result<()> {
    if oracle.input_size() != encoding.input_size() || oracle.output_size() != OUTPUT_SIZE {
        return Err(SimError::OracleWidth {
            expected_inputs: encoding.input_size(),
            expected_outputs: OUTPUT_SIZE,
            found_inputs: oracle.input_size(),
            found_outputs: oracle.output_size(),
        });
    }
    Ok(())
}

/// Index of the largest value; the first one wins ties and NaN never wins
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] || values[best].is_nan() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<f64>, usize);

    impl Oracle for Fixed {
        fn input_size(&self) -> usize {
            self.1
        }
        fn output_size(&self) -> usize {
            self.0.len()
        }
        fn activate(&self, _inputs: &[f64]) -> Vec<f64> {
            self.0.clone()
        }
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax(&[0.5, 0.5, 0.1]), 0);
        assert_eq!(argmax(&[0.1, 0.7, 0.7]), 1);
        assert_eq!(argmax(&[0.1, 0.2, 0.9]), 2);
        assert_eq!(argmax(&[f64::NAN, 0.2, 0.1]), 1);
    }

    #[test]
    fn test_bind_rejects_width_mismatch() {
        let encoding = encoding_for(crate::core::config::EncodingKind::Distance);
        let too_many_inputs: SharedOracle = Arc::new(Fixed(vec![0.0; 3], 6));
        assert!(matches!(
            Brain::bind(encoding.clone(), too_many_inputs),
            Err(SimError::OracleWidth { .. })
        ));

        let two_outputs: SharedOracle = Arc::new(Fixed(vec![0.0; 2], 5));
        assert!(Brain::bind(encoding.clone(), two_outputs).is_err());

        let ok: SharedOracle = Arc::new(Fixed(vec![0.0; 3], 5));
        assert!(Brain::bind(encoding, ok).is_ok());
    }

    #[test]
    fn test_decide_decodes_turns() {
        use crate::core::types::{Direction, Position, SnakeId};
        use rand::SeedableRng;

        let board = Board::new(8, 8, rand_chacha::ChaCha8Rng::seed_from_u64(0));
        let snake = Snake::new(SnakeId(0), vec![Position::new(4, 4)], Direction::Up);
        let encoding = encoding_for(crate::core::config::EncodingKind::Proximity);

        for (outputs, expected) in [
            (vec![0.9, 0.1, 0.1], Turn::Forward),
            (vec![0.1, 0.9, 0.1], Turn::Left),
            (vec![0.1, 0.1, 0.9], Turn::Right),
        ] {
            let brain = Brain::bind(encoding.clone(), Arc::new(Fixed(outputs, 5)))
                .expect("widths match");
            assert_eq!(brain.decide(&snake, &board).ok(), Some(expected));
        }
    }
}
