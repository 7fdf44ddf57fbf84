//! Optimizer capability and a small reference implementation
//!
//! The generation loop only needs a population of oracles with fitness
//! slots and a way to breed the next population from scored candidates.
//! `ElitistOptimizer` is a deliberately plain stand-in for a real
//! neuroevolution library.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use crate::brain::{Oracle, SharedOracle};
use crate::core::config::EvolverParams;
use crate::core::error::{Result, SimError};

/// One member of the population and its last measured fitness
#[derive(Clone)]
pub struct Candidate {
    pub oracle: SharedOracle,
    /// `None` until the candidate has been evaluated
    pub fitness: Option<f64>,
}

impl Candidate {
    pub fn new(oracle: SharedOracle) -> Self {
        Self {
            oracle,
            fitness: None,
        }
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("inputs", &self.oracle.input_size())
            .field("outputs", &self.oracle.output_size())
            .field("fitness", &self.fitness)
            .finish()
    }
}

/// Evolutionary optimizer driven by the generation loop
pub trait Optimizer: Send {
    fn population_size(&self) -> usize;

    fn input_size(&self) -> usize;

    fn output_size(&self) -> usize;

    fn candidates(&self) -> &[Candidate];

    /// Fitness slots are written here after each evaluation
    fn candidates_mut(&mut self) -> &mut [Candidate];

    /// Replace the population with the next generation, bred from the
    /// fitness values currently stored on the candidates.
    fn evolve(&mut self) -> Result<()>;
}

// === PERCEPTRON ===

/// Fully connected single-layer network with logistic outputs
#[derive(Debug, Clone, PartialEq)]
pub struct Perceptron {
    inputs: usize,
    outputs: usize,
    /// Row-major, one row of `inputs` weights per output
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Perceptron {
    pub fn zeroed(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            weights: vec![0.0; inputs * outputs],
            biases: vec![0.0; outputs],
        }
    }

    /// Weights and biases drawn uniformly from [-1, 1]
    pub fn random(inputs: usize, outputs: usize, rng: &mut dyn RngCore) -> Self {
        let mut perceptron = Self::zeroed(inputs, outputs);
        for weight in perceptron.weights.iter_mut().chain(perceptron.biases.iter_mut()) {
            *weight = rng.gen_range(-1.0..=1.0);
        }
        perceptron
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Nudge `count` randomly chosen parameters by gaussian noise
    pub fn mutate(&mut self, count: usize, rng: &mut dyn RngCore) {
        let total = self.weights.len() + self.biases.len();
        if total == 0 {
            return;
        }
        for _ in 0..count {
            let index = rng.gen_range(0..total);
            let noise = gaussian(rng);
            if index < self.weights.len() {
                self.weights[index] += noise;
            } else {
                self.biases[index - self.weights.len()] += noise;
            }
        }
    }
}

fn logistic(value: f64) -> f64 {
    1.0 / (1.0 + (-value).exp())
}

/// Standard normal sample (Box-Muller)
fn gaussian(rng: &mut dyn RngCore) -> f64 {
    let u1 = rng.gen::<f64>().clamp(f64::MIN_POSITIVE, 1.0);
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

impl Oracle for Perceptron {
    fn input_size(&self) -> usize {
        self.inputs
    }

    fn output_size(&self) -> usize {
        self.outputs
    }

    fn activate(&self, inputs: &[f64]) -> Vec<f64> {
        self.weights
            .chunks(self.inputs.max(1))
            .take(self.outputs)
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum: f64 = row.iter().zip(inputs).map(|(w, x)| w * x).sum();
                logistic(sum + bias)
            })
            .collect()
    }
}

// === ELITIST OPTIMIZER ===

/// Keeps the fittest candidates unchanged and refills the population with
/// copies of them, some of which are mutated.
pub struct ElitistOptimizer {
    genomes: Vec<Arc<Perceptron>>,
    candidates: Vec<Candidate>,
    inputs: usize,
    outputs: usize,
    elitism: usize,
    mutation_rate: f64,
    mutation_amount: usize,
    rng: ChaCha8Rng,
}

impl ElitistOptimizer {
    pub fn new(
        population: usize,
        inputs: usize,
        outputs: usize,
        params: &EvolverParams,
        seed: Option<u64>,
    ) -> Result<Self> {
        if population < 2 {
            return Err(SimError::PopulationTooSmall(population));
        }
        if !(0.0..=1.0).contains(&params.mutation_rate) {
            return Err(SimError::InvalidConfig(format!(
                "mutation_rate ({}) must be within [0, 1]",
                params.mutation_rate
            )));
        }

        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let genomes: Vec<Arc<Perceptron>> = (0..population)
            .map(|_| Arc::new(Perceptron::random(inputs, outputs, &mut rng)))
            .collect();

        let mut optimizer = Self {
            genomes,
            candidates: Vec::new(),
            inputs,
            outputs,
            elitism: params.elitism_for(population),
            mutation_rate: params.mutation_rate,
            mutation_amount: params.mutation_amount,
            rng,
        };
        optimizer.refresh_candidates();
        Ok(optimizer)
    }

    pub fn elitism(&self) -> usize {
        self.elitism
    }

    pub fn genomes(&self) -> &[Arc<Perceptron>] {
        &self.genomes
    }

    fn refresh_candidates(&mut self) {
        self.candidates = self
            .genomes
            .iter()
            .map(|genome| Candidate::new(genome.clone() as SharedOracle))
            .collect();
    }

    /// Candidate indices, fittest first. Unevaluated candidates sort last.
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.candidates.len()).collect();
        let fitness = |i: usize| self.candidates[i].fitness.unwrap_or(f64::NEG_INFINITY);
        order.sort_by(|&a, &b| fitness(b).total_cmp(&fitness(a)));
        order
    }
}

impl Optimizer for ElitistOptimizer {
    fn population_size(&self) -> usize {
        self.genomes.len()
    }

    fn input_size(&self) -> usize {
        self.inputs
    }

    fn output_size(&self) -> usize {
        self.outputs
    }

    fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    fn candidates_mut(&mut self) -> &mut [Candidate] {
        &mut self.candidates
    }

    fn evolve(&mut self) -> Result<()> {
        let population = self.genomes.len();
        let ranking = self.ranking();
        // Always breed from at least the single best
        let parents = self.elitism.max(1);

        let mut next = Vec::with_capacity(population);
        for &index in ranking.iter().take(self.elitism) {
            next.push(self.genomes[index].clone());
        }
        while next.len() < population {
            let parent = ranking[self.rng.gen_range(0..parents)];
            let mut child = (*self.genomes[parent]).clone();
            if self.rng.gen_bool(self.mutation_rate) {
                child.mutate(self.mutation_amount, &mut self.rng);
            }
            next.push(Arc::new(child));
        }

        self.genomes = next;
        self.refresh_candidates();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(elitism: usize) -> EvolverParams {
        EvolverParams {
            elitism: Some(elitism),
            mutation_rate: 1.0,
            mutation_amount: 2,
            max_generations: None,
        }
    }

    #[test]
    fn test_perceptron_widths_and_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let perceptron = Perceptron::random(5, 3, &mut rng);
        let outputs = perceptron.activate(&[1.0, -2.0, 0.5, 0.0, 3.0]);
        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(|&o| o > 0.0 && o < 1.0));
    }

    #[test]
    fn test_zeroed_perceptron_outputs_half() {
        let perceptron = Perceptron::zeroed(5, 3);
        assert_eq!(perceptron.activate(&[9.0; 5]), vec![0.5; 3]);
    }

    #[test]
    fn test_mutate_changes_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let original = Perceptron::random(5, 3, &mut rng);
        let mut mutated = original.clone();
        mutated.mutate(4, &mut rng);
        assert_ne!(original, mutated);
    }

    #[test]
    fn test_population_too_small() {
        let result = ElitistOptimizer::new(1, 5, 3, &EvolverParams::default(), Some(1));
        assert!(matches!(result, Err(SimError::PopulationTooSmall(1))));
    }

    #[test]
    fn test_evolve_keeps_elites_first() {
        let mut optimizer = ElitistOptimizer::new(5, 5, 3, &params(2), Some(9)).expect("valid");
        for (i, candidate) in optimizer.candidates_mut().iter_mut().enumerate() {
            candidate.fitness = Some(i as f64);
        }
        let best = optimizer.genomes()[4].clone();
        let second = optimizer.genomes()[3].clone();

        optimizer.evolve().expect("evolve");

        assert_eq!(optimizer.population_size(), 5);
        assert!(Arc::ptr_eq(&optimizer.genomes()[0], &best));
        assert!(Arc::ptr_eq(&optimizer.genomes()[1], &second));
        assert!(optimizer.candidates().iter().all(|c| c.fitness.is_none()));
        // Offspring are mutated copies, never the elite instances themselves
        for genome in &optimizer.genomes()[2..] {
            assert!(!Arc::ptr_eq(genome, &best) && !Arc::ptr_eq(genome, &second));
        }
    }

    #[test]
    fn test_zero_elitism_still_breeds_from_best() {
        let params = EvolverParams {
            mutation_rate: 0.0,
            ..params(0)
        };
        let mut optimizer = ElitistOptimizer::new(3, 5, 3, &params, Some(2)).expect("valid");
        optimizer.candidates_mut()[1].fitness = Some(10.0);
        let best = (*optimizer.genomes()[1]).clone();

        optimizer.evolve().expect("evolve");

        assert!(optimizer.genomes().iter().all(|g| **g == best));
    }
}
