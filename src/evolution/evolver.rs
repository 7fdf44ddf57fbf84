//! Evolver - generation loop around a game and an optimizer
//!
//! One generation: bind every candidate's oracle to the snake with the same
//! index, play the game until every snake is dead, write each snake's final
//! score back as its candidate's fitness, breed, reset.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::brain::{SharedOracle, OUTPUT_SIZE};
use crate::core::config::EvolverParams;
use crate::core::error::{Result, SimError};
use crate::evolution::optimizer::{Candidate, Optimizer};
use crate::evolution::stats::GenerationStats;
use crate::simulation::{CallbackId, Game};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolverState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolverEvent {
    /// Before a generation is evaluated
    PreGen,
    /// After a generation is evaluated, before the optimizer breeds
    PostGen,
}

pub type EvolverCallback = Box<dyn FnMut(&Evolver) + Send>;

/// Cloneable handle that asks a running evolver to stop after the current
/// generation.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

/// Play one generation: bind `candidates` to the game's snakes by index,
/// run the game to completion and record each snake's score as fitness.
///
/// The game should be freshly reset; an ended game is not replayed.
pub async fn evaluate_population(game: &mut Game, candidates: &mut [Candidate]) -> Result<()> {
    let oracles: Vec<SharedOracle> = candidates.iter().map(|c| c.oracle.clone()).collect();
    game.set_brains(&oracles)?;
    game.run().await?;

    for (candidate, snake) in candidates.iter_mut().zip(game.snakes()) {
        candidate.fitness = Some(snake.score);
    }
    Ok(())
}

pub struct Evolver {
    game: Game,
    params: EvolverParams,
    optimizer: Box<dyn Optimizer>,
    generation: u64,
    state: EvolverState,
    history: Vec<GenerationStats>,
    high_score: u32,
    stop: StopHandle,
    pre_gen: Vec<(CallbackId, EvolverCallback)>,
    post_gen: Vec<(CallbackId, EvolverCallback)>,
    next_callback: u64,
}

impl Evolver {
    /// Wrap a game, checking that the optimizer's population and widths fit
    /// it before anything runs.
    pub fn new(game: Game, params: EvolverParams, optimizer: Box<dyn Optimizer>) -> Result<Self> {
        let population = game.config().population;
        if population < 2 {
            return Err(SimError::PopulationTooSmall(population));
        }
        if optimizer.population_size() != population {
            return Err(SimError::InvalidConfig(format!(
                "optimizer population {} does not match game population {}",
                optimizer.population_size(),
                population
            )));
        }

        let encoding = game.encoding().ok_or(SimError::EncodingUnset)?;
        if optimizer.input_size() != encoding.input_size() || optimizer.output_size() != OUTPUT_SIZE
        {
            return Err(SimError::OracleWidth {
                expected_inputs: encoding.input_size(),
                expected_outputs: OUTPUT_SIZE,
                found_inputs: optimizer.input_size(),
                found_outputs: optimizer.output_size(),
            });
        }

        Ok(Self {
            game,
            params,
            optimizer,
            generation: 0,
            state: EvolverState::Stopped,
            history: Vec::new(),
            high_score: 0,
            stop: StopHandle::default(),
            pre_gen: Vec::new(),
            post_gen: Vec::new(),
            next_callback: 0,
        })
    }

    // === READ-ONLY STATE ===

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> EvolverState {
        self.state
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// For wiring game observers and controls before `run`
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn params(&self) -> &EvolverParams {
        &self.params
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.optimizer.candidates()
    }

    /// Statistics of every finished generation, oldest first
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn last_stats(&self) -> Option<&GenerationStats> {
        self.history.last()
    }

    /// Most fruits any snake has eaten in a single generation so far
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    // === OBSERVERS ===

    pub fn add_callback(&mut self, event: EvolverEvent, callback: EvolverCallback) -> CallbackId {
        let id = CallbackId::new(self.next_callback);
        self.next_callback += 1;
        self.callbacks_mut(event).push((id, callback));
        id
    }

    /// Returns false if no callback had this id
    pub fn remove_callback(&mut self, id: CallbackId) -> bool {
        let before = self.pre_gen.len() + self.post_gen.len();
        self.pre_gen.retain(|(cid, _)| *cid != id);
        self.post_gen.retain(|(cid, _)| *cid != id);
        before != self.pre_gen.len() + self.post_gen.len()
    }

    fn callbacks_mut(&mut self, event: EvolverEvent) -> &mut Vec<(CallbackId, EvolverCallback)> {
        match event {
            EvolverEvent::PreGen => &mut self.pre_gen,
            EvolverEvent::PostGen => &mut self.post_gen,
        }
    }

    fn notify(&mut self, event: EvolverEvent) {
        let mut callbacks = std::mem::take(self.callbacks_mut(event));
        for (_, callback) in callbacks.iter_mut() {
            callback(&*self);
        }
        *self.callbacks_mut(event) = callbacks;
    }

    // === GENERATION LOOP ===

    /// Evaluate the optimizer's current population on the wrapped game
    pub async fn evaluate_population(&mut self) -> Result<()> {
        evaluate_population(&mut self.game, self.optimizer.candidates_mut()).await
    }

    /// Ask the loop to stop after the current generation
    pub fn stop(&mut self) {
        self.state = EvolverState::Stopped;
    }

    /// Run generations until stopped, `max_generations` is reached or an
    /// error occurs. The state is `Stopped` again when this returns.
    pub async fn run(&mut self) -> Result<()> {
        self.state = EvolverState::Running;
        tracing::info!(
            "Evolver starting: population {}, generation {}",
            self.game.config().population,
            self.generation
        );

        let result = self.run_generations().await;
        self.state = EvolverState::Stopped;

        if let Err(ref e) = result {
            tracing::error!("Evolver halted at generation {}: {}", self.generation, e);
        }
        result
    }

    async fn run_generations(&mut self) -> Result<()> {
        while self.state == EvolverState::Running {
            if self.stop.take() {
                break;
            }
            if let Some(max) = self.params.max_generations {
                if self.generation >= max {
                    break;
                }
            }
            self.run_generation().await?;
        }
        Ok(())
    }

    async fn run_generation(&mut self) -> Result<()> {
        self.generation += 1;
        self.notify(EvolverEvent::PreGen);

        self.evaluate_population().await?;

        let stats = GenerationStats::from_game(self.generation, &self.game);
        self.high_score = self.high_score.max(stats.best_fruits);
        tracing::info!(
            "Generation {}: max {:.1}, mean {:.2}, best fruits {}, {} ticks",
            stats.generation,
            stats.max_score,
            stats.mean_score,
            stats.best_fruits,
            stats.ticks
        );
        self.history.push(stats);

        self.notify(EvolverEvent::PostGen);

        self.optimizer.evolve()?;
        self.game.reset();
        Ok(())
    }
}
