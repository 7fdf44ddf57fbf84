//! Game - tick orchestrator and lifecycle state machine
//!
//! Each tick moves every alive snake once, in creation order. Moves are
//! applied one snake at a time against the shared board, so later snakes
//! observe the cells earlier snakes already moved through this tick.
//!
//! Lifecycle: `Stopped` <-> `Running` -> `Ended` (all snakes dead), and
//! `reset()` brings an ended game back to `Stopped` with fresh snakes and
//! fresh random walls.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::board::Board;
use crate::brain::{encoding_for, Brain, Encoding, SharedOracle};
use crate::core::config::GameConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{SnakeId, Tick};
use crate::entity::Snake;
use crate::simulation::control::{GameCommand, GameControl};
use crate::simulation::placement;
use crate::simulation::scoring::{scoring_for, MoveOutcome, ScoreService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Stopped,
    Running,
    Ended,
}

/// Points in a tick at which observers are notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// After every tick
    Move,
    /// Once, when the last snake dies
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

impl CallbackId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Read-only observer of game state
pub type GameCallback = Box<dyn FnMut(&Game) + Send>;

pub struct Game {
    config: GameConfig,
    board: Board,
    snakes: Vec<Snake>,
    /// Indices into `snakes` of the living, in creation order
    alive: Vec<usize>,
    visible: usize,
    state: GameState,
    iteration: Tick,
    /// `None` runs flat out
    tick_rate: Option<f64>,
    scoring: Box<dyn ScoreService>,
    encoding: Option<Arc<dyn Encoding>>,
    on_move: Vec<(CallbackId, GameCallback)>,
    on_end: Vec<(CallbackId, GameCallback)>,
    next_callback: u64,
    command_tx: UnboundedSender<GameCommand>,
    command_rx: UnboundedReceiver<GameCommand>,
}

impl Game {
    /// Build a game using the reward strategy and encoding named in `config`
    pub fn new(config: GameConfig) -> Result<Self> {
        let scoring = scoring_for(&config.scoring);
        let encoding = config.encoding.map(encoding_for);
        Self::with_strategies(config, scoring, encoding)
    }

    /// Build a game with caller-supplied strategies
    pub fn with_strategies(
        config: GameConfig,
        scoring: Box<dyn ScoreService>,
        encoding: Option<Arc<dyn Encoding>>,
    ) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let mut game = Self {
            board: Board::new(config.rows, config.columns, rng),
            snakes: Vec::new(),
            alive: Vec::new(),
            visible: config.visible,
            state: GameState::Stopped,
            iteration: 0,
            tick_rate: config.tick_rate,
            scoring,
            encoding,
            on_move: Vec::new(),
            on_end: Vec::new(),
            next_callback: 0,
            command_tx,
            command_rx,
            config,
        };
        game.add_random_walls();
        game.populate();

        tracing::debug!(
            "Game created: {}x{} board, {} snakes, {} walls",
            game.config.rows,
            game.config.columns,
            game.snakes.len(),
            game.board.walls().len()
        );
        Ok(game)
    }

    // === READ-ONLY STATE ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn alive_snakes(&self) -> impl Iterator<Item = &Snake> + '_ {
        self.alive.iter().map(move |&i| &self.snakes[i])
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// The first `visible` snakes by creation order that are still alive
    pub fn visible_snakes(&self) -> impl Iterator<Item = &Snake> + '_ {
        self.snakes
            .iter()
            .take(self.visible)
            .filter(|snake| snake.alive)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn iteration(&self) -> Tick {
        self.iteration
    }

    pub fn tick_rate(&self) -> Option<f64> {
        self.tick_rate
    }

    pub fn encoding(&self) -> Option<&Arc<dyn Encoding>> {
        self.encoding.as_ref()
    }

    /// Handle for steering the game while `run` holds it
    pub fn control(&self) -> GameControl {
        GameControl::new(self.command_tx.clone())
    }

    // === COMMANDS ===

    pub fn pause(&mut self) {
        if self.state == GameState::Running {
            self.state = GameState::Stopped;
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Stopped {
            self.state = GameState::Running;
        }
    }

    /// Ticks per second. A non-positive rate pauses; infinity runs flat out.
    pub fn set_speed(&mut self, rate: f64) {
        if rate.is_nan() || rate <= 0.0 {
            self.pause();
            return;
        }
        self.tick_rate = if rate.is_finite() { Some(rate) } else { None };
        self.resume();
    }

    pub fn set_visible_snakes(&mut self, count: usize) {
        self.visible = count;
    }

    /// Scatter walls at the configured density, sparing the spawn corridors
    /// and any occupied cell. Returns the number of walls added.
    pub fn add_random_walls(&mut self) -> usize {
        let config = &self.config;
        self.board
            .add_random_walls(config.wall_density, |pos| placement::is_reserved(pos, config))
    }

    pub fn remove_walls(&mut self) {
        self.board.remove_walls();
    }

    fn apply(&mut self, command: GameCommand) {
        match command {
            GameCommand::Pause => self.pause(),
            GameCommand::Resume => self.resume(),
            GameCommand::SetSpeed(rate) => self.set_speed(rate),
            GameCommand::SetVisibleSnakes(count) => self.set_visible_snakes(count),
            GameCommand::AddRandomWalls => {
                self.add_random_walls();
            }
            GameCommand::RemoveWalls => self.remove_walls(),
        }
    }

    fn apply_pending_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.apply(command);
        }
    }

    // === OBSERVERS ===

    pub fn add_callback(&mut self, event: GameEvent, callback: GameCallback) -> CallbackId {
        let id = CallbackId::new(self.next_callback);
        self.next_callback += 1;
        self.callbacks_mut(event).push((id, callback));
        id
    }

    /// Returns false if no callback had this id
    pub fn remove_callback(&mut self, id: CallbackId) -> bool {
        let before = self.on_move.len() + self.on_end.len();
        self.on_move.retain(|(cid, _)| *cid != id);
        self.on_end.retain(|(cid, _)| *cid != id);
        before != self.on_move.len() + self.on_end.len()
    }

    fn callbacks_mut(&mut self, event: GameEvent) -> &mut Vec<(CallbackId, GameCallback)> {
        match event {
            GameEvent::Move => &mut self.on_move,
            GameEvent::End => &mut self.on_end,
        }
    }

    fn notify(&mut self, event: GameEvent) {
        let mut callbacks = std::mem::take(self.callbacks_mut(event));
        for (_, callback) in callbacks.iter_mut() {
            callback(&*self);
        }
        *self.callbacks_mut(event) = callbacks;
    }

    // === BRAINS ===

    /// Bind one oracle per snake, by index. Nothing is bound unless every
    /// oracle fits the configured encoding.
    pub fn set_brains(&mut self, oracles: &[SharedOracle]) -> Result<()> {
        let encoding = self.encoding.clone().ok_or(SimError::EncodingUnset)?;
        if oracles.len() != self.snakes.len() {
            return Err(SimError::InvalidConfig(format!(
                "{} oracles for {} snakes",
                oracles.len(),
                self.snakes.len()
            )));
        }

        let brains = oracles
            .iter()
            .map(|oracle| Brain::bind(encoding.clone(), oracle.clone()))
            .collect::<Result<Vec<_>>>()?;
        for (snake, brain) in self.snakes.iter_mut().zip(brains) {
            snake.set_brain(brain);
        }
        Ok(())
    }

    // === LIFECYCLE ===

    fn populate(&mut self) {
        self.snakes = (0..self.config.population)
            .map(|index| {
                let (positions, direction) = placement::spawn(index, &self.config);
                Snake::new(SnakeId(index), positions, direction)
            })
            .collect();

        for snake in &self.snakes {
            self.board.add_snake(snake);
        }
        for snake in &mut self.snakes {
            snake.fruit = self.board.add_fruit(snake.id, None);
        }
        self.alive = (0..self.snakes.len()).collect();
    }

    /// Fresh snakes at the same spawn points, fresh random walls, no brains
    pub fn reset(&mut self) {
        self.board.clear_objects();
        self.board.remove_walls();
        self.add_random_walls();
        self.populate();
        self.iteration = 0;
        self.state = GameState::Stopped;
    }

    /// Advance one tick. Does nothing unless the game is running.
    ///
    /// Fails without touching any state if an alive snake has no brain. An
    /// error from inside a snake's move (an oracle breaking its declared
    /// width) stops the game with the tick counter unchanged; snakes that
    /// already moved this tick keep their moves.
    pub fn step(&mut self) -> Result<()> {
        if self.state != GameState::Running {
            return Ok(());
        }
        if let Some(snake) = self.alive_snakes().find(|snake| snake.brain().is_none()) {
            return Err(SimError::NoBrain(snake.id));
        }

        let tick = self.iteration + 1;
        let threshold = self.config.loop_threshold;
        let mut failure = None;
        for index in self.alive.clone() {
            let snake = &mut self.snakes[index];
            match advance_snake(&mut self.board, snake, self.scoring.as_ref(), threshold) {
                Ok(outcome) if outcome.died => {
                    tracing::debug!(
                        "Snake {} died at tick {} with score {}",
                        outcome.snake,
                        tick,
                        snake.score
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        let snakes = &self.snakes;
        self.alive.retain(|&i| snakes[i].alive);

        if let Some(e) = failure {
            self.state = GameState::Stopped;
            tracing::error!("Tick {} aborted, game stopped: {}", tick, e);
            return Err(e);
        }
        self.iteration = tick;

        self.notify(GameEvent::Move);

        if self.alive.is_empty() {
            self.state = GameState::Ended;
            tracing::debug!("Game ended after {} ticks", self.iteration);
            self.notify(GameEvent::End);
        }
        Ok(())
    }

    /// Time between ticks. Rates too small to express saturate to
    /// `Duration::MAX`.
    fn interval(&self) -> Option<Duration> {
        self.tick_rate
            .map(|rate| Duration::try_from_secs_f64(1.0 / rate).unwrap_or(Duration::MAX))
    }

    /// Sleep out the rest of the tick interval, applying commands as they
    /// arrive. Returns early once a command pauses the game or changes its
    /// speed.
    async fn wait_for_next_tick(&mut self, started: tokio::time::Instant, interval: Duration) {
        let sleep = tokio::time::sleep(interval.saturating_sub(started.elapsed()));
        tokio::pin!(sleep);

        loop {
            let command = tokio::select! {
                _ = &mut sleep => return,
                command = self.command_rx.recv() => command,
            };
            if let Some(command) = command {
                self.apply(command);
            }
            if self.state != GameState::Running || self.interval() != Some(interval) {
                return;
            }
        }
    }

    /// Drive ticks until every snake is dead.
    ///
    /// A stopped game is started. While paused the loop waits for the next
    /// command; the game holds a sender of its own, so only a `GameControl`
    /// can wake a paused `run`, and pausing with none alive waits forever.
    /// Each tick sleeps for whatever is left of the configured interval;
    /// flat-out runs yield to the scheduler every `yield_every` ticks instead.
    pub async fn run(&mut self) -> Result<()> {
        self.resume();
        let yield_every = self.config.yield_every.max(1);

        loop {
            self.apply_pending_commands();
            match self.state {
                GameState::Ended => return Ok(()),
                GameState::Stopped => {
                    // Never `None` while `self.command_tx` lives
                    if let Some(command) = self.command_rx.recv().await {
                        self.apply(command);
                    }
                    continue;
                }
                GameState::Running => {}
            }

            let started = tokio::time::Instant::now();
            self.step()?;

            match self.interval() {
                Some(interval) => self.wait_for_next_tick(started, interval).await,
                None => {
                    if self.iteration % yield_every == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            }
        }
    }
}

/// Move one snake one step and score it.
///
/// The snake dies if the next cell is off the board, a wall, its own body,
/// or a cell it has already entered `loop_threshold` times since its last
/// fruit. Other snakes never block.
pub fn advance_snake(
    board: &mut Board,
    snake: &mut Snake,
    scoring: &dyn ScoreService,
    loop_threshold: u32,
) -> Result<MoveOutcome> {
    let id = snake.id;
    let from = snake.get_head()?;
    let turn = snake.think(board)?;
    let to = snake.get_next_position()?;

    let died = board.is_obstacle(to, id) || snake.get_history_count(to) >= loop_threshold;
    let ate_fruit = !died && board.get(to).map_or(false, |node| node.has_fruit_for(id));

    if died {
        board.delete_snake(snake);
        snake.alive = false;
    } else if ate_fruit {
        snake.extend_to(to)?;
        board.add_snake_position(id, to);
        board.delete_fruit(id, to);
        let next = board.add_fruit(id, None);
        if next.is_none() {
            tracing::warn!("No free cell for snake {}'s next fruit", id);
        }
        snake.eat_fruit(next);
    } else {
        let tail = snake.move_to(to)?;
        board.add_snake_position(id, to);
        board.remove_snake_position(id, tail);
        snake.add_history(to);
    }

    let outcome = MoveOutcome {
        snake: id,
        from,
        to,
        turn,
        ate_fruit,
        died,
    };
    snake.score += scoring.move_score(board, snake, &outcome);
    Ok(outcome)
}
