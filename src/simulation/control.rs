//! Remote control for a running game
//!
//! `Game::run` owns the game while it is awaited, so presentation code
//! steers it through a `GameControl` handle instead. Commands are queued
//! and applied between ticks, never in the middle of one.

use tokio::sync::mpsc::UnboundedSender;

/// Command accepted by the game's run loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameCommand {
    Pause,
    Resume,
    /// Ticks per second; <= 0 pauses, infinity runs flat out
    SetSpeed(f64),
    SetVisibleSnakes(usize),
    AddRandomWalls,
    RemoveWalls,
}

/// Cloneable handle that queues commands for a game
#[derive(Debug, Clone)]
pub struct GameControl {
    tx: UnboundedSender<GameCommand>,
}

impl GameControl {
    pub(crate) fn new(tx: UnboundedSender<GameCommand>) -> Self {
        Self { tx }
    }

    pub fn send(&self, command: GameCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("Game dropped; ignoring {:?}", command);
        }
    }

    pub fn pause(&self) {
        self.send(GameCommand::Pause);
    }

    pub fn resume(&self) {
        self.send(GameCommand::Resume);
    }

    pub fn set_speed(&self, rate: f64) {
        self.send(GameCommand::SetSpeed(rate));
    }

    pub fn set_visible_snakes(&self, count: usize) {
        self.send(GameCommand::SetVisibleSnakes(count));
    }

    pub fn add_random_walls(&self) {
        self.send(GameCommand::AddRandomWalls);
    }

    pub fn remove_walls(&self) {
        self.send(GameCommand::RemoveWalls);
    }
}
