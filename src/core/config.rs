//! Game and evolver configuration
//!
//! Every tunable lives here with its default. Settings can be loaded from a
//! TOML file; missing keys fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, SimError};

/// Which sensor encoding brains use for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    /// Raw step distances plus fruit distance and bearing
    Distance,
    /// Inverse-square obstacle proximity plus head-relative fruit proximity
    Proximity,
}

/// Reward strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringKind {
    AlignedDirection,
}

/// Reward strategy and its constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub kind: ScoringKind,
    /// Reward for eating a fruit
    pub fruit: f64,
    /// Reward for a step that heads towards the fruit
    pub toward: f64,
    /// Reward (usually negative) for a step away from the fruit
    pub against: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            kind: ScoringKind::AlignedDirection,
            fruit: 100.0,
            toward: 1.0,
            against: -1.0,
        }
    }
}

/// Configuration for a single game session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,

    /// Number of snakes created on every reset
    pub population: usize,

    /// How many snakes (by creation order) are exposed to observers
    pub visible: usize,

    /// Body length of every snake at spawn
    pub initial_length: usize,

    /// Probability that an eligible cell receives a random wall
    pub wall_density: f64,

    /// Target ticks per second. `None` runs flat out.
    pub tick_rate: Option<f64>,

    /// Visits to one cell since the last fruit after which the next visit kills
    pub loop_threshold: u32,

    /// Inset of the spawn ring from the board edge
    pub spawn_margin: usize,

    /// When running flat out, yield to the scheduler every this many ticks
    pub yield_every: u64,

    /// Seed for walls and fruit placement. `None` draws from entropy.
    pub seed: Option<u64>,

    /// Sensor encoding shared by every brain. `None` means brains cannot be bound.
    pub encoding: Option<EncodingKind>,

    pub scoring: ScoringConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 25,
            columns: 50,
            population: 20,
            visible: 20,
            initial_length: 4,
            wall_density: 0.0,
            tick_rate: None,
            loop_threshold: 2,
            spawn_margin: 2,
            yield_every: 50,
            seed: None,
            encoding: Some(EncodingKind::Proximity),
            scoring: ScoringConfig::default(),
        }
    }
}

impl GameConfig {
    /// Width and height of the spawn ring
    pub fn spawn_ring(&self) -> (usize, usize) {
        (
            self.columns.saturating_sub(2 * self.spawn_margin),
            self.rows.saturating_sub(2 * self.spawn_margin),
        )
    }

    /// Number of cells on the spawn ring
    pub fn spawn_perimeter(&self) -> usize {
        let (width, height) = self.spawn_ring();
        (2 * width + 2 * height).saturating_sub(4)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.spawn_ring();
        if width < 2 || height < 2 {
            return Err(SimError::InvalidConfig(format!(
                "board {}x{} leaves no spawn ring with margin {}",
                self.rows, self.columns, self.spawn_margin
            )));
        }

        if self.population == 0 {
            return Err(SimError::InvalidConfig("population must be positive".into()));
        }

        if self.initial_length == 0 || self.initial_length > self.spawn_perimeter() {
            return Err(SimError::InvalidConfig(format!(
                "initial_length ({}) must be within 1..={}",
                self.initial_length,
                self.spawn_perimeter()
            )));
        }

        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(SimError::InvalidConfig(format!(
                "wall_density ({}) must be within [0, 1]",
                self.wall_density
            )));
        }

        if let Some(rate) = self.tick_rate {
            if rate.is_nan() || rate <= 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "tick_rate ({}) must be positive; omit it to run flat out",
                    rate
                )));
            }
        }

        if self.loop_threshold == 0 {
            return Err(SimError::InvalidConfig("loop_threshold must be positive".into()));
        }

        Ok(())
    }
}

/// Parameters handed to the evolutionary optimizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolverParams {
    /// Candidates carried unchanged into the next generation.
    /// `None` resolves to 20% of the population.
    pub elitism: Option<usize>,
    /// Probability that an offspring is mutated at all
    pub mutation_rate: f64,
    /// Mutations applied to an offspring once it is picked for mutation
    pub mutation_amount: usize,
    /// Stop after this many generations. `None` runs until stopped.
    pub max_generations: Option<u64>,
}

impl Default for EvolverParams {
    fn default() -> Self {
        Self {
            elitism: None,
            mutation_rate: 0.4,
            mutation_amount: 3,
            max_generations: None,
        }
    }
}

impl EvolverParams {
    pub fn elitism_for(&self, population: usize) -> usize {
        self.elitism
            .unwrap_or_else(|| (0.2 * population as f64).round() as usize)
            .min(population)
    }
}

/// Root of a settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub evolver: EvolverParams,
}

impl Settings {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.game.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_board_too_small_for_spawn_ring() {
        let config = GameConfig {
            rows: 5,
            columns: 10,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_initial_length_bounded_by_ring() {
        let config = GameConfig {
            rows: 6,
            columns: 6,
            initial_length: 5,
            ..GameConfig::default()
        };
        // 2x2 ring has 4 cells
        assert_eq!(config.spawn_perimeter(), 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = Settings::from_toml(
            r#"
            [game]
            rows = 12
            columns = 14
            encoding = "distance"

            [game.scoring]
            fruit = 50.0

            [evolver]
            max_generations = 3
            "#,
        )
        .expect("settings should parse");

        assert_eq!(settings.game.rows, 12);
        assert_eq!(settings.game.population, 20);
        assert_eq!(settings.game.encoding, Some(EncodingKind::Distance));
        assert_eq!(settings.game.scoring.fruit, 50.0);
        assert_eq!(settings.game.scoring.against, -1.0);
        assert_eq!(settings.evolver.max_generations, Some(3));
    }

    #[test]
    fn test_tick_rate_must_be_positive() {
        for rate in [0.0, -1.0, f64::NAN] {
            let config = GameConfig {
                tick_rate: Some(rate),
                ..GameConfig::default()
            };
            assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
        }
        let flat_out = GameConfig {
            tick_rate: Some(f64::INFINITY),
            ..GameConfig::default()
        };
        assert!(flat_out.validate().is_ok());
    }

    #[test]
    fn test_default_elitism_is_a_fifth() {
        let params = EvolverParams::default();
        assert_eq!(params.elitism_for(20), 4);
        assert_eq!(params.elitism_for(2), 0);
    }
}
