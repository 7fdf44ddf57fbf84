//! Snake Evolver - headless entry point
//!
//! Evolves snake controllers and prints one JSON line of statistics per
//! generation. Logs go to stderr; set RUST_LOG to change the filter.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use snake_evolver::brain::OUTPUT_SIZE;
use snake_evolver::core::config::{EncodingKind, Settings};
use snake_evolver::core::error::{Result, SimError};
use snake_evolver::evolution::{ElitistOptimizer, Evolver, EvolverEvent};
use snake_evolver::simulation::Game;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Distance,
    Proximity,
}

impl From<EncodingArg> for EncodingKind {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Distance => EncodingKind::Distance,
            EncodingArg::Proximity => EncodingKind::Proximity,
        }
    }
}

/// Evolve snake controllers on a shared grid
#[derive(Parser, Debug)]
#[command(name = "snake-evolver")]
#[command(about = "Evolve snake controllers and print per-generation statistics as JSON lines")]
struct Args {
    /// TOML settings file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many generations
    #[arg(long)]
    generations: Option<u64>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    columns: Option<usize>,

    /// Snakes per generation
    #[arg(long)]
    population: Option<usize>,

    /// Ticks per second; omit to run flat out
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Sensor encoding fed to every brain
    #[arg(long, value_enum)]
    encoding: Option<EncodingArg>,
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        let game = &mut settings.game;
        if let Some(rows) = self.rows {
            game.rows = rows;
        }
        if let Some(columns) = self.columns {
            game.columns = columns;
        }
        if let Some(population) = self.population {
            game.population = population;
            game.visible = game.visible.min(population);
        }
        if self.seed.is_some() {
            game.seed = self.seed;
        }
        if self.tick_rate.is_some() {
            game.tick_rate = self.tick_rate;
        }
        if let Some(encoding) = self.encoding {
            game.encoding = Some(encoding.into());
        }
        if self.generations.is_some() {
            settings.evolver.max_generations = self.generations;
        }

        settings.game.validate()?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snake_evolver=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = args.settings()?;

    let game = Game::new(settings.game.clone())?;
    let inputs = game
        .encoding()
        .map(|encoding| encoding.input_size())
        .ok_or(SimError::EncodingUnset)?;
    let optimizer = ElitistOptimizer::new(
        settings.game.population,
        inputs,
        OUTPUT_SIZE,
        &settings.evolver,
        settings.game.seed,
    )?;

    let mut evolver = Evolver::new(game, settings.evolver.clone(), Box::new(optimizer))?;
    evolver.add_callback(
        EvolverEvent::PostGen,
        Box::new(|evolver: &Evolver| {
            let Some(stats) = evolver.last_stats() else {
                return;
            };
            match serde_json::to_string(stats) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Failed to serialize generation stats: {}", e),
            }
        }),
    );

    let stop = evolver.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted; stopping after the current generation");
            stop.stop();
        }
    });

    evolver.run().await?;

    tracing::info!(
        "Finished after {} generations, high score {}",
        evolver.generation(),
        evolver.high_score()
    );
    Ok(())
}
