//! Multi-episode training driver
//!
//! Owns the shared table and a seeded RNG so a run is reproducible from
//! its seed. Epsilon is fixed within an episode and decays between them.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::config::TacticsConfig;
use crate::core::error::{Result, TacticsError};
use crate::core::types::Faction;
use crate::learning::controller::TurnController;
use crate::learning::policy::LayeredPolicy;
use crate::learning::q_table::QTable;
use crate::session::episode::{run_episode, EpisodeResult};
use crate::session::setup::new_match;

/// Aggregate results of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub player_wins: usize,
    pub enemy_wins: usize,
    pub draws: usize,
    pub final_epsilon: f64,
    /// Distinct states in the table after the run
    pub states: usize,
    pub entries: usize,
}

impl TrainingSummary {
    fn record(&mut self, result: &EpisodeResult) {
        self.episodes += 1;
        match result.outcome.winner() {
            Some(Faction::Player) => self.player_wins += 1,
            Some(Faction::Enemy) => self.enemy_wins += 1,
            None => self.draws += 1,
        }
    }
}

pub struct TrainingSession {
    config: TacticsConfig,
    table: QTable,
    controller: TurnController,
    rng: ChaCha8Rng,
    epsilon: f64,
    snapshot_path: Option<PathBuf>,
}

impl TrainingSession {
    pub fn new(config: TacticsConfig, policy: LayeredPolicy, seed: u64) -> Result<Self> {
        config.validate().map_err(TacticsError::InvalidConfig)?;
        let table = QTable::from_config(&config.learning);
        let controller = TurnController::new(policy, &config.learning, config.reward.clone());
        let epsilon = config.learning.epsilon;
        Ok(Self {
            config,
            table,
            controller,
            rng: ChaCha8Rng::seed_from_u64(seed),
            epsilon,
            snapshot_path: None,
        })
    }

    /// Persist to `path`, resuming from it when a snapshot already exists
    ///
    /// A snapshot that exists but cannot be read is an error.
    pub fn with_snapshot(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        self.table.load_if_exists(&path)?;
        self.snapshot_path = Some(path);
        Ok(self)
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Play one episode on a fresh board, then decay epsilon
    pub fn run_episode(&mut self) -> Result<EpisodeResult> {
        let board = new_match(&self.config.match_rules, &mut self.rng)?;
        let result = run_episode(
            &mut self.table,
            &self.controller,
            board,
            &self.config.match_rules,
            self.epsilon,
            &mut self.rng,
        )?;
        self.epsilon *= self.config.learning.epsilon_decay;
        Ok(result)
    }

    /// Play `episodes` episodes and save the table when a path is set
    pub fn train(&mut self, episodes: usize) -> Result<TrainingSummary> {
        let mut summary = TrainingSummary::default();
        for episode in 0..episodes {
            let result = self.run_episode()?;
            summary.record(&result);
            info!(
                episode,
                outcome = ?result.outcome,
                rounds = result.rounds,
                epsilon = self.epsilon,
                states = self.table.len(),
                "training progress"
            );
        }
        summary.final_epsilon = self.epsilon;
        summary.states = self.table.len();
        summary.entries = self.table.entry_count();

        self.save()?;
        Ok(summary)
    }

    /// Write the table to the snapshot path, if any
    pub fn save(&self) -> Result<()> {
        match &self.snapshot_path {
            Some(path) => self.table.save(path),
            None => Ok(()),
        }
    }
}
