//! Learning, reward and match configuration with documented constants
//!
//! All tunable numbers live here. Defaults are the canonical values the
//! learned tables are trained against; a table trained under one reward
//! set is not comparable with one trained under another.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, TacticsError};

/// Tabular Q-learning hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Step size for the TD update
    pub alpha: f64,

    /// Discount applied to the bootstrap term
    pub gamma: f64,

    /// Exploration probability for the epsilon-greedy fallback
    ///
    /// Fixed for the duration of one episode. Annealing between episodes
    /// is the match driver's job, see `epsilon_decay`.
    pub epsilon: f64,

    /// Multiplier applied to epsilon after every training episode
    pub epsilon_decay: f64,

    /// Whether staying on the current cell counts as a legal action
    pub include_stay: bool,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.1,
            epsilon_decay: 0.99,
            include_stay: true,
        }
    }
}

/// Reward terms, all additive
///
/// Penalties are stored as positive magnitudes and subtracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Ending the action on a MAJOR objective
    pub major_objective: f64,

    /// Ending the action on a MINOR objective
    pub minor_objective: f64,

    /// Per opposing unit within one king move
    pub adjacent_enemy: f64,

    /// Ending on a board corner that holds no objective
    pub corner_penalty: f64,

    /// Unit position unchanged after its own action
    pub stationary_penalty: f64,

    /// Synthetic transition for every faction member when any member idled
    pub faction_idle_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            major_objective: 3.0,
            minor_objective: 1.0,
            adjacent_enemy: 10.0,
            corner_penalty: 5.0,
            stationary_penalty: 1.0,
            faction_idle_penalty: 5.0,
        }
    }
}

/// Headless match setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Board edge length in cells (square board)
    pub board_size: i32,

    /// Units deployed per faction on opposite edge columns
    pub units_per_side: usize,

    pub major_objectives: usize,
    pub minor_objectives: usize,

    /// Accumulated objective score that wins the match
    pub victory_score: u32,

    /// Rounds before the match is declared a draw
    pub max_turns: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: 20,
            units_per_side: 7,
            major_objectives: 1,
            minor_objectives: 4,
            victory_score: 50,
            max_turns: 200,
        }
    }
}

/// Complete configuration, loadable from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    pub learning: LearningConfig,
    pub reward: RewardConfig,
    pub match_rules: MatchConfig,
}

impl TacticsConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let l = &self.learning;
        if !(l.alpha > 0.0 && l.alpha <= 1.0) {
            return Err(format!("alpha ({}) must be in (0, 1]", l.alpha));
        }
        if !(0.0..=1.0).contains(&l.gamma) {
            return Err(format!("gamma ({}) must be in [0, 1]", l.gamma));
        }
        if !(0.0..=1.0).contains(&l.epsilon) {
            return Err(format!("epsilon ({}) must be in [0, 1]", l.epsilon));
        }
        if !(l.epsilon_decay > 0.0 && l.epsilon_decay <= 1.0) {
            return Err(format!("epsilon_decay ({}) must be in (0, 1]", l.epsilon_decay));
        }

        let m = &self.match_rules;
        if m.board_size < 3 {
            return Err(format!("board_size ({}) must be at least 3", m.board_size));
        }
        if m.units_per_side == 0 || m.units_per_side > m.board_size as usize {
            return Err(format!(
                "units_per_side ({}) must be between 1 and board_size ({})",
                m.units_per_side, m.board_size
            ));
        }
        // Objectives never go on the two deployment columns
        let free_cells = (m.board_size as usize - 2) * m.board_size as usize;
        if m.major_objectives + m.minor_objectives > free_cells {
            return Err(format!(
                "{} objectives do not fit in {} free cells",
                m.major_objectives + m.minor_objectives,
                free_cells
            ));
        }

        Ok(())
    }
}

/// Load configuration from a TOML file
///
/// Missing sections and fields fall back to their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<TacticsConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: TacticsConfig = toml::from_str(&contents).map_err(|e| {
        TacticsError::InvalidConfig(format!("Failed to parse {:?}: {}", path, e))
    })?;

    config.validate().map_err(TacticsError::InvalidConfig)?;
    Ok(config)
}
