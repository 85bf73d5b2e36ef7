//! One AI-vs-AI match
//!
//! Rounds alternate a PLAYER turn then an ENEMY turn. After every round
//! each faction scores the objectives it holds. The match ends when a
//! faction reaches the victory score, a faction is wiped out, or the
//! round cap is hit.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::grid::Board;
use crate::core::config::MatchConfig;
use crate::core::error::Result;
use crate::core::types::Faction;
use crate::learning::controller::TurnController;
use crate::learning::q_table::QTable;

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    PlayerVictory,
    EnemyVictory,
    /// Round cap reached with no winner
    Draw,
}

impl MatchOutcome {
    pub fn winner(&self) -> Option<Faction> {
        match self {
            MatchOutcome::PlayerVictory => Some(Faction::Player),
            MatchOutcome::EnemyVictory => Some(Faction::Enemy),
            MatchOutcome::Draw => None,
        }
    }
}

/// Final tallies for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub outcome: MatchOutcome,
    pub rounds: u32,
    pub player_score: u32,
    pub enemy_score: u32,
    pub player_units_left: usize,
    pub enemy_units_left: usize,
    /// Sum of per-unit rewards the PLAYER faction collected
    pub player_reward: f64,
    pub enemy_reward: f64,
    pub epsilon: f64,
}

/// Decide whether the match is over
///
/// Score victories are checked before eliminations, PLAYER before ENEMY.
pub fn check_outcome(
    board: &Board,
    player_score: u32,
    enemy_score: u32,
    victory_score: u32,
) -> Option<MatchOutcome> {
    if player_score >= victory_score {
        Some(MatchOutcome::PlayerVictory)
    } else if enemy_score >= victory_score {
        Some(MatchOutcome::EnemyVictory)
    } else if !board.has_units(Faction::Player) {
        Some(MatchOutcome::EnemyVictory)
    } else if !board.has_units(Faction::Enemy) {
        Some(MatchOutcome::PlayerVictory)
    } else {
        None
    }
}

/// Play a match to completion, learning into `table` as it goes
pub fn run_episode(
    table: &mut QTable,
    controller: &TurnController,
    mut board: Board,
    rules: &MatchConfig,
    epsilon: f64,
    rng: &mut dyn RngCore,
) -> Result<EpisodeResult> {
    let mut player_score = 0;
    let mut enemy_score = 0;
    let mut player_reward = 0.0;
    let mut enemy_reward = 0.0;
    let mut rounds = 0;

    let outcome = loop {
        if rounds >= rules.max_turns {
            break MatchOutcome::Draw;
        }
        rounds += 1;

        for faction in Faction::all() {
            let report = controller.take_turn(table, &mut board, faction, epsilon, rng)?;
            match faction {
                Faction::Player => player_reward += report.total_reward(),
                Faction::Enemy => enemy_reward += report.total_reward(),
            }
        }

        player_score += board.faction_score(Faction::Player);
        enemy_score += board.faction_score(Faction::Enemy);
        debug!(rounds, player_score, enemy_score, "round finished");

        if let Some(outcome) = check_outcome(&board, player_score, enemy_score, rules.victory_score)
        {
            break outcome;
        }
    };

    let result = EpisodeResult {
        outcome,
        rounds,
        player_score,
        enemy_score,
        player_units_left: board.units_of(Faction::Player).count(),
        enemy_units_left: board.units_of(Faction::Enemy).count(),
        player_reward,
        enemy_reward,
        epsilon,
    };
    info!(
        ?outcome,
        rounds,
        player_score,
        enemy_score,
        "episode finished"
    );
    Ok(result)
}
