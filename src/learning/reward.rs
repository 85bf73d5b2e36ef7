//! Reward function
//!
//! Computed from the board after an action has been applied. Board
//! mutations never report a reward themselves.

use crate::board::units::{Objective, Unit};
use crate::core::config::RewardConfig;
use crate::core::types::ObjectiveClass;

/// Sum of the objective, adjacency and corner terms for a unit
pub fn reward(
    unit: &Unit,
    objectives: &[Objective],
    units: &[Unit],
    board_size: i32,
    config: &RewardConfig,
) -> f64 {
    objective_reward(unit, objectives, config)
        + adjacency_reward(unit, units, config)
        - corner_penalty(unit, objectives, board_size, config)
}

/// Points for standing on an objective
pub fn objective_reward(unit: &Unit, objectives: &[Objective], config: &RewardConfig) -> f64 {
    objectives
        .iter()
        .filter(|o| o.position == unit.position)
        .map(|o| match o.class {
            ObjectiveClass::Major => config.major_objective,
            ObjectiveClass::Minor => config.minor_objective,
        })
        .sum()
}

/// Bonus per opposing unit within one king move
pub fn adjacency_reward(unit: &Unit, units: &[Unit], config: &RewardConfig) -> f64 {
    let engaged = units
        .iter()
        .filter(|other| other.is_enemy_of(unit) && unit.position.is_adjacent(&other.position))
        .count();
    engaged as f64 * config.adjacent_enemy
}

/// Penalty for ending on a corner, waived when the corner is an objective
pub fn corner_penalty(
    unit: &Unit,
    objectives: &[Objective],
    board_size: i32,
    config: &RewardConfig,
) -> f64 {
    let on_objective = objectives.iter().any(|o| o.position == unit.position);
    if unit.position.is_corner(board_size) && !on_objective {
        config.corner_penalty
    } else {
        0.0
    }
}

/// Extra penalty when a unit's own action left it in place
pub fn stationary_penalty(moved: bool, config: &RewardConfig) -> f64 {
    if moved {
        0.0
    } else {
        config.stationary_penalty
    }
}
