//! Turn controller - one faction's full turn
//!
//! Per unit, in board order: decide, apply, reward, update. Then two
//! turn-level rules:
//! - fewer than 2 units on objectives: up to 2 idle units are pushed
//!   toward unclaimed objectives, bypassing the policy
//! - any unit still idle: every member of the faction gets a synthetic
//!   penalty transition
//!
//! All updates go to the same table in sequence, so a later unit's
//! lookup sees what earlier units just learned.

use ahash::AHashSet;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::combat::ActionOutcome;
use crate::board::grid::Board;
use crate::board::units::Unit;
use crate::core::config::{LearningConfig, RewardConfig};
use crate::core::error::{Result, TacticsError};
use crate::core::types::{Faction, GridCoord, UnitId};
use crate::learning::encoding::{encode_state, Action, ActionScope, StateKey};
use crate::learning::policy::{DecisionContext, DecisionRule, LayeredPolicy};
use crate::learning::q_table::QTable;
use crate::learning::reward::{reward, stationary_penalty};

/// Objective holders a faction should keep before redirects kick in
pub const MIN_OBJECTIVE_HOLDERS: usize = 2;

/// Most units redirected toward objectives in one turn
pub const MAX_REDIRECTS: usize = 2;

/// What happened to one unit during the turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTurnRecord {
    pub unit: UnitId,
    pub rule: DecisionRule,
    pub action: Action,
    pub outcome: ActionOutcome,
    pub reward: f64,
    pub moved: bool,
    pub on_objective: bool,
}

/// Summary of a faction's turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub faction: Faction,
    /// Policy decisions first, then redirects, in execution order
    pub records: Vec<UnitTurnRecord>,
    pub redirects: usize,
    /// Synthetic idle-penalty transitions applied
    pub idle_penalties: usize,
}

impl TurnReport {
    pub fn total_reward(&self) -> f64 {
        self.records.iter().map(|r| r.reward).sum()
    }
}

/// Plan which idle units go to which unclaimed objectives
///
/// Only triggers while the faction holds fewer than
/// `MIN_OBJECTIVE_HOLDERS` objectives. Idle units already standing on an
/// objective keep it. Each target is a distinct, currently empty objective
/// cell, nearest first (ties by objective order).
pub fn plan_objective_redirects(
    board: &Board,
    faction: Faction,
    idle: &[UnitId],
) -> Vec<(UnitId, GridCoord)> {
    if board.objective_holders(faction) >= MIN_OBJECTIVE_HOLDERS {
        return Vec::new();
    }

    let mut open: Vec<GridCoord> = board.unclaimed_objectives().map(|o| o.position).collect();
    let mut plan = Vec::new();

    for &id in idle {
        if plan.len() >= MAX_REDIRECTS || open.is_empty() {
            break;
        }
        let Some(unit) = board.unit(id) else {
            continue;
        };
        if unit.faction != faction || board.is_objective(unit.position) {
            continue;
        }
        let nearest = open
            .iter()
            .enumerate()
            .min_by_key(|(i, cell)| (unit.position.chebyshev_distance(cell), *i))
            .map(|(i, _)| i);
        if let Some(index) = nearest {
            plan.push((id, open.remove(index)));
        }
    }

    plan
}

/// Runs faction turns against a shared table
pub struct TurnController {
    policy: LayeredPolicy,
    include_stay: bool,
    rewards: RewardConfig,
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new(
            LayeredPolicy::strategic(),
            &LearningConfig::default(),
            RewardConfig::default(),
        )
    }
}

impl TurnController {
    pub fn new(policy: LayeredPolicy, learning: &LearningConfig, rewards: RewardConfig) -> Self {
        Self {
            policy,
            include_stay: learning.include_stay,
            rewards,
        }
    }

    fn scope(&self, board: &Board, faction: Faction) -> ActionScope {
        ActionScope::new(board.size(), self.include_stay, Some(faction))
    }

    /// Play one faction's turn
    ///
    /// `epsilon` is fixed for the call; annealing belongs to the caller.
    pub fn take_turn(
        &self,
        table: &mut QTable,
        board: &mut Board,
        faction: Faction,
        epsilon: f64,
        rng: &mut dyn RngCore,
    ) -> Result<TurnReport> {
        let scope = self.scope(board, faction);
        let state = encode_state(board.units(), board.objectives());
        table.ensure_initialized(&state, board.units(), &scope);

        let mut records = Vec::new();
        let mut moved = AHashSet::new();

        for id in board.unit_ids_of(faction) {
            // Only the acting faction moves, but stay robust to removals
            let Some(unit) = board.unit(id).cloned() else {
                continue;
            };
            let actions = scope.actions_for(&unit, board.units());
            let decision = {
                let ctx = DecisionContext {
                    unit: &unit,
                    board: &*board,
                    actions: &actions,
                    state: &state,
                    table: &*table,
                    epsilon,
                };
                self.policy.decide(&ctx, rng)
            };

            let record = self.resolve(
                table,
                board,
                &scope,
                &state,
                &unit,
                decision.action,
                decision.rule,
            )?;
            if record.moved {
                moved.insert(id);
            }
            records.push(record);
        }

        let idle: Vec<UnitId> = board
            .unit_ids_of(faction)
            .into_iter()
            .filter(|id| !moved.contains(id))
            .collect();
        let plan = plan_objective_redirects(board, faction, &idle);
        let redirects = plan.len();

        for (id, target) in plan {
            let unit = board
                .unit(id)
                .cloned()
                .ok_or(TacticsError::UnitNotFound(id))?;
            let step = unit.position.step_toward(&target);
            let current = encode_state(board.units(), board.objectives());
            debug!(unit = %id, %target, %step, "redirecting idle unit toward objective");

            let record = self.resolve(
                table,
                board,
                &scope,
                &current,
                &unit,
                step,
                DecisionRule::Redirect,
            )?;
            if record.moved {
                moved.insert(id);
            }
            records.push(record);
        }

        let members = board.unit_ids_of(faction);
        let any_idle = members.iter().any(|id| !moved.contains(id));
        let mut idle_penalties = 0;

        if any_idle {
            for id in members {
                let Some(unit) = board.unit(id) else {
                    continue;
                };
                let position = unit.position;
                let current = encode_state(board.units(), board.objectives());
                table.update(
                    &current,
                    position,
                    -self.rewards.faction_idle_penalty,
                    &current,
                    board.units(),
                    &scope,
                );
                idle_penalties += 1;
            }
            debug!(?faction, idle_penalties, "faction idle penalty applied");
        }

        Ok(TurnReport {
            faction,
            records,
            redirects,
            idle_penalties,
        })
    }

    /// Apply one action and run its reward/update cycle
    #[allow(clippy::too_many_arguments)]
    fn resolve(
        &self,
        table: &mut QTable,
        board: &mut Board,
        scope: &ActionScope,
        state: &StateKey,
        unit: &Unit,
        action: Action,
        rule: DecisionRule,
    ) -> Result<UnitTurnRecord> {
        let outcome = board.apply_action(unit.id, action)?;
        let after = board
            .unit(unit.id)
            .ok_or(TacticsError::UnitNotFound(unit.id))?;

        let moved = after.position != unit.position;
        let on_objective = board.is_objective(after.position);
        let value = reward(
            after,
            board.objectives(),
            board.units(),
            board.size(),
            &self.rewards,
        ) - stationary_penalty(moved, &self.rewards);

        let next_state = encode_state(board.units(), board.objectives());
        table.update(state, action, value, &next_state, board.units(), scope);

        debug!(
            unit = %unit.id,
            ?rule,
            %action,
            ?outcome,
            reward = value,
            "unit resolved"
        );

        Ok(UnitTurnRecord {
            unit: unit.id,
            rule,
            action,
            outcome,
            reward: value,
            moved,
            on_objective,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::units::Objective;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn unit(id: u32, x: i32, y: i32, faction: Faction) -> Unit {
        Unit::new(UnitId(id), GridCoord::new(x, y), faction)
    }

    #[test]
    fn test_redirect_plan_not_triggered_with_two_holders() {
        let board = Board::new(
            7,
            vec![
                unit(1, 1, 1, Faction::Player),
                unit(2, 2, 2, Faction::Player),
                unit(3, 5, 5, Faction::Player),
            ],
            vec![Objective::minor(1, 1), Objective::minor(2, 2), Objective::major(3, 5)],
        )
        .unwrap();
        let plan = plan_objective_redirects(&board, Faction::Player, &[UnitId(3)]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_redirect_plan_caps_at_two_and_skips_occupied() {
        let board = Board::new(
            9,
            vec![
                unit(1, 0, 0, Faction::Player),
                unit(2, 0, 2, Faction::Player),
                unit(3, 0, 4, Faction::Player),
                unit(4, 4, 4, Faction::Enemy),
            ],
            vec![Objective::major(4, 4), Objective::minor(2, 0), Objective::minor(2, 4)],
        )
        .unwrap();
        let idle = [UnitId(1), UnitId(2), UnitId(3)];
        let plan = plan_objective_redirects(&board, Faction::Player, &idle);

        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|(_, t)| *t != GridCoord::new(4, 4)));
        assert_eq!(plan[0], (UnitId(1), GridCoord::new(2, 0)));
        assert_eq!(plan[1], (UnitId(2), GridCoord::new(2, 4)));
    }

    #[test]
    fn test_redirect_plan_triggers_with_one_holder() {
        let board = Board::new(
            9,
            vec![unit(1, 2, 2, Faction::Player), unit(2, 0, 6, Faction::Player)],
            vec![Objective::minor(2, 2), Objective::minor(4, 6), Objective::major(6, 0)],
        )
        .unwrap();
        assert_eq!(board.objective_holders(Faction::Player), 1);

        let plan = plan_objective_redirects(&board, Faction::Player, &[UnitId(1), UnitId(2)]);
        // The holder keeps its cell, the other unit heads for the nearest free objective
        assert_eq!(plan, vec![(UnitId(2), GridCoord::new(4, 6))]);
    }

    #[test]
    fn test_redirect_plan_distinct_targets() {
        let board = Board::new(
            9,
            vec![unit(1, 0, 0, Faction::Player), unit(2, 0, 1, Faction::Player)],
            vec![Objective::minor(2, 0)],
        )
        .unwrap();
        let plan = plan_objective_redirects(&board, Faction::Player, &[UnitId(1), UnitId(2)]);
        assert_eq!(plan, vec![(UnitId(1), GridCoord::new(2, 0))]);
    }

    #[test]
    fn test_turn_updates_table_and_reports_every_unit() {
        let mut board = Board::new(
            6,
            vec![
                unit(1, 0, 1, Faction::Player),
                unit(2, 0, 3, Faction::Player),
                unit(3, 5, 2, Faction::Enemy),
            ],
            vec![Objective::major(3, 3)],
        )
        .unwrap();
        let mut table = QTable::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let controller = TurnController::default();

        let report = controller
            .take_turn(&mut table, &mut board, Faction::Player, 0.1, &mut rng)
            .unwrap();

        let policy_records = report
            .records
            .iter()
            .filter(|r| r.rule != DecisionRule::Redirect)
            .count();
        assert_eq!(policy_records, 2);
        assert!(!table.is_empty());
        // Enemy never acts on the player's turn
        assert_eq!(board.unit(UnitId(3)).unwrap().position, GridCoord::new(5, 2));
    }

    #[test]
    fn test_blocked_unit_gets_stationary_and_faction_penalty() {
        // Player boxed into a corner by its own allies: only "stay" is legal
        let mut board = Board::new(
            5,
            vec![
                unit(1, 0, 0, Faction::Player),
                unit(2, 1, 0, Faction::Player),
                unit(3, 0, 1, Faction::Player),
                unit(4, 1, 1, Faction::Player),
            ],
            vec![],
        )
        .unwrap();
        let mut table = QTable::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = TurnController::default()
            .take_turn(&mut table, &mut board, Faction::Player, 0.0, &mut rng)
            .unwrap();

        let first = &report.records[0];
        assert_eq!(first.unit, UnitId(1));
        assert!(!first.moved);
        // corner (-5) plus stationary (-1)
        assert_eq!(first.reward, -6.0);
        assert!(report.idle_penalties >= 1);
        assert_eq!(report.idle_penalties, board.unit_ids_of(Faction::Player).len());
    }

    #[test]
    fn test_all_moved_means_no_idle_penalty() {
        let mut board = Board::new(5, vec![unit(1, 2, 2, Faction::Player)], vec![]).unwrap();
        let mut table = QTable::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let controller = TurnController::new(
            LayeredPolicy::strategic(),
            &LearningConfig {
                include_stay: false,
                ..LearningConfig::default()
            },
            RewardConfig::default(),
        );
        let report = controller
            .take_turn(&mut table, &mut board, Faction::Player, 0.0, &mut rng)
            .unwrap();
        assert!(report.records[0].moved);
        assert_eq!(report.idle_penalties, 0);
    }
}
