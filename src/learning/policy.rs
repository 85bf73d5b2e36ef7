//! Action selection
//!
//! Architecture: ordered strategy list
//! - Each `Strategy` looks at one structural cue and may propose an action
//! - `LayeredPolicy` asks them in order; the first proposal wins
//! - `LearnedValues` (epsilon-greedy over the table) always proposes, so
//!   it sits last as the fallback
//!
//! Randomness is always injected by the caller.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::board::grid::Board;
use crate::board::units::Unit;
use crate::learning::encoding::{Action, StateKey};
use crate::learning::q_table::QTable;

/// Which rule produced a unit's action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionRule {
    CaptureObjective,
    Engage,
    AvoidCorners,
    LearnedValues,
    /// Forced move toward an unclaimed objective by the turn controller
    Redirect,
    /// No rule matched (empty action set): the unit stays put
    Stay,
}

/// Everything a strategy may look at for one unit's decision
pub struct DecisionContext<'a> {
    pub unit: &'a Unit,
    pub board: &'a Board,
    pub actions: &'a [Action],
    pub state: &'a StateKey,
    pub table: &'a QTable,
    pub epsilon: f64,
}

/// One rule of the layered policy
pub trait Strategy {
    fn rule(&self) -> DecisionRule;

    /// Propose an action, or `None` to defer to the next rule
    fn propose(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> Option<Action>;
}

/// First legal action with the highest value; ties go to the earliest
pub fn greedy_action(table: &QTable, state: &StateKey, actions: &[Action]) -> Option<Action> {
    let mut best: Option<(Action, f64)> = None;
    for &action in actions {
        let value = table.get(state, action);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((action, value)),
        }
    }
    best.map(|(action, _)| action)
}

/// Random legal action with probability `epsilon`, greedy otherwise
///
/// An empty action set yields the unit's own cell.
pub fn epsilon_greedy(
    table: &QTable,
    state: &StateKey,
    unit: &Unit,
    actions: &[Action],
    epsilon: f64,
    rng: &mut dyn RngCore,
) -> Action {
    let picked = if rng.gen::<f64>() < epsilon {
        actions.choose(rng).copied()
    } else {
        greedy_action(table, state, actions)
    };
    picked.unwrap_or(unit.position)
}

/// Step onto an objective nobody else holds
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureObjective;

impl Strategy for CaptureObjective {
    fn rule(&self) -> DecisionRule {
        DecisionRule::CaptureObjective
    }

    fn propose(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> Option<Action> {
        let open: Vec<Action> = ctx
            .actions
            .iter()
            .copied()
            .filter(|&cell| {
                ctx.board.is_objective(cell)
                    && ctx.board.unit_at(cell).map_or(true, |u| u.id == ctx.unit.id)
            })
            .collect();
        open.choose(rng).copied()
    }
}

/// Attack the first reachable opponent
#[derive(Debug, Clone, Copy, Default)]
pub struct Engage;

impl Strategy for Engage {
    fn rule(&self) -> DecisionRule {
        DecisionRule::Engage
    }

    fn propose(&self, ctx: &DecisionContext, _rng: &mut dyn RngCore) -> Option<Action> {
        ctx.actions.iter().copied().find(|&cell| {
            ctx.board
                .unit_at(cell)
                .map_or(false, |u| u.is_enemy_of(ctx.unit))
        })
    }
}

/// Any action that keeps the unit off the board corners
#[derive(Debug, Clone, Copy, Default)]
pub struct AvoidCorners;

impl Strategy for AvoidCorners {
    fn rule(&self) -> DecisionRule {
        DecisionRule::AvoidCorners
    }

    fn propose(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> Option<Action> {
        let size = ctx.board.size();
        let safe: Vec<Action> = ctx
            .actions
            .iter()
            .copied()
            .filter(|cell| !cell.is_corner(size))
            .collect();
        safe.choose(rng).copied()
    }
}

/// Epsilon-greedy over the learned table
#[derive(Debug, Clone, Copy, Default)]
pub struct LearnedValues;

impl Strategy for LearnedValues {
    fn rule(&self) -> DecisionRule {
        DecisionRule::LearnedValues
    }

    fn propose(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> Option<Action> {
        if ctx.actions.is_empty() {
            return None;
        }
        Some(epsilon_greedy(
            ctx.table,
            ctx.state,
            ctx.unit,
            ctx.actions,
            ctx.epsilon,
            rng,
        ))
    }
}

/// A chosen action and the rule that chose it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub rule: DecisionRule,
}

/// Strategies evaluated in priority order, first match wins
pub struct LayeredPolicy {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for LayeredPolicy {
    fn default() -> Self {
        Self::strategic()
    }
}

impl LayeredPolicy {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Objectives, then engagement, then corner avoidance, then the table
    pub fn strategic() -> Self {
        Self::new(vec![
            Box::new(CaptureObjective),
            Box::new(Engage),
            Box::new(AvoidCorners),
            Box::new(LearnedValues),
        ])
    }

    /// Plain epsilon-greedy with no structural rules
    pub fn tabular() -> Self {
        Self::new(vec![Box::new(LearnedValues)])
    }

    pub fn rules(&self) -> Vec<DecisionRule> {
        self.strategies.iter().map(|s| s.rule()).collect()
    }

    pub fn decide(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> Decision {
        for strategy in &self.strategies {
            if let Some(action) = strategy.propose(ctx, rng) {
                return Decision {
                    action,
                    rule: strategy.rule(),
                };
            }
        }
        Decision {
            action: ctx.unit.position,
            rule: DecisionRule::Stay,
        }
    }
}
