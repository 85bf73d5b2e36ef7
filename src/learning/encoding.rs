//! State keys and legal action sets
//!
//! A state key is the flat sequence of every unit's (x, y, faction) and
//! every objective's (x, y, class), in the order the caller presents them.
//! Keys are order sensitive: callers must iterate units in a stable order
//! for the whole session or equal positions will produce different keys.

use serde::{Deserialize, Serialize};

use crate::board::units::{Objective, Unit};
use crate::core::types::{Faction, GridCoord};

/// A target cell chosen for a unit's turn
pub type Action = GridCoord;

/// Canonical hashable encoding of a board at a decision point
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey(Vec<i32>);

impl StateKey {
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

/// Encode units then objectives into a state key
///
/// The unit count leads the key so a unit triple can never be mistaken
/// for an objective triple.
pub fn encode_state(units: &[Unit], objectives: &[Objective]) -> StateKey {
    let mut key = Vec::with_capacity(1 + 3 * (units.len() + objectives.len()));
    key.push(units.len() as i32);
    for unit in units {
        key.extend_from_slice(&[unit.position.x, unit.position.y, unit.faction.tag()]);
    }
    for objective in objectives {
        key.extend_from_slice(&[
            objective.position.x,
            objective.position.y,
            objective.class.tag(),
        ]);
    }
    StateKey(key)
}

/// Candidate destinations for a unit
///
/// "Stay" first when included, then the 8 neighbors. Out-of-bounds cells
/// and cells held by the mover's own faction are dropped; cells held by
/// the opposing faction remain (choosing one means attacking).
pub fn enumerate_actions(
    unit: &Unit,
    all_units: &[Unit],
    board_size: i32,
    include_stay: bool,
) -> Vec<Action> {
    let mut actions = Vec::with_capacity(9);
    if include_stay {
        actions.push(unit.position);
    }
    for cell in unit.position.neighbors() {
        if !cell.in_bounds(board_size) {
            continue;
        }
        let ally_there = all_units
            .iter()
            .any(|u| u.position == cell && u.faction == unit.faction);
        if !ally_there {
            actions.push(cell);
        }
    }
    actions
}

/// Which units learn and how their action sets are built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionScope {
    pub board_size: i32,
    pub include_stay: bool,
    /// `None` lets every unit on the board learn
    pub learner: Option<Faction>,
}

impl ActionScope {
    pub fn new(board_size: i32, include_stay: bool, learner: Option<Faction>) -> Self {
        Self {
            board_size,
            include_stay,
            learner,
        }
    }

    pub fn learns(&self, unit: &Unit) -> bool {
        self.learner.map_or(true, |f| f == unit.faction)
    }

    pub fn actions_for(&self, unit: &Unit, all_units: &[Unit]) -> Vec<Action> {
        enumerate_actions(unit, all_units, self.board_size, self.include_stay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitId;

    fn unit(id: u32, x: i32, y: i32, faction: Faction) -> Unit {
        Unit::new(UnitId(id), GridCoord::new(x, y), faction)
    }

    #[test]
    fn test_equal_layouts_give_equal_keys() {
        let units = vec![unit(1, 0, 0, Faction::Player), unit(2, 3, 3, Faction::Enemy)];
        let objectives = vec![Objective::major(2, 2)];
        assert_eq!(encode_state(&units, &objectives), encode_state(&units.clone(), &objectives));
    }

    #[test]
    fn test_key_layout() {
        let key = encode_state(
            &[unit(1, 0, 4, Faction::Player), unit(2, 3, 1, Faction::Enemy)],
            &[Objective::minor(2, 2)],
        );
        assert_eq!(key.as_slice(), &[2, 0, 4, 0, 3, 1, 1, 2, 2, 1]);
    }

    #[test]
    fn test_key_is_order_sensitive() {
        let a = unit(1, 0, 0, Faction::Player);
        let b = unit(2, 3, 3, Faction::Enemy);
        let forward = encode_state(&[a.clone(), b.clone()], &[]);
        let reversed = encode_state(&[b, a], &[]);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_faction_changes_key() {
        let p = encode_state(&[unit(1, 1, 1, Faction::Player)], &[]);
        let e = encode_state(&[unit(1, 1, 1, Faction::Enemy)], &[]);
        assert_ne!(p, e);
    }

    #[test]
    fn test_units_and_objectives_do_not_alias() {
        let as_unit = encode_state(&[unit(1, 1, 1, Faction::Player)], &[]);
        let as_objective = encode_state(&[], &[Objective::major(1, 1)]);
        assert_ne!(as_unit, as_objective);
    }

    #[test]
    fn test_center_unit_has_nine_actions() {
        let u = unit(1, 2, 2, Faction::Player);
        let actions = enumerate_actions(&u, &[u.clone()], 5, true);
        assert_eq!(actions.len(), 9);
        assert_eq!(actions[0], u.position);
    }

    #[test]
    fn test_without_stay() {
        let u = unit(1, 2, 2, Faction::Player);
        let actions = enumerate_actions(&u, &[u.clone()], 5, false);
        assert_eq!(actions.len(), 8);
        assert!(!actions.contains(&u.position));
    }

    #[test]
    fn test_corner_unit_is_clipped() {
        let u = unit(1, 0, 0, Faction::Enemy);
        let actions = enumerate_actions(&u, &[u.clone()], 5, true);
        assert_eq!(actions.len(), 4);
        assert!(actions.iter().all(|a| a.in_bounds(5)));
    }

    #[test]
    fn test_filters_own_faction_only() {
        // Enemy mover: its ally blocks, the player unit stays targetable
        let mover = unit(1, 2, 2, Faction::Enemy);
        let ally = unit(2, 3, 2, Faction::Enemy);
        let foe = unit(3, 1, 2, Faction::Player);
        let units = vec![mover.clone(), ally, foe];
        let actions = enumerate_actions(&mover, &units, 5, true);
        assert!(!actions.contains(&GridCoord::new(3, 2)));
        assert!(actions.contains(&GridCoord::new(1, 2)));
    }

    #[test]
    fn test_scope_learner_filter() {
        let scope = ActionScope::new(5, true, Some(Faction::Player));
        assert!(scope.learns(&unit(1, 0, 0, Faction::Player)));
        assert!(!scope.learns(&unit(2, 0, 1, Faction::Enemy)));
        let everyone = ActionScope::new(5, true, None);
        assert!(everyone.learns(&unit(2, 0, 1, Faction::Enemy)));
    }
}
