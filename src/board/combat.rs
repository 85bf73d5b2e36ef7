//! Knockback combat and action application
//!
//! An attack pushes the target one cell along the attack direction.
//! A push that leaves the board or hits another unit removes the target.
//! A clean push stuns; a second clean push on a stunned unit costs one
//! health point instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::grid::Board;
use crate::core::error::{Result, TacticsError};
use crate::core::types::{GridCoord, UnitId};

/// Why a unit left the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    PushedOffBoard,
    /// Pushed into a cell another unit already holds
    Collision,
    /// Out of health
    Defeated,
}

/// Result of a single attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    Removed(RemovalCause),
    Pushed { to: GridCoord, stunned: bool },
    /// Target not within one king move
    OutOfReach,
    /// Target belongs to the attacker's faction
    NotHostile,
}

/// Result of applying a chosen destination for a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// Destination was the unit's own cell
    Stayed,
    Moved,
    Attacked {
        target: UnitId,
        result: AttackOutcome,
        /// Attacker stepped into the cell the target vacated
        advanced: bool,
    },
    /// Destination unreachable or held by an ally; nothing happened
    Blocked,
}

impl Board {
    /// Attack an adjacent unit, resolving knockback and stun
    pub fn attack(&mut self, attacker: UnitId, target: UnitId) -> Result<AttackOutcome> {
        let attacker_unit = self
            .unit(attacker)
            .ok_or(TacticsError::UnitNotFound(attacker))?;
        let target_unit = self.unit(target).ok_or(TacticsError::UnitNotFound(target))?;

        if !attacker_unit.is_enemy_of(target_unit) {
            return Ok(AttackOutcome::NotHostile);
        }
        if !self.can_move(attacker, target_unit.position) {
            return Ok(AttackOutcome::OutOfReach);
        }

        let from = attacker_unit.position;
        let at = target_unit.position;
        let landing = GridCoord::new(at.x + (at.x - from.x), at.y + (at.y - from.y));

        let outcome = if !landing.in_bounds(self.size()) {
            self.remove_unit(target);
            AttackOutcome::Removed(RemovalCause::PushedOffBoard)
        } else if self.is_occupied(landing) {
            self.remove_unit(target);
            AttackOutcome::Removed(RemovalCause::Collision)
        } else {
            let Some(unit) = self.unit_mut(target) else {
                return Err(TacticsError::UnitNotFound(target));
            };
            if unit.stunned {
                unit.health = unit.health.saturating_sub(1);
                unit.stunned = false;
                if unit.health == 0 {
                    self.remove_unit(target);
                    AttackOutcome::Removed(RemovalCause::Defeated)
                } else {
                    unit.position = landing;
                    AttackOutcome::Pushed {
                        to: landing,
                        stunned: false,
                    }
                }
            } else {
                unit.position = landing;
                unit.stunned = true;
                AttackOutcome::Pushed {
                    to: landing,
                    stunned: true,
                }
            }
        };

        debug!(%attacker, %target, ?outcome, "attack resolved");
        Ok(outcome)
    }

    /// Carry out a unit's chosen destination
    ///
    /// Attacks when the destination holds an opponent, otherwise moves when
    /// the destination is adjacent and empty. Anything else is a no-op.
    pub fn apply_action(&mut self, id: UnitId, dest: GridCoord) -> Result<ActionOutcome> {
        let unit = self.unit(id).ok_or(TacticsError::UnitNotFound(id))?;
        let mover = unit.faction;
        if unit.position == dest {
            return Ok(ActionOutcome::Stayed);
        }

        let occupant = self.unit_at(dest).map(|o| (o.id, o.faction));
        match occupant {
            Some((target, faction)) if faction != mover => {
                let result = self.attack(id, target)?;
                let advanced = match result {
                    AttackOutcome::OutOfReach | AttackOutcome::NotHostile => false,
                    _ => self.move_unit(id, dest)?,
                };
                Ok(ActionOutcome::Attacked {
                    target,
                    result,
                    advanced,
                })
            }
            Some(_) => Ok(ActionOutcome::Blocked),
            None => {
                if self.move_unit(id, dest)? {
                    Ok(ActionOutcome::Moved)
                } else {
                    Ok(ActionOutcome::Blocked)
                }
            }
        }
    }
}
