//! Square board holding units and objectives
//!
//! At most one unit per cell. Construction rejects any layout that breaks
//! this, and every mutation keeps it.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::board::units::{Objective, Unit};
use crate::core::error::{Result, TacticsError};
use crate::core::types::{Faction, GridCoord, UnitId};

/// The full board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    size: i32,
    /// Caller-supplied order; state keys and turn order follow it
    units: Vec<Unit>,
    objectives: Vec<Objective>,
}

impl Board {
    /// Create a board, failing fast on any impossible layout
    pub fn new(size: i32, units: Vec<Unit>, objectives: Vec<Objective>) -> Result<Self> {
        if size < 2 {
            return Err(TacticsError::InvalidBoard(format!(
                "board size {} is smaller than 2",
                size
            )));
        }

        let mut ids = AHashSet::new();
        let mut occupied = AHashSet::new();
        for unit in &units {
            if !unit.position.in_bounds(size) {
                return Err(TacticsError::OutOfBounds(unit.position, size));
            }
            if !ids.insert(unit.id) {
                return Err(TacticsError::InvalidBoard(format!(
                    "duplicate unit id {}",
                    unit.id
                )));
            }
            if !occupied.insert(unit.position) {
                return Err(TacticsError::OccupiedCell(unit.position));
            }
        }

        let mut objective_cells = AHashSet::new();
        for objective in &objectives {
            if !objective.position.in_bounds(size) {
                return Err(TacticsError::OutOfBounds(objective.position, size));
            }
            if !objective_cells.insert(objective.position) {
                return Err(TacticsError::InvalidBoard(format!(
                    "two objectives at {}",
                    objective.position
                )));
            }
        }

        Ok(Self {
            size,
            units,
            objectives,
        })
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn unit_at(&self, coord: GridCoord) -> Option<&Unit> {
        self.units.iter().find(|u| u.position == coord)
    }

    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.unit_at(coord).is_some()
    }

    pub fn units_of(&self, faction: Faction) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.faction == faction)
    }

    /// Ids of a faction's units in board order
    pub fn unit_ids_of(&self, faction: Faction) -> Vec<UnitId> {
        self.units_of(faction).map(|u| u.id).collect()
    }

    pub fn has_units(&self, faction: Faction) -> bool {
        self.units_of(faction).next().is_some()
    }

    pub fn objective_at(&self, coord: GridCoord) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.position == coord)
    }

    pub fn is_objective(&self, coord: GridCoord) -> bool {
        self.objective_at(coord).is_some()
    }

    /// Objective cells nobody stands on
    pub fn unclaimed_objectives(&self) -> impl Iterator<Item = &Objective> {
        self.objectives
            .iter()
            .filter(move |o| !self.is_occupied(o.position))
    }

    /// Number of a faction's units currently standing on an objective
    pub fn objective_holders(&self, faction: Faction) -> usize {
        self.units_of(faction)
            .filter(|u| self.is_objective(u.position))
            .count()
    }

    /// Points a faction earns this turn for the objectives it holds
    pub fn faction_score(&self, faction: Faction) -> u32 {
        self.objectives
            .iter()
            .filter(|o| {
                self.unit_at(o.position)
                    .map_or(false, |u| u.faction == faction)
            })
            .map(|o| o.class.score())
            .sum()
    }

    /// In bounds and within one king move of the unit
    pub fn can_move(&self, id: UnitId, dest: GridCoord) -> bool {
        match self.unit(id) {
            Some(unit) => {
                dest.in_bounds(self.size) && unit.position.chebyshev_distance(&dest) <= 1
            }
            None => false,
        }
    }

    /// Move a unit one step; returns whether it actually moved
    ///
    /// A destination that is out of reach or occupied leaves the unit
    /// where it is.
    pub fn move_unit(&mut self, id: UnitId, dest: GridCoord) -> Result<bool> {
        let from = self.unit(id).ok_or(TacticsError::UnitNotFound(id))?.position;
        if from == dest || !self.can_move(id, dest) || self.is_occupied(dest) {
            return Ok(false);
        }
        if let Some(unit) = self.unit_mut(id) {
            unit.position = dest;
        }
        Ok(true)
    }

    pub(crate) fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let index = self.units.iter().position(|u| u.id == id)?;
        Some(self.units.remove(index))
    }
}
