//! Units and objectives placed on the board

use serde::{Deserialize, Serialize};

use crate::core::types::{Faction, GridCoord, ObjectiveClass, UnitId};

/// Hit points a fresh unit starts with
pub const MAX_HEALTH: u8 = 2;

/// A single fighting unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub position: GridCoord,
    pub faction: Faction,
    pub health: u8,
    /// Set by a knockback; a second knockback while stunned costs health
    pub stunned: bool,
}

impl Unit {
    pub fn new(id: UnitId, position: GridCoord, faction: Faction) -> Self {
        Self {
            id,
            position,
            faction,
            health: MAX_HEALTH,
            stunned: false,
        }
    }

    pub fn is_enemy_of(&self, other: &Unit) -> bool {
        self.faction != other.faction
    }
}

/// A fixed cell worth points to whoever stands on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub position: GridCoord,
    pub class: ObjectiveClass,
}

impl Objective {
    pub fn new(position: GridCoord, class: ObjectiveClass) -> Self {
        Self { position, class }
    }

    pub fn major(x: i32, y: i32) -> Self {
        Self::new(GridCoord::new(x, y), ObjectiveClass::Major)
    }

    pub fn minor(x: i32, y: i32) -> Self {
        Self::new(GridCoord::new(x, y), ObjectiveClass::Minor)
    }
}
