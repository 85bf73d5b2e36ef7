//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Stable identifier for units
///
/// Units are removed from the board when defeated; ids never get reused
/// within a match so a removal never shifts another unit's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Grid cell coordinate (column x, row y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// King-move distance: diagonal steps cost the same as straight ones
    pub fn chebyshev_distance(&self, other: &Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// Within one king move (excludes the cell itself)
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self != other && self.chebyshev_distance(other) <= 1
    }

    /// The 8 surrounding cells, row-major by dx then dy
    pub fn neighbors(&self) -> [GridCoord; 8] {
        let mut cells = [*self; 8];
        let mut i = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                cells[i] = GridCoord::new(self.x + dx, self.y + dy);
                i += 1;
            }
        }
        cells
    }

    /// One king move toward `target` (returns self when already there)
    pub fn step_toward(&self, target: &Self) -> Self {
        GridCoord::new(
            self.x + (target.x - self.x).signum(),
            self.y + (target.y - self.y).signum(),
        )
    }

    pub fn in_bounds(&self, board_size: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < board_size && self.y < board_size
    }

    pub fn is_corner(&self, board_size: i32) -> bool {
        let last = board_size - 1;
        (self.x == 0 || self.x == last) && (self.y == 0 || self.y == last)
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Side a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn opponent(&self) -> Self {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }

    /// Stable tag written into state keys
    pub fn tag(&self) -> i32 {
        match self {
            Faction::Player => 0,
            Faction::Enemy => 1,
        }
    }

    pub fn all() -> [Faction; 2] {
        [Faction::Player, Faction::Enemy]
    }
}

/// Objective importance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveClass {
    Major,
    Minor,
}

impl ObjectiveClass {
    /// Stable tag written into state keys
    pub fn tag(&self) -> i32 {
        match self {
            ObjectiveClass::Major => 0,
            ObjectiveClass::Minor => 1,
        }
    }

    /// Points a faction scores per turn for holding an objective of this class
    pub fn score(&self) -> u32 {
        match self {
            ObjectiveClass::Major => 3,
            ObjectiveClass::Minor => 1,
        }
    }
}
