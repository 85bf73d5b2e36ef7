use thiserror::Error;

use crate::core::types::{GridCoord, UnitId};

#[derive(Error, Debug)]
pub enum TacticsError {
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Cell {0} is occupied by more than one unit")]
    OccupiedCell(GridCoord),

    #[error("Coordinate {0} is outside a {1}x{1} board")]
    OutOfBounds(GridCoord, i32),

    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported snapshot version {0}")]
    SnapshotVersion(u32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TacticsError>;
