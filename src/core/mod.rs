pub mod config;
pub mod error;
pub mod types;

pub use config::{LearningConfig, MatchConfig, RewardConfig, TacticsConfig};
pub use error::{Result, TacticsError};
pub use types::{Faction, GridCoord, ObjectiveClass, UnitId};
