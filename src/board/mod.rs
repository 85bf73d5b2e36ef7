//! Board and combat - the world the learning engine acts on
//!
//! Units move one king step per turn. Moving into an opponent attacks it
//! with a one-cell knockback; two units never share a cell.

pub mod combat;
pub mod grid;
pub mod units;

pub use combat::{ActionOutcome, AttackOutcome, RemovalCause};
pub use grid::Board;
pub use units::{Objective, Unit, MAX_HEALTH};
