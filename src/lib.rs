//! Grid Tactics - turn-based skirmish with tabular Q-learning units

pub mod board;
pub mod core;
pub mod learning;
pub mod session;
