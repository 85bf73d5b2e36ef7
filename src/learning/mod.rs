//! Tabular Q-learning for unit movement and attacks
//!
//! Leaves first: `encoding` turns a board into a state key and legal
//! actions, `q_table` stores and updates values, `policy` picks actions,
//! `reward` scores the result, and `controller` sequences a whole
//! faction turn through all of them.

pub mod controller;
pub mod encoding;
pub mod policy;
pub mod q_table;
pub mod reward;

pub use controller::{plan_objective_redirects, TurnController, TurnReport, UnitTurnRecord};
pub use encoding::{encode_state, enumerate_actions, Action, ActionScope, StateKey};
pub use policy::{
    epsilon_greedy, greedy_action, AvoidCorners, CaptureObjective, Decision, DecisionContext,
    DecisionRule, Engage, LayeredPolicy, LearnedValues, Strategy,
};
pub use q_table::{QTable, SnapshotRow, TableSnapshot, SNAPSHOT_VERSION};
pub use reward::reward;
