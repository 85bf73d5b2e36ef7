//! Match driver: setup, single episodes, and multi-episode training

pub mod episode;
pub mod setup;
pub mod training;

pub use episode::{check_outcome, run_episode, EpisodeResult, MatchOutcome};
pub use setup::{generate_units, new_match, place_objectives};
pub use training::{TrainingSession, TrainingSummary};
