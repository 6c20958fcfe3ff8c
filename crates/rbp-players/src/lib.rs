pub mod decider;
pub mod difficulty;
pub mod equity;
pub mod heuristic;

pub use decider::{apply_safety_clamps, BotDecider};
pub use difficulty::Difficulty;
pub use heuristic::HeuristicBot;
