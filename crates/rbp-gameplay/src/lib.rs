pub mod betting;
pub mod phase;
pub mod pot;
pub mod rules;
pub mod seat;
pub mod state;
pub mod street;
pub mod variant;

pub use betting::{Action, BettingResult, BettingRound, ValidActions};
pub use phase::Phase;
pub use pot::{PotManager, SidePot};
pub use seat::Seat;
pub use state::GameState;
pub use street::Street;
pub use variant::Variant;
