use rbp_cards::Hole;
use rbp_core::Chips;

/// A single seat at the table. Its index within [`crate::state::GameState::seats`]
/// is its [`rbp_core::Position`] for the current hand.
#[derive(Debug, Clone)]
pub struct Seat {
    pub player_id: String,
    pub name: String,
    pub chips: Chips,
    pub hole: Option<Hole>,
    /// Chips committed this street.
    pub bet: Chips,
    /// Chips committed this entire hand.
    pub total_bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub sitting_out: bool,
    pub is_bot: bool,
}

impl Seat {
    pub fn new(player_id: impl Into<String>, name: impl Into<String>, chips: Chips, is_bot: bool) -> Self {
        Self {
            player_id: player_id.into(),
            name: name.into(),
            chips,
            hole: None,
            bet: 0,
            total_bet: 0,
            folded: false,
            all_in: false,
            sitting_out: false,
            is_bot,
        }
    }

    /// True if this seat can still contribute to the pot and win a showdown.
    pub fn active(&self) -> bool {
        !self.folded && !self.sitting_out
    }

    /// Resets all per-hand transient state; called at the start of each hand.
    pub fn reset_for_hand(&mut self) {
        self.hole = None;
        self.bet = 0;
        self.total_bet = 0;
        self.folded = false;
        self.all_in = false;
        if self.chips <= 0 {
            self.sitting_out = true;
        }
    }

    /// Resets just the street-scoped bet, called between streets.
    pub fn reset_for_street(&mut self) {
        self.bet = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busted_seat_sits_out_next_hand() {
        let mut seat = Seat::new("p0", "Alice", 0, false);
        seat.reset_for_hand();
        assert!(seat.sitting_out);
    }

    #[test]
    fn folded_seat_is_not_active() {
        let mut seat = Seat::new("p0", "Alice", 100, false);
        seat.folded = true;
        assert!(!seat.active());
    }
}
