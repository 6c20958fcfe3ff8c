use super::phase::Phase;
use super::seat::Seat;
use super::variant::Variant;
use rbp_cards::Card;
use rbp_core::{Chips, HandNo, Position};

/// Full mutable state of one table, shared between the betting round, the
/// pot manager, and the orchestrator that drives a hand.
#[derive(Debug, Clone)]
pub struct GameState {
    pub game_id: String,
    pub variant: Variant,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub seats: Vec<Seat>,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub dealer_index: Position,
    pub current_player_index: Option<Position>,
    pub hand_number: HandNo,
    pub phase: Phase,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
}

impl GameState {
    pub fn new(game_id: impl Into<String>, variant: Variant, small_blind: Chips, big_blind: Chips) -> Self {
        Self {
            game_id: game_id.into(),
            variant,
            small_blind,
            big_blind,
            seats: Vec::new(),
            board: Vec::new(),
            pot: 0,
            dealer_index: 0,
            current_player_index: None,
            hand_number: 0,
            phase: Phase::Waiting,
            min_buy_in: big_blind * 20,
            max_buy_in: big_blind * 200,
        }
    }

    pub fn seated_count(&self) -> usize {
        self.seats.iter().filter(|s| s.chips > 0 || !s.sitting_out).count()
    }

    pub fn active_seats(&self) -> impl Iterator<Item = (Position, &Seat)> {
        self.seats.iter().enumerate().filter(|(_, s)| s.active())
    }

    pub fn active_count(&self) -> usize {
        self.active_seats().count()
    }

    pub fn seat(&self, pos: Position) -> &Seat {
        &self.seats[pos]
    }

    pub fn seat_mut(&mut self, pos: Position) -> &mut Seat {
        &mut self.seats[pos]
    }

    pub fn position_of(&self, player_id: &str) -> Option<Position> {
        self.seats.iter().position(|s| s.player_id == player_id)
    }

    /// Total chips in play: stacks plus the pot. Invariant across any
    /// single hand except the instant inside the `winner` broadcast,
    /// where the pot has been emptied into stacks but the event still
    /// carries the pre-clear amount.
    pub fn total_chips(&self) -> Chips {
        self.pot + self.seats.iter().map(|s| s.chips).sum::<Chips>()
    }

    /// Clears all seats' street-scoped bets, called between streets.
    pub fn reset_street_bets(&mut self) {
        for seat in &mut self.seats {
            seat.reset_for_street();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_chips_unaffected_by_pot_contribution() {
        let mut state = GameState::new("g1", Variant::NoLimit, 1, 2);
        state.seats.push(Seat::new("p0", "A", 100, false));
        state.seats.push(Seat::new("p1", "B", 100, false));
        let before = state.total_chips();
        state.seats[0].chips -= 10;
        state.pot += 10;
        assert_eq!(state.total_chips(), before);
    }
}
