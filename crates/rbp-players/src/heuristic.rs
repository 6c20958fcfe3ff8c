use super::decider::BotDecider;
use super::difficulty::Difficulty;
use super::equity;
use rand::RngCore;
use rbp_core::{Chips, Position};
use rbp_gameplay::{Action, GameState, ValidActions};

/// Equity-threshold bot. Estimates win probability against the field still
/// in the hand, compares it to the price being offered, and sizes bets as a
/// fraction of the pot. The three difficulty tiers differ in how much noise
/// and how cautious the thresholds are, not in the underlying approach.
#[derive(Debug, Default)]
pub struct HeuristicBot;

fn pot_odds(call_amount: Chips, pot: Chips) -> f64 {
    if call_amount <= 0 {
        return 0.0;
    }
    call_amount as f64 / (pot as f64 + call_amount as f64)
}

fn pot_size_bet(pot: Chips, fraction: f64, valid: &ValidActions) -> Chips {
    let raw = valid.call_amount + ((pot as f64) * fraction).round() as Chips;
    raw.clamp(valid.min_raise, valid.max_raise)
}

fn is_in_position(state: &GameState, seat: Position) -> bool {
    let active: Vec<Position> = state
        .seats
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.folded && !s.sitting_out)
        .map(|(i, _)| i)
        .collect();
    match active.last() {
        Some(&last) => last == seat,
        None => false,
    }
}

fn num_live_opponents(state: &GameState, seat: Position) -> usize {
    state
        .seats
        .iter()
        .enumerate()
        .filter(|(i, s)| *i != seat && !s.folded && !s.sitting_out)
        .count()
        .max(1)
}

impl HeuristicBot {
    fn decide_easy(
        &self,
        equity: f64,
        valid: &ValidActions,
        pot: Chips,
        rng: &mut dyn RngCore,
    ) -> Action {
        let odds = pot_odds(valid.call_amount, pot);
        if equity + 0.05 < odds {
            if valid.can_check {
                Action::Check
            } else {
                Action::Fold
            }
        } else if equity > 0.75 && valid.can_raise && rng.next_u32() % 4 == 0 {
            Action::Raise(pot_size_bet(pot, 0.5, valid))
        } else if valid.can_check {
            Action::Check
        } else {
            Action::Call
        }
    }

    fn decide_medium(
        &self,
        equity: f64,
        valid: &ValidActions,
        pot: Chips,
        in_position: bool,
    ) -> Action {
        let odds = pot_odds(valid.call_amount, pot);
        if equity < odds {
            if valid.can_check {
                Action::Check
            } else {
                Action::Fold
            }
        } else if equity > 0.65 && valid.can_raise {
            Action::Raise(pot_size_bet(pot, 0.66, valid))
        } else if equity > 0.5 && in_position && valid.can_raise {
            Action::Raise(pot_size_bet(pot, 0.5, valid))
        } else if valid.can_check {
            Action::Check
        } else {
            Action::Call
        }
    }

    fn decide_hard(
        &self,
        equity: f64,
        valid: &ValidActions,
        pot: Chips,
        in_position: bool,
        rng: &mut dyn RngCore,
    ) -> Action {
        let odds = pot_odds(valid.call_amount, pot);
        let bluff = valid.can_raise && rng.next_u32() % 10 == 0;

        if equity < odds && !bluff {
            if valid.can_check {
                Action::Check
            } else {
                Action::Fold
            }
        } else if (equity > 0.7 || bluff) && valid.can_raise {
            let fraction = if equity > 0.9 { 1.0 } else { 0.75 };
            Action::Raise(pot_size_bet(pot, fraction, valid))
        } else if equity > 0.55 && in_position && valid.can_raise {
            Action::Raise(pot_size_bet(pot, 0.5, valid))
        } else if valid.can_check {
            Action::Check
        } else {
            Action::Call
        }
    }
}

impl BotDecider for HeuristicBot {
    fn decide(
        &self,
        state: &GameState,
        seat: Position,
        valid: &ValidActions,
        difficulty: Difficulty,
        rng: &mut dyn RngCore,
    ) -> Action {
        let player = state.seat(seat);
        let opponents = num_live_opponents(state, seat);
        let eq = equity::estimate(player.hole.as_ref(), &state.board, opponents, difficulty, rng);
        let in_position = is_in_position(state, seat);

        match difficulty {
            Difficulty::Easy => self.decide_easy(eq, valid, state.pot, rng),
            Difficulty::Medium => self.decide_medium(eq, valid, state.pot, in_position),
            Difficulty::Hard => self.decide_hard(eq, valid, state.pot, in_position, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rbp_gameplay::{Seat, Variant};

    fn valid_check(stack: Chips) -> ValidActions {
        ValidActions {
            can_check: true,
            call_amount: 0,
            min_raise: 4,
            max_raise: stack,
            can_raise: true,
            player_stack: stack,
        }
    }

    #[test]
    fn pot_odds_zero_call_is_free() {
        assert_eq!(pot_odds(0, 100), 0.0);
    }

    #[test]
    fn pot_odds_scale_with_call_size() {
        assert!(pot_odds(50, 50) > pot_odds(10, 50));
    }

    #[test]
    fn pot_size_bet_respects_raise_bounds() {
        let valid = ValidActions {
            can_check: false,
            call_amount: 10,
            min_raise: 20,
            max_raise: 40,
            can_raise: true,
            player_stack: 100,
        };
        let bet = pot_size_bet(100, 5.0, &valid);
        assert_eq!(bet, 40);
    }

    #[test]
    fn heuristic_bot_never_panics_on_a_simple_table() {
        let mut state = GameState::new("g1", Variant::NoLimit, 1, 2);
        state.seats.push(Seat::new("p0", "A", 100, false));
        state.seats.push(Seat::new("p1", "B", 100, false));
        let bot = HeuristicBot;
        let mut rng = rand::rngs::SmallRng::seed_from_u64(3);
        let valid = valid_check(100);
        let action = bot.decide(&state, 0, &valid, Difficulty::Easy, &mut rng);
        assert!(matches!(action, Action::Check | Action::Call | Action::Fold | Action::Raise(_)));
    }
}
