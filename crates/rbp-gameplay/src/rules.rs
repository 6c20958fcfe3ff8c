//! Blind posting, dealer rotation, and first-to-act derivation.

use super::pot::PotManager;
use super::state::GameState;
use rbp_core::Position;

/// Index of the next seat, from `from_index` exclusive, that is neither
/// sitting out nor busted. Returns `None` if no such seat exists.
pub fn next_active_seat(state: &GameState, from_index: Position) -> Option<Position> {
    let n = state.seats.len();
    for offset in 1..=n {
        let idx = (from_index + offset) % n;
        let seat = state.seat(idx);
        if !seat.sitting_out && seat.chips > 0 {
            return Some(idx);
        }
    }
    None
}

/// Moves the dealer button to the next valid seat, returning it. Leaves
/// the button unchanged if no seat qualifies (e.g. only one seat left).
pub fn advance_dealer(state: &mut GameState) -> Position {
    match next_active_seat(state, state.dealer_index) {
        Some(next) => {
            state.dealer_index = next;
            next
        }
        None => state.dealer_index,
    }
}

/// (small_blind_seat, big_blind_seat) for the current dealer. Heads-up
/// rule: with exactly two active seats the dealer posts small blind.
pub fn blind_indices(state: &GameState) -> (Position, Position) {
    let n_active = state
        .seats
        .iter()
        .filter(|s| !s.sitting_out && s.chips > 0)
        .count();
    let sb = if n_active == 2 {
        state.dealer_index
    } else {
        next_active_seat(state, state.dealer_index).unwrap_or(state.dealer_index)
    };
    let bb = next_active_seat(state, sb).unwrap_or(sb);
    (sb, bb)
}

/// Posts small and big blinds, capping each at the poster's stack and
/// marking them all-in if it empties their stack. Returns the amounts
/// actually posted.
pub fn post_blinds(state: &mut GameState, pot: &mut PotManager) -> (rbp_core::Chips, rbp_core::Chips) {
    let (sb_idx, bb_idx) = blind_indices(state);

    let sb_amount = state.small_blind.min(state.seat(sb_idx).chips);
    {
        let sb = state.seat_mut(sb_idx);
        sb.chips -= sb_amount;
        sb.bet = sb_amount;
        sb.total_bet = sb_amount;
        if sb.chips == 0 {
            sb.all_in = true;
        }
    }

    let bb_amount = state.big_blind.min(state.seat(bb_idx).chips);
    {
        let bb = state.seat_mut(bb_idx);
        bb.chips -= bb_amount;
        bb.bet = bb_amount;
        bb.total_bet = bb_amount;
        if bb.chips == 0 {
            bb.all_in = true;
        }
    }

    state.pot += sb_amount + bb_amount;
    pot.add_contribution(sb_idx, sb_amount, state.seat(sb_idx).all_in);
    pot.add_contribution(bb_idx, bb_amount, state.seat(bb_idx).all_in);

    (sb_amount, bb_amount)
}

/// First to act preflop: the seat after the big blind (under the gun).
pub fn first_to_act_preflop(state: &GameState) -> Option<Position> {
    let (_, bb) = blind_indices(state);
    next_active_seat(state, bb)
}

/// First to act postflop: the first active seat left of the dealer.
pub fn first_to_act_postflop(state: &GameState) -> Option<Position> {
    next_active_seat(state, state.dealer_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::Seat;
    use crate::variant::Variant;

    fn three_handed() -> GameState {
        let mut state = GameState::new("g1", Variant::NoLimit, 1, 2);
        state.seats.push(Seat::new("p0", "A", 100, false));
        state.seats.push(Seat::new("p1", "B", 100, false));
        state.seats.push(Seat::new("p2", "C", 100, false));
        state
    }

    #[test]
    fn three_handed_blinds_are_left_of_dealer() {
        let state = three_handed();
        let (sb, bb) = blind_indices(&state);
        assert_eq!(sb, 1);
        assert_eq!(bb, 2);
    }

    #[test]
    fn heads_up_dealer_posts_small_blind() {
        let mut state = three_handed();
        state.seats.pop();
        let (sb, bb) = blind_indices(&state);
        assert_eq!(sb, 0);
        assert_eq!(bb, 1);
    }

    #[test]
    fn blinds_capped_at_short_stack() {
        let mut state = three_handed();
        state.seats[1].chips = 1; // smaller than small_blind's usual 1? use big blind cap below
        let mut pot = PotManager::new();
        let (sb_amt, _) = post_blinds(&mut state, &mut pot);
        assert_eq!(sb_amt, 1);
        assert!(state.seat(1).all_in);
    }

    /// A seat with only 5 chips posting big blind (usual blind 2) posts
    /// all 5 and goes all-in; the pot ledger caps its contribution at 5.
    #[test]
    fn short_stacked_big_blind_posts_its_whole_stack() {
        let mut state = three_handed();
        state.seats[2].chips = 5;
        let mut pot = PotManager::new();
        let (_, bb_amt) = post_blinds(&mut state, &mut pot);
        assert_eq!(bb_amt, 5);
        assert!(state.seat(2).all_in);
        assert_eq!(state.seat(2).chips, 0);
        assert_eq!(pot.contribution(2), 5);
    }

    #[test]
    fn first_to_act_preflop_is_under_the_gun() {
        let state = three_handed();
        assert_eq!(first_to_act_preflop(&state), Some(0));
    }

    #[test]
    fn first_to_act_postflop_is_left_of_dealer() {
        let state = three_handed();
        assert_eq!(first_to_act_postflop(&state), Some(1));
    }
}
