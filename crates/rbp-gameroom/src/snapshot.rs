//! Builds redacted wire-format views from a [`GameState`]. Every function
//! here takes the recipient's player-id explicitly — redaction is decided
//! at the call site, never left to the subscriber.

use rbp_dto::{GameStateView, PlayerView, Reveal, ValidActionsView, MASKED_CARD};
use rbp_gameplay::{GameState, Seat, ValidActions};

fn masked_hole() -> Vec<String> {
    vec![MASKED_CARD.to_string(), MASKED_CARD.to_string()]
}

fn player_view(seat_index: rbp_core::Position, seat: &Seat, recipient: &str, reveal: bool) -> PlayerView {
    let hole = seat.hole.map(|h| {
        if reveal || seat.player_id == recipient {
            h.cards().iter().map(|c| c.to_string()).collect()
        } else {
            masked_hole()
        }
    });
    PlayerView {
        seat: seat_index,
        player_id: seat.player_id.clone(),
        name: seat.name.clone(),
        chips: seat.chips,
        hole,
        bet: seat.bet,
        total_bet: seat.total_bet,
        folded: seat.folded,
        all_in: seat.all_in,
        sitting_out: seat.sitting_out,
        is_bot: seat.is_bot,
    }
}

/// `game_state` snapshot for `recipient`. Never reveals opponent hole
/// cards, even mid-showdown — the `winner` event is the only place those
/// leak, and only for seats that reached it.
pub fn game_state_view(state: &GameState, recipient: &str) -> GameStateView {
    GameStateView {
        game_id: state.game_id.clone(),
        variant: state.variant.to_string(),
        phase: state.phase.label().to_string(),
        players: state
            .seats
            .iter()
            .enumerate()
            .map(|(i, s)| player_view(i, s, recipient, false))
            .collect(),
        community_cards: state.board.iter().map(|c| c.to_string()).collect(),
        pot: state.pot,
        hand_number: state.hand_number,
        dealer_index: state.dealer_index,
        current_player_index: state.current_player_index,
        small_blind: state.small_blind,
        big_blind: state.big_blind,
    }
}

pub fn valid_actions_view(valid: &ValidActions) -> ValidActionsView {
    ValidActionsView {
        can_check: valid.can_check,
        call_amount: valid.call_amount,
        min_raise: valid.min_raise,
        max_raise: valid.max_raise,
        can_raise: valid.can_raise,
    }
}

/// Hole-card reveals for the `winner` event: every seat that reached
/// showdown (never folded) is shown to everyone, seats that folded before
/// showdown are omitted entirely.
pub fn showdown_reveals(state: &GameState, reached_showdown: &[rbp_core::Position]) -> Vec<Reveal> {
    reached_showdown
        .iter()
        .map(|&i| {
            let seat = state.seat(i);
            Reveal {
                seat: i,
                hole: seat.hole.map(|h| h.cards().iter().map(|c| c.to_string()).collect()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbp_cards::{Card, Hole, Rank, Suit};
    use rbp_gameplay::Variant;

    fn state_with_two_seats() -> GameState {
        let mut state = GameState::new("g1", Variant::NoLimit, 1, 2);
        state.seats.push(Seat::new("p0", "Alice", 100, false));
        state.seats.push(Seat::new("p1", "Bob", 100, false));
        state.seats[0].hole = Some(Hole::from((Card::from((Rank::Ace, Suit::S)), Card::from((Rank::Ace, Suit::H)))));
        state.seats[1].hole = Some(Hole::from((Card::from((Rank::Two, Suit::C)), Card::from((Rank::Three, Suit::D)))));
        state
    }

    #[test]
    fn recipient_sees_their_own_hole_cards() {
        let state = state_with_two_seats();
        let view = game_state_view(&state, "p0");
        assert_eq!(view.players[0].hole, Some(vec!["As".to_string(), "Ah".to_string()]));
    }

    #[test]
    fn recipient_never_sees_opponent_hole_cards() {
        let state = state_with_two_seats();
        let view = game_state_view(&state, "p0");
        assert_eq!(view.players[1].hole, Some(masked_hole()));
    }

    #[test]
    fn showdown_reveals_only_named_seats() {
        let state = state_with_two_seats();
        let reveals = showdown_reveals(&state, &[0]);
        assert_eq!(reveals.len(), 1);
        assert_eq!(reveals[0].seat, 0);
        assert!(reveals[0].hole.is_some());
    }
}
