use super::phase::Phase;
use super::pot::PotManager;
use super::state::GameState;
use super::variant::Variant;
use rbp_core::{Chips, Position};
use std::collections::HashSet;

/// A legal or attempted betting action. `Raise` and `Shove` carry the
/// *total* bet amount a seat will have in front of it after the action,
/// not the incremental chips added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
    Shove,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call => write!(f, "call"),
            Action::Raise(total) => write!(f, "raise {}", total),
            Action::Shove => write!(f, "shove"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BettingResult {
    Continue,
    RoundComplete,
    AllFolded,
}

/// Actions a seat may legally submit right now.
#[derive(Debug, Clone, Copy)]
pub struct ValidActions {
    pub can_check: bool,
    pub call_amount: Chips,
    pub min_raise: Chips,
    pub max_raise: Chips,
    pub can_raise: bool,
    pub player_stack: Chips,
}

/// Fixed-limit caps the number of raises per street.
const FLHE_MAX_RAISES: usize = 4;

/// Drives one street's worth of betting. Holds no reference to
/// [`GameState`] — every method takes it explicitly, so a round can be
/// paused across an `await` point without fighting the borrow checker.
#[derive(Debug, Clone)]
pub struct BettingRound {
    phase: Phase,
    num_raises: usize,
    last_raise_size: Chips,
    current_bet: Chips,
    acted: HashSet<Position>,
    fixed_bet: Chips,
}

impl BettingRound {
    pub fn new(state: &mut GameState, start: Position, phase: Phase) -> Self {
        let n = state.seats.len();
        let mut idx = start;
        let mut first_actionable = None;
        for _ in 0..n {
            let seat = state.seat(idx);
            if !seat.folded && !seat.all_in && !seat.sitting_out {
                first_actionable = Some(idx);
                break;
            }
            idx = (idx + 1) % n;
        }
        state.current_player_index = first_actionable;
        let current_bet = state.seats.iter().map(|s| s.bet).max().unwrap_or(0);
        let fixed_bet = match state.variant {
            Variant::FixedLimit => match phase {
                Phase::Preflop | Phase::Flop => state.big_blind,
                _ => state.big_blind * 2,
            },
            Variant::NoLimit => 0,
        };
        Self {
            phase,
            num_raises: 0,
            last_raise_size: state.big_blind,
            current_bet,
            acted: HashSet::new(),
            fixed_bet,
        }
    }

    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    /// Whether the round is already decided before anyone acts — e.g.
    /// every seat but one folded or went all-in before this street began.
    pub fn status(&self, state: &GameState) -> BettingResult {
        self.check_round_complete(state)
    }

    pub fn next_to_act(&self, state: &GameState) -> Option<Position> {
        let idx = state.current_player_index?;
        let seat = state.seat(idx);
        if seat.folded || seat.all_in || seat.sitting_out {
            None
        } else {
            Some(idx)
        }
    }

    pub fn valid_actions(&self, state: &GameState, seat: Position) -> ValidActions {
        let player = state.seat(seat);
        let call_amount = (self.current_bet - player.bet).max(0).min(player.chips);
        let can_check = call_amount == 0;

        match state.variant {
            Variant::NoLimit => {
                let min_raise_increment = self.last_raise_size.max(state.big_blind);
                let min_raise = self.current_bet + min_raise_increment;
                let max_raise = player.chips + player.bet;
                let can_raise = player.chips > call_amount;
                ValidActions {
                    can_check,
                    call_amount,
                    min_raise,
                    max_raise,
                    can_raise,
                    player_stack: player.chips,
                }
            }
            Variant::FixedLimit => {
                let min_raise = self.current_bet + self.fixed_bet;
                let max_raise = min_raise;
                let can_raise = self.num_raises < FLHE_MAX_RAISES && player.chips > call_amount;
                ValidActions {
                    can_check,
                    call_amount,
                    min_raise,
                    max_raise,
                    can_raise,
                    player_stack: player.chips,
                }
            }
        }
    }

    /// Applies an action from `seat`, mutating `state` and `pot` in place.
    /// Panics if `seat` attempts an illegal `Check` or `Raise` — the caller
    /// (the orchestrator) is responsible for validating against
    /// [`Self::valid_actions`] before calling this, per the engine's
    /// contract that illegal submissions never reach here.
    pub fn apply(
        &mut self,
        state: &mut GameState,
        pot: &mut PotManager,
        seat: Position,
        action: Action,
    ) -> BettingResult {
        let valid = self.valid_actions(state, seat);

        match action {
            Action::Fold => {
                state.seat_mut(seat).folded = true;
                self.acted.insert(seat);
            }
            Action::Check => {
                assert!(valid.can_check, "seat {} cannot check, must call {}", seat, valid.call_amount);
                self.acted.insert(seat);
            }
            Action::Call => {
                let amount = valid.call_amount;
                let player = state.seat_mut(seat);
                let actual = amount.min(player.chips);
                player.chips -= actual;
                player.bet += actual;
                player.total_bet += actual;
                let all_in = player.chips == 0;
                if all_in {
                    player.all_in = true;
                }
                state.pot += actual;
                pot.add_contribution(seat, actual, all_in);
                self.acted.insert(seat);
            }
            Action::Raise(_) | Action::Shove => {
                assert!(
                    valid.can_raise || matches!(action, Action::Shove),
                    "seat {} cannot raise",
                    seat
                );
                let player_chips_plus_bet = state.seat(seat).chips + state.seat(seat).bet;
                let mut total_bet = match action {
                    Action::Shove => player_chips_plus_bet,
                    Action::Raise(_) if state.variant == Variant::FixedLimit => {
                        self.current_bet + self.fixed_bet
                    }
                    Action::Raise(total) => total,
                    _ => unreachable!(),
                };
                total_bet = total_bet.max(valid.min_raise);
                total_bet = total_bet.min(player_chips_plus_bet);

                // An all-in that doesn't reach `current_bet` is really a
                // capped call; one that reaches it but not `min_raise`
                // raises the amount others must call without reopening
                // the betting to seats who already acted.
                let old_current_bet = self.current_bet;
                let reopens_call_amount = total_bet > old_current_bet;
                let is_full_raise = total_bet >= valid.min_raise;

                let player = state.seat_mut(seat);
                let chips_to_add = (total_bet - player.bet).min(player.chips);
                player.chips -= chips_to_add;
                player.bet += chips_to_add;
                player.total_bet += chips_to_add;
                let all_in = player.chips == 0;
                if all_in {
                    player.all_in = true;
                }
                state.pot += chips_to_add;
                pot.add_contribution(seat, chips_to_add, all_in);

                if reopens_call_amount {
                    self.current_bet = total_bet;
                }
                if is_full_raise {
                    self.last_raise_size = total_bet - old_current_bet;
                    self.num_raises += 1;
                    self.acted.clear();
                }
                self.acted.insert(seat);
            }
        }

        self.advance(state);
        self.check_round_complete(state)
    }

    fn advance(&self, state: &mut GameState) {
        let n = state.seats.len();
        let mut idx = state.current_player_index.unwrap_or(0);
        for _ in 0..n {
            idx = (idx + 1) % n;
            let seat = state.seat(idx);
            if !seat.folded && !seat.all_in && !seat.sitting_out {
                state.current_player_index = Some(idx);
                return;
            }
        }
        state.current_player_index = None;
    }

    fn check_round_complete(&self, state: &GameState) -> BettingResult {
        let active: Vec<Position> = state
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.folded && !s.sitting_out)
            .map(|(i, _)| i)
            .collect();

        if active.len() <= 1 {
            return BettingResult::AllFolded;
        }

        let can_act: Vec<Position> = active
            .iter()
            .copied()
            .filter(|&i| !state.seat(i).all_in)
            .collect();
        if can_act.is_empty() {
            return BettingResult::RoundComplete;
        }

        for pos in can_act {
            let seat = state.seat(pos);
            if !self.acted.contains(&pos) || seat.bet < self.current_bet {
                return BettingResult::Continue;
            }
        }
        BettingResult::RoundComplete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::Seat;

    fn heads_up_state(variant: Variant) -> GameState {
        let mut state = GameState::new("g1", variant, 1, 2);
        state.seats.push(Seat::new("p0", "A", 100, false));
        state.seats.push(Seat::new("p1", "B", 100, false));
        state.seats[0].bet = 1;
        state.seats[0].total_bet = 1;
        state.seats[1].bet = 2;
        state.seats[1].total_bet = 2;
        state.pot = 3;
        state
    }

    #[test]
    fn can_check_when_no_bet_outstanding() {
        let mut state = heads_up_state(Variant::NoLimit);
        state.seats[0].bet = 2;
        let round = BettingRound::new(&mut state, 0, Phase::Preflop);
        let valid = round.valid_actions(&state, 0);
        assert!(valid.can_check);
        assert_eq!(valid.call_amount, 0);
    }

    #[test]
    fn must_call_when_behind_current_bet() {
        let mut state = heads_up_state(Variant::NoLimit);
        let round = BettingRound::new(&mut state, 0, Phase::Preflop);
        let valid = round.valid_actions(&state, 0);
        assert!(!valid.can_check);
        assert_eq!(valid.call_amount, 1);
    }

    #[test]
    fn nlhe_min_raise_is_big_blind_by_default() {
        let mut state = heads_up_state(Variant::NoLimit);
        let round = BettingRound::new(&mut state, 0, Phase::Preflop);
        let valid = round.valid_actions(&state, 0);
        // current_bet=2, last_raise_size defaults to big_blind=2
        assert_eq!(valid.min_raise, 4);
    }

    #[test]
    fn flhe_raise_cap_after_four_raises() {
        let mut state = heads_up_state(Variant::FixedLimit);
        let mut pot = PotManager::new();
        let mut round = BettingRound::new(&mut state, 0, Phase::Preflop);
        for _ in 0..FLHE_MAX_RAISES {
            round.apply(&mut state, &mut pot, 0, Action::Raise(0));
            state.current_player_index = Some(0);
        }
        let valid = round.valid_actions(&state, 0);
        assert!(!valid.can_raise);
    }

    #[test]
    fn call_amount_capped_at_stack() {
        let mut state = heads_up_state(Variant::NoLimit);
        state.seats[0].chips = 0;
        state.seats[0].bet = 1;
        let round = BettingRound::new(&mut state, 0, Phase::Preflop);
        let valid = round.valid_actions(&state, 0);
        assert_eq!(valid.call_amount, 0);
        assert!(valid.can_check);
    }

    #[test]
    fn fold_leaves_one_player_and_ends_hand() {
        let mut state = heads_up_state(Variant::NoLimit);
        let mut pot = PotManager::new();
        let mut round = BettingRound::new(&mut state, 0, Phase::Preflop);
        let result = round.apply(&mut state, &mut pot, 0, Action::Fold);
        assert_eq!(result, BettingResult::AllFolded);
        assert!(state.seat(0).folded);
    }

    #[test]
    fn raise_resets_who_has_acted() {
        let mut state = heads_up_state(Variant::NoLimit);
        let mut pot = PotManager::new();
        let mut round = BettingRound::new(&mut state, 0, Phase::Preflop);
        let result = round.apply(&mut state, &mut pot, 0, Action::Raise(10));
        assert_eq!(result, BettingResult::Continue);
        assert_eq!(state.seat(0).bet, 10);
    }

    /// p0 (dealer), p1, p2 start with 1000 each, blinds 10/20. p1 posts
    /// 10, p2 posts 20, p0 folds, p1 folds: p2 takes the 30-chip pot
    /// uncontested.
    #[test]
    fn all_fold_preflop_leaves_the_blinds_with_the_lone_survivor() {
        let mut state = GameState::new("g1", Variant::NoLimit, 10, 20);
        state.seats.push(Seat::new("p0", "A", 1000, false));
        state.seats.push(Seat::new("p1", "B", 1000, false));
        state.seats.push(Seat::new("p2", "C", 1000, false));
        let mut pot = PotManager::new();
        crate::rules::post_blinds(&mut state, &mut pot);
        assert_eq!(state.pot, 30);

        let start = crate::rules::first_to_act_preflop(&state).unwrap();
        assert_eq!(start, 0);
        let mut round = BettingRound::new(&mut state, start, Phase::Preflop);
        assert_eq!(round.apply(&mut state, &mut pot, 0, Action::Fold), BettingResult::Continue);
        let result = round.apply(&mut state, &mut pot, 1, Action::Fold);
        assert_eq!(result, BettingResult::AllFolded);

        // Uncontested award: sole non-folded seat takes the whole pot.
        let survivor = state.seats.iter().position(|s| !s.folded).unwrap();
        assert_eq!(survivor, 2);
        state.seats[survivor].chips += state.pot;
        assert_eq!(state.seat(0).chips, 1000);
        assert_eq!(state.seat(1).chips, 990);
        assert_eq!(state.seat(2).chips, 1010);
    }

    #[test]
    fn shove_commits_entire_stack() {
        let mut state = heads_up_state(Variant::NoLimit);
        let mut pot = PotManager::new();
        let mut round = BettingRound::new(&mut state, 0, Phase::Preflop);
        round.apply(&mut state, &mut pot, 0, Action::Shove);
        assert_eq!(state.seat(0).chips, 0);
        assert!(state.seat(0).all_in);
        assert_eq!(state.seat(0).bet, 101);
    }
}
