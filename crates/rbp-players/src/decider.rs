use super::difficulty::Difficulty;
use rand::RngCore;
use rbp_gameplay::{Action, GameState, ValidActions};
use rbp_core::Position;

/// A pure, stateless policy: given the table state and the legal action
/// envelope for one seat, returns the action that seat takes. Implementors
/// must not retain any memory of prior decisions between calls — the core
/// owns all persistent state.
pub trait BotDecider: Send + Sync {
    fn decide(
        &self,
        state: &GameState,
        seat: Position,
        valid: &ValidActions,
        difficulty: Difficulty,
        rng: &mut dyn RngCore,
    ) -> Action;
}

/// The core's final say on a decider's output, applied regardless of which
/// [`BotDecider`] produced it: an amount can never exceed what the seat can
/// put in, and a too-small raise degrades to a call.
pub fn apply_safety_clamps(seat_chips: rbp_core::Chips, seat_bet: rbp_core::Chips, valid: &ValidActions, action: Action) -> Action {
    match action {
        Action::Raise(amount) => {
            let capped = amount.min(seat_chips + seat_bet);
            if capped <= valid.call_amount {
                Action::Call
            } else {
                Action::Raise(capped)
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(call_amount: rbp_core::Chips) -> ValidActions {
        ValidActions {
            can_check: call_amount == 0,
            call_amount,
            min_raise: call_amount + 2,
            max_raise: 1000,
            can_raise: true,
            player_stack: 100,
        }
    }

    #[test]
    fn raise_amount_clamped_to_stack() {
        let v = valid(10);
        let clamped = apply_safety_clamps(50, 10, &v, Action::Raise(1000));
        assert_eq!(clamped, Action::Raise(60));
    }

    #[test]
    fn undersized_raise_becomes_call() {
        let v = valid(10);
        let clamped = apply_safety_clamps(50, 10, &v, Action::Raise(5));
        assert_eq!(clamped, Action::Call);
    }

    #[test]
    fn non_raise_actions_pass_through() {
        let v = valid(0);
        assert_eq!(apply_safety_clamps(50, 0, &v, Action::Check), Action::Check);
        assert_eq!(apply_safety_clamps(50, 0, &v, Action::Fold), Action::Fold);
    }
}
