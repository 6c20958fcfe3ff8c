//! Preflop and postflop equity estimation. Not tuned or optimized — the
//! core only depends on the shape of this interface, per its own
//! out-of-scope boundary on decision quality.

use super::difficulty::Difficulty;
use rbp_cards::{eval_best, Card, Hole, Rank, Suit};
use rand::seq::SliceRandom;
use rand::RngCore;

/// Chen formula approximate preflop strength, 0-20 (higher is stronger).
pub fn chen_score(hole: &Hole) -> f64 {
    let [a, b] = hole.cards();
    let (hi, lo) = if a.rank() >= b.rank() { (a, b) } else { (b, a) };
    let r1 = u8::from(hi.rank()) as i32 + 2;
    let r2 = u8::from(lo.rank()) as i32 + 2;
    let suited = hi.suit() == lo.suit();
    let gap = r1 - r2;

    if r1 == r2 {
        return (high_card_base(r1) * 2.0).max(5.0);
    }

    let mut score = high_card_base(r1);
    if suited {
        score += 2.0;
    }
    score += gap_penalty(gap);
    if gap <= 1 && r1 <= 11 {
        score += 1.0;
    }
    score.max(0.0)
}

fn high_card_base(rank: i32) -> f64 {
    match rank {
        14 => 10.0,
        13 => 8.0,
        12 => 7.0,
        11 => 6.0,
        r => r as f64 / 2.0,
    }
}

fn gap_penalty(gap: i32) -> f64 {
    match gap {
        0 => 0.0,
        1 => 0.0,
        2 => -1.0,
        3 => -2.0,
        4 => -4.0,
        _ => -5.0,
    }
}

/// Chen score normalized to [0, 1].
pub fn preflop_equity_fast(hole: &Hole) -> f64 {
    (chen_score(hole) / 20.0).min(1.0)
}

fn all_cards() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in Suit::all() {
        for rank in Rank::all() {
            cards.push(Card::from((rank, suit)));
        }
    }
    cards
}

/// Monte Carlo win-equity estimate for `hole` against `num_opponents`
/// uniformly random hands, given the community cards dealt so far. Ties
/// count as half a win.
pub fn monte_carlo_equity(
    hole: &Hole,
    community: &[Card],
    num_opponents: usize,
    simulations: usize,
    rng: &mut dyn RngCore,
) -> f64 {
    let known: std::collections::HashSet<Card> =
        hole.cards().into_iter().chain(community.iter().copied()).collect();
    let mut deck: Vec<Card> = all_cards().into_iter().filter(|c| !known.contains(c)).collect();

    let board_needed = 5 - community.len();
    let mut wins = 0.0;

    for _ in 0..simulations {
        deck.shuffle(&mut RngShim(rng));
        let mut ptr = 0;
        let mut board: Vec<Card> = community.to_vec();
        board.extend_from_slice(&deck[ptr..ptr + board_needed]);
        ptr += board_needed;

        let mut opp_hands: Vec<[Card; 2]> = Vec::with_capacity(num_opponents);
        for _ in 0..num_opponents {
            opp_hands.push([deck[ptr], deck[ptr + 1]]);
            ptr += 2;
        }

        let mut our_cards: Vec<Card> = hole.cards().to_vec();
        our_cards.extend_from_slice(&board);
        let our_score = eval_best(&our_cards);

        let best_opp = opp_hands
            .iter()
            .map(|hand| {
                let mut cards = hand.to_vec();
                cards.extend_from_slice(&board);
                eval_best(&cards)
            })
            .min()
            .expect("at least one opponent");

        if our_score < best_opp {
            wins += 1.0;
        } else if our_score == best_opp {
            wins += 0.5;
        }
    }

    wins / simulations as f64
}

/// Adapts a `&mut dyn RngCore` to `rand::Rng` for `SliceRandom::shuffle`.
struct RngShim<'a>(&'a mut dyn RngCore);
impl rand::RngCore for RngShim<'_> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
}

/// Estimated win equity in [0, 1] given the current street and difficulty.
pub fn estimate(
    hole: Option<&Hole>,
    community: &[Card],
    num_opponents: usize,
    difficulty: Difficulty,
    rng: &mut dyn RngCore,
) -> f64 {
    let Some(hole) = hole else {
        return 0.5;
    };
    let num_opponents = num_opponents.max(1);

    if community.is_empty() {
        return match difficulty {
            Difficulty::Hard => monte_carlo_equity(hole, &[], num_opponents, 1000, rng),
            Difficulty::Medium => preflop_equity_fast(hole),
            Difficulty::Easy => preflop_equity_fast(hole) * 0.9,
        };
    }

    let sims = match difficulty {
        Difficulty::Hard => 1000,
        Difficulty::Medium => 300,
        Difficulty::Easy => 100,
    };
    monte_carlo_equity(hole, community, num_opponents, sims, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn hole(a: (Rank, Suit), b: (Rank, Suit)) -> Hole {
        Hole::from((Card::from(a), Card::from(b)))
    }

    #[test]
    fn pocket_aces_score_high() {
        let h = hole((Rank::Ace, Suit::S), (Rank::Ace, Suit::H));
        assert!(chen_score(&h) >= 10.0);
    }

    #[test]
    fn seven_deuce_offsuit_scores_low() {
        let h = hole((Rank::Seven, Suit::S), (Rank::Two, Suit::H));
        assert!(chen_score(&h) < 5.0);
    }

    #[test]
    fn preflop_equity_fast_is_normalized() {
        let h = hole((Rank::Ace, Suit::S), (Rank::King, Suit::S));
        let e = preflop_equity_fast(&h);
        assert!((0.0..=1.0).contains(&e));
    }

    #[test]
    fn monte_carlo_equity_is_bounded() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        let h = hole((Rank::Ace, Suit::S), (Rank::Ace, Suit::H));
        let e = monte_carlo_equity(&h, &[], 1, 20, &mut rng);
        assert!((0.0..=1.0).contains(&e));
    }
}
