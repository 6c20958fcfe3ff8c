//! Cactus-Kev 7-card hand evaluator.
//!
//! Scores run 1 (royal flush) to 7462 (7-high); lower is strictly better.
//! Tables are built once behind a [`std::sync::OnceLock`] and looked up by
//! prime product (non-flush hands) or rank bitmask (flush hands), exactly
//! the scheme described in Cactus Kev's original writeup.

use super::card::Card;
use std::collections::HashMap;
use std::sync::OnceLock;

/// The nine standard poker hand categories, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandClass {
    StraightFlush,
    FourOfAKind,
    FullHouse,
    Flush,
    Straight,
    ThreeOfAKind,
    TwoPair,
    OnePair,
    HighCard,
}

impl HandClass {
    pub fn name(&self) -> &'static str {
        match self {
            HandClass::StraightFlush => "Straight Flush",
            HandClass::FourOfAKind => "Four of a Kind",
            HandClass::FullHouse => "Full House",
            HandClass::Flush => "Flush",
            HandClass::Straight => "Straight",
            HandClass::ThreeOfAKind => "Three of a Kind",
            HandClass::TwoPair => "Two Pair",
            HandClass::OnePair => "One Pair",
            HandClass::HighCard => "High Card",
        }
    }
}

/// Score → class, by the half-open boundary ranges pinned in the evaluator
/// contract: [1,10] [11,166] [167,322] [323,1599] [1600,1609] [1610,2467]
/// [2468,3325] [3326,6185] [6186,7462].
pub fn hand_class(score: u16) -> HandClass {
    match score {
        1..=10 => HandClass::StraightFlush,
        11..=166 => HandClass::FourOfAKind,
        167..=322 => HandClass::FullHouse,
        323..=1599 => HandClass::Flush,
        1600..=1609 => HandClass::Straight,
        1610..=2467 => HandClass::ThreeOfAKind,
        2468..=3325 => HandClass::TwoPair,
        3326..=6185 => HandClass::OnePair,
        _ => HandClass::HighCard,
    }
}

struct Tables {
    flush_table: HashMap<u32, u16>,
    unique5_table: HashMap<u32, u16>,
    pairs_table: HashMap<u32, u16>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

const RANKS_DESC: [u32; 13] = [14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2];
const PRIMES: [u32; 15] = [0, 0, 2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

fn prime(rank: u32) -> u32 {
    PRIMES[rank as usize]
}

fn rank_bits(ranks: &[u32]) -> u32 {
    ranks.iter().fold(0u32, |acc, r| acc | (1 << (r - 2)))
}

fn prime_product(ranks: &[u32]) -> u32 {
    ranks.iter().fold(1u32, |acc, r| acc * prime(*r))
}

/// The ten straight-rank-sets, best to worst, with the wheel (A-2-3-4-5)
/// last since its ace plays low.
fn straight_rank_sets() -> Vec<[u32; 5]> {
    let mut sets: Vec<[u32; 5]> = (0..=8)
        .map(|i| {
            let top = 14 - i;
            [top, top - 1, top - 2, top - 3, top - 4]
        })
        .collect();
    sets.push([5, 4, 3, 2, 14]);
    sets
}

fn combinations_5(ranks: &[u32]) -> Vec<[u32; 5]> {
    let mut out = Vec::new();
    let n = ranks.len();
    for a in 0..n {
        for b in (a + 1)..n {
            for c in (b + 1)..n {
                for d in (c + 1)..n {
                    for e in (d + 1)..n {
                        out.push([ranks[a], ranks[b], ranks[c], ranks[d], ranks[e]]);
                    }
                }
            }
        }
    }
    out
}

fn build_tables() -> Tables {
    let mut flush_table = HashMap::new();
    let mut unique5_table = HashMap::new();
    let mut pairs_table = HashMap::new();
    let mut score: u16 = 1;

    let straights = straight_rank_sets();

    // Straight flushes: 1-10
    for hand in &straights {
        flush_table.insert(rank_bits(hand), score);
        score += 1;
    }

    // Four of a kind: 11-166
    for &quad in RANKS_DESC.iter() {
        for &kicker in RANKS_DESC.iter() {
            if kicker == quad {
                continue;
            }
            let pp = prime_product(&[quad, quad, quad, quad, kicker]);
            pairs_table.insert(pp, score);
            score += 1;
        }
    }

    // Full house: 167-322
    for &trips in RANKS_DESC.iter() {
        for &pair in RANKS_DESC.iter() {
            if pair == trips {
                continue;
            }
            let pp = prime_product(&[trips, trips, trips, pair, pair]);
            pairs_table.insert(pp, score);
            score += 1;
        }
    }

    // All 5-rank combos (C(13,5) = 1287), minus the straight sets, in
    // descending order — these back both the flush and high-card tables.
    let straight_sets: Vec<std::collections::BTreeSet<u32>> = straights
        .iter()
        .map(|s| s.iter().copied().collect())
        .collect();
    let all_combos = combinations_5(&RANKS_DESC);
    let flush_hands: Vec<[u32; 5]> = all_combos
        .into_iter()
        .filter(|c| {
            let set: std::collections::BTreeSet<u32> = c.iter().copied().collect();
            !straight_sets.contains(&set)
        })
        .collect();

    // Flushes: 323-1599
    for hand in &flush_hands {
        flush_table.insert(rank_bits(hand), score);
        score += 1;
    }

    // Straights: 1600-1609
    for hand in &straights {
        let pp = prime_product(hand);
        unique5_table.insert(pp, score);
        score += 1;
    }

    // Three of a kind: 1610-2467
    for &trips in RANKS_DESC.iter() {
        let kickers: Vec<u32> = RANKS_DESC.iter().copied().filter(|&r| r != trips).collect();
        for i in 0..kickers.len() {
            for j in (i + 1)..kickers.len() {
                let pp = prime_product(&[trips, trips, trips, kickers[i], kickers[j]]);
                pairs_table.insert(pp, score);
                score += 1;
            }
        }
    }

    // Two pair: 2468-3325
    for (pi, &p1) in RANKS_DESC.iter().enumerate() {
        for &p2 in RANKS_DESC.iter().skip(pi + 1) {
            let kickers: Vec<u32> = RANKS_DESC
                .iter()
                .copied()
                .filter(|&r| r != p1 && r != p2)
                .collect();
            for k in kickers {
                let pp = prime_product(&[p1, p1, p2, p2, k]);
                pairs_table.insert(pp, score);
                score += 1;
            }
        }
    }

    // One pair: 3326-6185
    for &pair in RANKS_DESC.iter() {
        let kickers: Vec<u32> = RANKS_DESC.iter().copied().filter(|&r| r != pair).collect();
        for i in 0..kickers.len() {
            for j in (i + 1)..kickers.len() {
                for k in (j + 1)..kickers.len() {
                    let pp = prime_product(&[pair, pair, kickers[i], kickers[j], kickers[k]]);
                    pairs_table.insert(pp, score);
                    score += 1;
                }
            }
        }
    }

    // High card: 6186-7462
    for hand in &flush_hands {
        let pp = prime_product(hand);
        unique5_table.insert(pp, score);
        score += 1;
    }

    Tables {
        flush_table,
        unique5_table,
        pairs_table,
    }
}

fn tables() -> &'static Tables {
    TABLES.get_or_init(build_tables)
}

fn eval_5_ints(ints: [u32; 5]) -> u16 {
    let suit_mask = 0xF000u32;
    let suit0 = ints[0] & suit_mask;
    if ints[1..].iter().all(|c| c & suit_mask == suit0) {
        let rank_bits = (ints.iter().fold(0u32, |acc, c| acc | c) >> 16) & 0x1FFF;
        return *tables()
            .flush_table
            .get(&rank_bits)
            .expect("flush rank bitmask missing from table");
    }
    let pp = ints.iter().fold(1u32, |acc, c| acc * (c & 0x3F));
    if let Some(score) = tables().unique5_table.get(&pp) {
        return *score;
    }
    *tables()
        .pairs_table
        .get(&pp)
        .expect("prime product missing from pairs table")
}

fn combinations_k<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    fn go<T: Copy>(items: &[T], k: usize, start: usize, acc: &mut Vec<T>, out: &mut Vec<Vec<T>>) {
        if acc.len() == k {
            out.push(acc.clone());
            return;
        }
        for i in start..items.len() {
            acc.push(items[i]);
            go(items, k, i + 1, acc, out);
            acc.pop();
        }
    }
    let mut out = Vec::new();
    go(items, k, 0, &mut Vec::new(), &mut out);
    out
}

/// Evaluates an exact 5-card hand. Panics if `cards.len() != 5`.
pub fn eval_5(cards: &[Card]) -> u16 {
    assert_eq!(cards.len(), 5, "eval_5 requires exactly 5 cards");
    let ints: Vec<u32> = cards.iter().map(Card::cactus_kev).collect();
    eval_5_ints([ints[0], ints[1], ints[2], ints[3], ints[4]])
}

/// Evaluates the best 5-card hand out of 5, 6, or 7 cards.
/// Panics if given fewer than 5 or more than 7 cards.
pub fn eval_best(cards: &[Card]) -> u16 {
    match cards.len() {
        5 => eval_5(cards),
        6 | 7 => combinations_k(cards, 5)
            .into_iter()
            .map(|combo| eval_5(&combo))
            .min()
            .expect("at least one 5-card combination exists"),
        n => panic!("eval_best requires 5-7 cards, got {}", n),
    }
}
