use rbp_core::{Chips, Position};
use std::collections::BTreeMap;

/// A pot (main or side) with a fixed amount and the set of seats eligible
/// to win it: exactly the non-folded contributors whose total contribution
/// reached this pot's cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidePot {
    pub amount: Chips,
    pub eligible: Vec<Position>,
}

/// Tracks each seat's total contribution for the current hand and derives
/// side pots from the all-in caps those contributions created.
#[derive(Debug, Clone, Default)]
pub struct PotManager {
    contributions: BTreeMap<Position, Chips>,
    all_in_amounts: BTreeMap<Position, Chips>,
    total: Chips,
}

impl PotManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.contributions.clear();
        self.all_in_amounts.clear();
        self.total = 0;
    }

    pub fn total(&self) -> Chips {
        self.total
    }

    pub fn add_contribution(&mut self, seat: Position, amount: Chips, is_all_in: bool) {
        assert!(amount >= 0, "contribution cannot be negative: {}", amount);
        let entry = self.contributions.entry(seat).or_insert(0);
        *entry += amount;
        self.total += amount;
        if is_all_in {
            self.all_in_amounts.insert(seat, *entry);
        }
    }

    pub fn contribution(&self, seat: Position) -> Chips {
        *self.contributions.get(&seat).unwrap_or(&0)
    }

    /// Computes side pots ordered from the smallest all-in cap up to the
    /// uncapped main pot. `active` is the set of non-folded seats; a
    /// contributor not in `active` still counts toward pot amounts but
    /// never appears in any pot's `eligible` set.
    pub fn calculate_side_pots(&self, active: &[Position]) -> Vec<SidePot> {
        let contributors: BTreeMap<Position, Chips> = self
            .contributions
            .iter()
            .filter(|(_, &amt)| amt > 0)
            .map(|(&pid, &amt)| (pid, amt))
            .collect();
        if contributors.is_empty() {
            return Vec::new();
        }

        let mut all_in_caps: Vec<Chips> = self.all_in_amounts.values().copied().collect();
        all_in_caps.sort_unstable();
        all_in_caps.dedup();

        let mut already_taken: BTreeMap<Position, Chips> =
            contributors.keys().map(|&pid| (pid, 0)).collect();
        let mut pots = Vec::new();

        for cap in all_in_caps {
            let mut amount = 0;
            let mut eligible = Vec::new();
            for (&pid, &contrib) in &contributors {
                let taken = already_taken[&pid];
                let slice = contrib.min(cap) - taken;
                if slice > 0 {
                    amount += slice;
                    *already_taken.get_mut(&pid).unwrap() += slice;
                    if active.contains(&pid) {
                        eligible.push(pid);
                    }
                }
            }
            if amount > 0 {
                pots.push(SidePot { amount, eligible });
            }
        }

        let mut main_amount = 0;
        let mut main_eligible = Vec::new();
        for (&pid, &contrib) in &contributors {
            let leftover = contrib - already_taken[&pid];
            if leftover > 0 {
                main_amount += leftover;
                if active.contains(&pid) {
                    main_eligible.push(pid);
                }
            }
        }
        if main_amount > 0 {
            pots.push(SidePot {
                amount: main_amount,
                eligible: main_eligible,
            });
        }

        pots
    }
}
