use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;
use rand::seq::SliceRandom;

/// A standard 52-card deck, dealt from the top down after a shuffle.
#[derive(Debug, Clone)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// A freshly ordered, unshuffled deck.
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::all() {
            for rank in Rank::all() {
                cards.push(Card::from((rank, suit)));
            }
        }
        Self(cards)
    }

    /// Resets to a full unshuffled deck, discarding whatever was dealt.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        self.0.shuffle(rng);
    }

    /// Removes and returns the top card. Panics if the deck is empty,
    /// matching the invariant that callers never over-deal a hand.
    pub fn deal_one(&mut self) -> Card {
        self.0.pop().expect("deck exhausted")
    }

    pub fn deal(&mut self, n: usize) -> Vec<Card> {
        (0..n).map(|_| self.deal_one()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn fresh_deck_has_52_distinct_cards() {
        let deck = Deck::new();
        let set: std::collections::HashSet<Card> = deck.0.iter().copied().collect();
        assert_eq!(set.len(), 52);
    }

    #[test]
    fn deal_shrinks_deck() {
        let mut deck = Deck::new();
        let dealt = deck.deal(9 * 2 + 5);
        assert_eq!(dealt.len(), 23);
        assert_eq!(deck.len(), 52 - 23);
    }

    #[test]
    fn shuffle_preserves_card_set() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let mut deck = Deck::new();
        let before: std::collections::HashSet<Card> = deck.0.iter().copied().collect();
        deck.shuffle(&mut rng);
        let after: std::collections::HashSet<Card> = deck.0.iter().copied().collect();
        assert_eq!(before, after);
    }
}
