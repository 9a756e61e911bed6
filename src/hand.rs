use serde::{Deserialize, Serialize};

use crate::deck::Card;

pub const BUST_LIMIT: u32 = 21;

/// How card ranks add up to a hand total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scoring {
    /// Faces count 10, aces 11 unless that busts the hand.
    #[default]
    Standard,
    /// Plain sum of ranks.
    RawRanks,
}

pub fn card_value(card: Card, scoring: Scoring) -> u32 {
    match (scoring, card.rank()) {
        (Scoring::RawRanks, rank) => rank as u32,
        (Scoring::Standard, 1) => 11,
        (Scoring::Standard, 11..=13) => 10,
        (Scoring::Standard, rank) => rank as u32,
    }
}

/// Returns the total and whether an ace is still counted as 11.
pub fn hand_value(cards: &[Card], scoring: Scoring) -> (u32, bool) {
    let mut total = 0;
    let mut aces = 0;

    for &card in cards {
        total += card_value(card, scoring);
        if scoring == Scoring::Standard && card.rank() == 1 {
            aces += 1;
        }
    }

    while total > BUST_LIMIT && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    (total, aces > 0)
}

pub fn score(cards: &[Card], scoring: Scoring) -> u32 {
    hand_value(cards, scoring).0
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn score(&self, scoring: Scoring) -> u32 {
        score(&self.cards, scoring)
    }

    pub fn is_soft(&self, scoring: Scoring) -> bool {
        hand_value(&self.cards, scoring).1
    }

    pub fn is_bust(&self, scoring: Scoring) -> bool {
        self.score(scoring) > BUST_LIMIT
    }

    pub fn is_blackjack(&self, scoring: Scoring) -> bool {
        self.cards.len() == 2 && self.score(scoring) == BUST_LIMIT
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Hand { cards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(ranks: &[u8]) -> Vec<Card> {
        ranks.iter().map(|&r| Card::new(r).unwrap()).collect()
    }

    #[test]
    fn standard_faces_count_ten() {
        assert_eq!(score(&cards(&[11, 12]), Scoring::Standard), 20);
        assert_eq!(score(&cards(&[13, 9]), Scoring::Standard), 19);
    }

    #[test]
    fn standard_aces_soften_to_avoid_bust() {
        assert_eq!(hand_value(&cards(&[1, 6]), Scoring::Standard), (17, true));
        assert_eq!(hand_value(&cards(&[1, 6, 10]), Scoring::Standard), (17, false));
        assert_eq!(score(&cards(&[1, 1]), Scoring::Standard), 12);
        assert_eq!(score(&cards(&[1, 1, 1, 1, 13]), Scoring::Standard), 14);
    }

    #[test]
    fn raw_ranks_sum_face_values() {
        assert_eq!(score(&cards(&[1, 13]), Scoring::RawRanks), 14);
        assert_eq!(score(&cards(&[12, 11]), Scoring::RawRanks), 23);
        assert!(!Hand::from(cards(&[1, 5])).is_soft(Scoring::RawRanks));
    }

    #[test]
    fn score_ignores_card_order() {
        let hand = cards(&[1, 7, 13, 1, 2]);
        let mut reversed = hand.clone();
        reversed.reverse();
        let mut sorted = hand.clone();
        sorted.sort();
        for scoring in [Scoring::Standard, Scoring::RawRanks] {
            assert_eq!(score(&hand, scoring), score(&reversed, scoring));
            assert_eq!(score(&hand, scoring), score(&sorted, scoring));
        }
    }

    #[test]
    fn bust_and_blackjack() {
        let natural = Hand::from(cards(&[1, 12]));
        assert!(natural.is_blackjack(Scoring::Standard));
        assert!(!natural.is_blackjack(Scoring::RawRanks));

        let busted = Hand::from(cards(&[10, 9, 5]));
        assert!(busted.is_bust(Scoring::Standard));
        assert!(busted.is_bust(Scoring::RawRanks));
        assert!(Hand::new().score(Scoring::Standard) == 0);
    }
}
