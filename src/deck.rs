use std::fmt;

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

const RANKS: u8 = 13;
const COPIES: usize = 4;
pub const DECK_SIZE: usize = RANKS as usize * COPIES;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Card(u8);

impl Card {
    pub fn new(rank: u8) -> Result<Self, DeckError> {
        if (1..=RANKS).contains(&rank) {
            Ok(Card(rank))
        } else {
            Err(DeckError::InvalidRank(rank))
        }
    }

    pub fn rank(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "A",
            2 => "2",
            3 => "3",
            4 => "4",
            5 => "5",
            6 => "6",
            7 => "7",
            8 => "8",
            9 => "9",
            10 => "10",
            11 => "J",
            12 => "Q",
            _ => "K",
        }
    }

    pub fn all_ranks() -> impl Iterator<Item = Card> {
        (1..=RANKS).map(Card)
    }
}

impl TryFrom<u8> for Card {
    type Error = DeckError;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        Card::new(rank)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    Empty,
    InvalidRank(u8),
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::Empty => write!(f, "No cards left in deck"),
            DeckError::InvalidRank(rank) => write!(f, "Invalid card rank: {}", rank),
        }
    }
}

impl std::error::Error for DeckError {}

/// A single suitless deck, dealt from the tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Four copies of every rank, in rank order.
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for card in Card::all_ranks() {
            for _ in 0..COPIES {
                cards.push(card);
            }
        }
        Deck { cards }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.cards.shuffle(rng);
        deck
    }

    /// Builds a deck from an explicit order. The last card is drawn first.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Deck { cards }
    }

    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::Empty)
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Percentage of a full deck already dealt.
    pub fn penetration(&self) -> f64 {
        let used = DECK_SIZE.saturating_sub(self.cards.len());
        (used as f64 / DECK_SIZE as f64) * 100.0
    }

    pub fn count_of(&self, card: Card) -> usize {
        self.cards.iter().filter(|c| **c == card).count()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
