use std::collections::HashMap;

use crate::deck::{Card, DECK_SIZE};

pub const DEFAULT_SYSTEM: &str = "Table";

/// Running count over every card drawn since the last reshuffle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardCounter {
    system: String,
    running_count: i32,
    values: [i32; 13],
}

impl Default for CardCounter {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl CardCounter {
    pub fn new(system: Option<String>, custom_values: Option<HashMap<String, i32>>) -> Self {
        let system_name = system.unwrap_or_else(|| DEFAULT_SYSTEM.to_string());
        let values = if system_name == "Custom" {
            custom_system_values(&custom_values.unwrap_or_default())
        } else {
            default_system_values(&system_name)
        };
        CardCounter {
            system: system_name,
            running_count: 0,
            values,
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn value_of(&self, card: Card) -> i32 {
        self.values[(card.rank() - 1) as usize]
    }

    pub fn update(&mut self, card: Card) {
        self.running_count += self.value_of(card);
    }

    pub fn reset(&mut self) {
        self.running_count = 0;
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    /// Running count per remaining deck, never dividing by less than half a deck.
    pub fn true_count(&self, remaining_cards: usize) -> f64 {
        let remaining_decks = remaining_cards as f64 / DECK_SIZE as f64;
        let decks = remaining_decks.clamp(0.5, 1.0);
        self.running_count as f64 / decks
    }
}

fn custom_system_values(custom: &HashMap<String, i32>) -> [i32; 13] {
    let mut values = [0; 13];
    for card in Card::all_ranks() {
        values[(card.rank() - 1) as usize] = custom.get(card.label()).copied().unwrap_or(0);
    }
    values
}

// Indexed by rank: A, 2..10, J, Q, K.
fn default_system_values(system: &str) -> [i32; 13] {
    match system {
        "Hi-Lo" => [-1, 1, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1],
        "Hi-Opt I" => [0, 0, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1],
        "Hi-Opt II" => [0, 1, 1, 2, 2, 1, 1, 0, 0, -2, -2, -2, -2],
        "Omega II" => [0, 1, 1, 2, 2, 2, 1, 0, -1, -2, -2, -2, -2],
        "KO (Knockout)" => [-1, 1, 1, 1, 1, 1, 1, 0, 0, -1, -1, -1, -1],
        "Ace-Five" => [-1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0],
        // Low ranks including the ace count up, ten and faces count down.
        _ => [1, 1, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1],
    }
}
