use std::collections::HashMap;

use log::info;
use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    counter::CardCounter,
    deck::{Card, Deck},
    game::{DealerBust, Outcome, Owner, Phase, RoundError, RoundRules, RoundState},
    hand::Scoring,
};

fn default_initial_deal() -> Owner {
    Owner::Player
}

fn default_reset_deal() -> Owner {
    Owner::Dealer
}

fn default_reshuffle_on_reset() -> bool {
    true
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RulesInput {
    #[serde(default)]
    pub scoring: Scoring,
    #[serde(default)]
    pub dealer_bust: DealerBust,
    #[serde(default)]
    pub strict_turns: bool,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CountingInput {
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub custom_values: Option<HashMap<String, i32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableInput {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rules: RulesInput,
    #[serde(default)]
    pub counting: Option<CountingInput>,
    /// Who receives the first card when the table is opened.
    #[serde(default = "default_initial_deal")]
    pub initial_deal: Owner,
    /// Who receives the first card after a reset.
    #[serde(default = "default_reset_deal")]
    pub reset_deal: Owner,
    #[serde(default = "default_reshuffle_on_reset")]
    pub reshuffle_on_reset: bool,
    /// With a carried deck, reshuffle on reset once this percentage is dealt.
    #[serde(default)]
    pub penetration_threshold: Option<u8>,
}

impl Default for TableInput {
    fn default() -> Self {
        TableInput {
            seed: None,
            rules: RulesInput::default(),
            counting: None,
            initial_deal: default_initial_deal(),
            reset_deal: default_reset_deal(),
            reshuffle_on_reset: default_reshuffle_on_reset(),
            penetration_threshold: None,
        }
    }
}

pub fn to_round_rules(rules: &RulesInput) -> RoundRules {
    RoundRules {
        scoring: rules.scoring,
        dealer_bust: rules.dealer_bust,
        strict_turns: rules.strict_turns,
    }
}

pub fn build_counter(config: Option<CountingInput>) -> CardCounter {
    match config {
        Some(cfg) => CardCounter::new(cfg.system, cfg.custom_values),
        None => CardCounter::default(),
    }
}

/// Everything the hand renderer and control panel need to draw the table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub player_cards: Vec<Card>,
    pub dealer_cards: Vec<Card>,
    pub player_score: u32,
    pub dealer_score: u32,
    pub phase: Phase,
    pub stuck: bool,
    pub outcome: Option<Outcome>,
    pub outcome_label: Option<String>,
    pub running_count: i32,
    pub true_count: f64,
    pub cards_left: usize,
    pub cards_left_label: String,
    pub can_hit: bool,
    pub can_stick: bool,
}

impl TableView {
    pub fn of(round: &RoundState) -> Self {
        let outcome = round.outcome();
        let cards_left = round.deck().remaining_cards();
        let stuck = round.is_stuck();
        TableView {
            player_cards: round.hand(Owner::Player).cards().to_vec(),
            dealer_cards: round.hand(Owner::Dealer).cards().to_vec(),
            player_score: round.score(Owner::Player),
            dealer_score: round.score(Owner::Dealer),
            phase: round.phase(),
            stuck,
            outcome,
            outcome_label: outcome.map(|o| o.label().to_string()),
            running_count: round.running_count(),
            true_count: round.true_count(),
            cards_left,
            cards_left_label: if cards_left == 0 {
                "Deck Empty".to_string()
            } else {
                cards_left.to_string()
            },
            can_hit: !stuck && cards_left > 0,
            can_stick: !stuck,
        }
    }
}

/// One player's session at the table: settings, shuffle source and the
/// current round.
pub struct Table {
    rules: RoundRules,
    counting: Option<CountingInput>,
    reset_deal: Owner,
    reshuffle_on_reset: bool,
    penetration_threshold: Option<u8>,
    rng: SmallRng,
    round: RoundState,
}

impl Table {
    /// Shuffles a deck and deals the opening cards.
    pub fn new(input: TableInput) -> Result<Self, RoundError> {
        let mut rng = match input.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let rules = to_round_rules(&input.rules);
        let deck = Deck::shuffled(&mut rng);
        let counter = build_counter(input.counting.clone());
        let mut round = RoundState::new(deck, Vec::new(), counter, rules);
        round.deal_opening(input.initial_deal)?;
        info!("table opened with {:?} scoring", rules.scoring);

        Ok(Table {
            rules,
            counting: input.counting,
            reset_deal: input.reset_deal,
            reshuffle_on_reset: input.reshuffle_on_reset,
            penetration_threshold: input.penetration_threshold,
            rng,
            round,
        })
    }

    pub fn hit(&mut self) -> Result<Card, RoundError> {
        self.round.hit(Owner::Player)
    }

    pub fn stick(&mut self) -> Result<(), RoundError> {
        self.round.stick()
    }

    /// Replaces the round. The current round is kept if the new deal fails.
    pub fn reset(&mut self) -> Result<(), RoundError> {
        let mut next = if self.should_reshuffle() {
            let deck = Deck::shuffled(&mut self.rng);
            RoundState::new(deck, Vec::new(), build_counter(self.counting.clone()), self.rules)
        } else {
            let (deck, used, counter) = self.round.clone().into_shoe();
            RoundState::new(deck, used, counter, self.rules)
        };
        next.deal_opening(self.reset_deal)?;
        self.round = next;
        info!(
            "round reset ({} cards left)",
            self.round.deck().remaining_cards()
        );
        Ok(())
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn view(&self) -> TableView {
        TableView::of(&self.round)
    }

    fn should_reshuffle(&self) -> bool {
        if self.reshuffle_on_reset {
            return true;
        }
        match self.penetration_threshold {
            Some(threshold) => self.round.deck().penetration() >= threshold as f64,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::DeckError;

    fn seeded(seed: u64) -> TableInput {
        TableInput {
            seed: Some(seed),
            ..TableInput::default()
        }
    }

    #[test]
    fn opening_deals_one_card_each() {
        let table = Table::new(seeded(1)).unwrap();
        let round = table.round();
        assert_eq!(round.hand(Owner::Player).len(), 1);
        assert_eq!(round.hand(Owner::Dealer).len(), 1);
        assert_eq!(round.deck().remaining_cards(), 50);
        assert!(!round.is_stuck());
    }

    #[test]
    fn seed_controls_the_deal() {
        let a = Table::new(seeded(99)).unwrap();
        let b = Table::new(seeded(99)).unwrap();
        assert_eq!(a.round().deck(), b.round().deck());
        assert_eq!(
            a.round().hand(Owner::Player),
            b.round().hand(Owner::Player)
        );
    }

    #[test]
    fn mount_deals_player_first_and_reset_dealer_first() {
        let table = Table::new(seeded(5)).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut deck = Deck::shuffled(&mut rng);
        let first = deck.draw().unwrap();
        assert_eq!(table.round().hand(Owner::Player).cards(), &[first]);

        let mut table = Table::new(seeded(5)).unwrap();
        table.reset().unwrap();
        let mut deck = Deck::shuffled(&mut rng);
        let first = deck.draw().unwrap();
        assert_eq!(table.round().hand(Owner::Dealer).cards(), &[first]);
    }

    #[test]
    fn reset_starts_a_fresh_round() {
        let mut table = Table::new(seeded(11)).unwrap();
        table.hit().unwrap();
        table.stick().unwrap();
        assert!(table.round().is_stuck());

        table.reset().unwrap();

        let round = table.round();
        assert!(!round.is_stuck());
        assert_eq!(round.phase(), Phase::InProgress);
        assert_eq!(round.hand(Owner::Player).len(), 1);
        assert_eq!(round.hand(Owner::Dealer).len(), 1);
        assert_eq!(round.deck().remaining_cards(), 50);
        assert!(round.discards().is_empty());
        let dealt: i32 = [Owner::Player, Owner::Dealer]
            .iter()
            .flat_map(|o| round.hand(*o).cards().to_vec())
            .map(|c| CardCounter::default().value_of(c))
            .sum();
        assert_eq!(round.running_count(), dealt);
    }

    #[test]
    fn carried_deck_runs_out() {
        let input = TableInput {
            reshuffle_on_reset: false,
            ..seeded(21)
        };
        let mut table = Table::new(input).unwrap();
        let mut last_left = table.round().deck().remaining_cards();
        let err = loop {
            if let Err(err) = table.reset() {
                break err;
            }
            let left = table.round().deck().remaining_cards();
            assert_eq!(left, last_left - 2);
            assert_eq!(left + table.round().discards().len() + 2, 52);
            last_left = left;
        };
        assert_eq!(err, RoundError::Deck(DeckError::Empty));
        assert_eq!(table.view().cards_left_label, "Deck Empty");
    }

    #[test]
    fn penetration_threshold_reshuffles_carried_deck() {
        let input = TableInput {
            reshuffle_on_reset: false,
            penetration_threshold: Some(50),
            ..seeded(8)
        };
        let mut table = Table::new(input).unwrap();
        for _ in 0..30 {
            table.reset().unwrap();
            assert!(table.round().deck().remaining_cards() >= 24);
        }
    }

    #[test]
    fn view_reports_outcome_once_stuck() {
        let mut table = Table::new(seeded(2)).unwrap();
        let view = table.view();
        assert!(view.outcome.is_none() || view.player_score > 21);
        assert!(view.can_hit);
        assert!(view.can_stick);

        table.stick().unwrap();

        let view = table.view();
        assert!(view.stuck);
        assert!(!view.can_hit);
        assert_eq!(view.phase, Phase::Finished);
        let label = view.outcome_label.unwrap();
        assert!(["Player Wins", "Dealer Wins", "Draw"].contains(&label.as_str()));
    }

    #[test]
    fn view_serializes_camel_case() {
        let table = Table::new(seeded(4)).unwrap();
        let json = serde_json::to_value(table.view()).unwrap();
        assert_eq!(json["cardsLeft"], 50);
        assert_eq!(json["phase"], "InProgress");
        assert!(json["outcome"].is_null());
        assert!(json["playerCards"][0].is_u64());
    }

    #[test]
    fn input_defaults_from_empty_object() {
        let input: TableInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.initial_deal, Owner::Player);
        assert_eq!(input.reset_deal, Owner::Dealer);
        assert!(input.reshuffle_on_reset);
        assert_eq!(input.rules.scoring, Scoring::Standard);
        assert_eq!(input.rules.dealer_bust, DealerBust::Truncate);

        let input: TableInput = serde_json::from_str(
            r#"{"rules": {"scoring": "RawRanks", "strict_turns": true}, "counting": {"system": "Hi-Lo"}}"#,
        )
        .unwrap();
        assert_eq!(input.rules.scoring, Scoring::RawRanks);
        assert!(input.rules.strict_turns);
        assert_eq!(build_counter(input.counting).system(), "Hi-Lo");
    }
}
