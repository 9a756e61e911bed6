use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    counter::CardCounter,
    deck::{Card, Deck, DeckError},
    hand::{Hand, Scoring, BUST_LIMIT},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Dealer,
}

impl Owner {
    pub fn other(self) -> Owner {
        match self {
            Owner::Player => Owner::Dealer,
            Owner::Dealer => Owner::Player,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    InProgress,
    DealerPlaying,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    PlayerWins,
    DealerWins,
    Draw,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::PlayerWins => "Player Wins",
            Outcome::DealerWins => "Dealer Wins",
            Outcome::Draw => "Draw",
        }
    }
}

/// What happens when the dealer's automatic draw goes over 21.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealerBust {
    /// The busting card is dropped from the dealer's hand.
    #[default]
    Truncate,
    /// The dealer keeps the card and loses the round.
    Bust,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundRules {
    pub scoring: Scoring,
    pub dealer_bust: DealerBust,
    /// Reject hits and sticks once the round is finished.
    pub strict_turns: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundError {
    Deck(DeckError),
    RoundFinished,
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::Deck(err) => write!(f, "{}", err),
            RoundError::RoundFinished => write!(f, "Round is already finished"),
        }
    }
}

impl std::error::Error for RoundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoundError::Deck(err) => Some(err),
            RoundError::RoundFinished => None,
        }
    }
}

impl From<DeckError> for RoundError {
    fn from(err: DeckError) -> Self {
        RoundError::Deck(err)
    }
}

/// Everything one round of play owns. Cards only move from the deck into a
/// hand, and from the dealer's hand into `discards`.
#[derive(Clone, Debug)]
pub struct RoundState {
    deck: Deck,
    player: Hand,
    dealer: Hand,
    discards: Vec<Card>,
    phase: Phase,
    dealer_busted: bool,
    counter: CardCounter,
    rules: RoundRules,
}

impl RoundState {
    /// A round with empty hands. `discards` holds cards already taken out of
    /// `deck` by earlier rounds, if the deck is being carried over.
    pub fn new(deck: Deck, discards: Vec<Card>, counter: CardCounter, rules: RoundRules) -> Self {
        RoundState {
            deck,
            player: Hand::new(),
            dealer: Hand::new(),
            discards,
            phase: Phase::InProgress,
            dealer_busted: false,
            counter,
            rules,
        }
    }

    /// Deals one card to `first`, then one to the other hand.
    pub fn deal_opening(&mut self, first: Owner) -> Result<(), RoundError> {
        self.take_card(first)?;
        self.take_card(first.other())?;
        info!(
            "dealt opening cards, {:?} first ({} left)",
            first,
            self.deck.remaining_cards()
        );
        Ok(())
    }

    pub fn hit(&mut self, owner: Owner) -> Result<Card, RoundError> {
        if self.phase == Phase::Finished && self.rules.strict_turns {
            warn!("rejected hit for {:?}: round finished", owner);
            return Err(RoundError::RoundFinished);
        }
        self.take_card(owner)
    }

    /// Ends the player's turn and plays the dealer out.
    pub fn stick(&mut self) -> Result<(), RoundError> {
        if self.phase == Phase::Finished && self.rules.strict_turns {
            warn!("rejected stick: round finished");
            return Err(RoundError::RoundFinished);
        }
        self.phase = Phase::DealerPlaying;
        let scoring = self.rules.scoring;
        let target = self.player.score(scoring);

        while self.dealer.score(scoring) <= BUST_LIMIT && self.dealer.score(scoring) < target {
            self.take_card(Owner::Dealer)?;
        }

        if self.dealer.is_bust(scoring) {
            match self.rules.dealer_bust {
                DealerBust::Truncate => {
                    if let Some(card) = self.dealer.pop() {
                        debug!("dealer busted, dropping {}", card);
                        self.discards.push(card);
                    }
                }
                DealerBust::Bust => self.dealer_busted = true,
            }
        }

        self.phase = Phase::Finished;
        if let Some(outcome) = self.outcome() {
            info!(
                "round finished: player {} dealer {} -> {}",
                self.player.score(scoring),
                self.dealer.score(scoring),
                outcome.label()
            );
        }
        Ok(())
    }

    pub fn outcome(&self) -> Option<Outcome> {
        let scoring = self.rules.scoring;
        let player = self.player.score(scoring);
        let dealer = self.dealer.score(scoring);
        let stuck = self.is_stuck();

        if player > BUST_LIMIT {
            Some(Outcome::DealerWins)
        } else if !stuck {
            None
        } else if self.dealer_busted {
            Some(Outcome::PlayerWins)
        } else if player < dealer {
            Some(Outcome::DealerWins)
        } else if player == dealer {
            Some(Outcome::Draw)
        } else {
            Some(Outcome::PlayerWins)
        }
    }

    pub fn score(&self, owner: Owner) -> u32 {
        self.hand(owner).score(self.rules.scoring)
    }

    pub fn hand(&self, owner: Owner) -> &Hand {
        match owner {
            Owner::Player => &self.player,
            Owner::Dealer => &self.dealer,
        }
    }

    pub fn is_stuck(&self) -> bool {
        self.phase != Phase::InProgress
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dealer_busted(&self) -> bool {
        self.dealer_busted
    }

    pub fn running_count(&self) -> i32 {
        self.counter.running_count()
    }

    pub fn true_count(&self) -> f64 {
        self.counter.true_count(self.deck.remaining_cards())
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn discards(&self) -> &[Card] {
        &self.discards
    }

    pub fn rules(&self) -> RoundRules {
        self.rules
    }

    /// Gives back the deck, every card taken out of it, and the counter, so a
    /// following round can keep dealing from the same cards.
    pub fn into_shoe(self) -> (Deck, Vec<Card>, CardCounter) {
        let mut used = self.discards;
        used.extend(self.player.into_cards());
        used.extend(self.dealer.into_cards());
        (self.deck, used, self.counter)
    }

    fn take_card(&mut self, owner: Owner) -> Result<Card, RoundError> {
        let card = self.deck.draw().map_err(|err| {
            warn!("{:?} could not draw: {}", owner, err);
            err
        })?;
        self.counter.update(card);
        match owner {
            Owner::Player => self.player.push(card),
            Owner::Dealer => self.dealer.push(card),
        }
        debug!(
            "{:?} drew {} (count {})",
            owner,
            card,
            self.counter.running_count()
        );
        Ok(card)
    }
}
