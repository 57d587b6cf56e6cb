use super::card::{all_cards, Card, DECK_LEN};
use base64ct::{self, Base64, Encoding};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

const SEED_LEN: usize = 32;
const ENCODED_SEED_LEN: usize = 4 * ((SEED_LEN + 3 - 1) / 3); // 4 * ceil(SEED_LEN / 3)

/// The card source a hand borrows for its whole lifetime.
///
/// A hand pops every card it uses off the top and gives all of them back with a single
/// `return_many` call when it ends, so the deck holds the same cards before and after a hand.
pub trait Deck {
    /// Remove and return the top card.
    fn pop_top(&mut self) -> Result<Card, DeckError>;
    /// Put previously popped cards back into the deck.
    fn return_many(&mut self, cards: Vec<Card>);
    /// Number of cards currently in the deck.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(PartialEq, Debug)]
pub enum DeckError {
    OutOfCards,
    DeckSeedDecodeError(base64ct::Error),
}

impl Error for DeckError {}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::OutOfCards => write!(f, "No more cards in deck"),
            DeckError::DeckSeedDecodeError(e) => write!(f, "{}", e),
        }
    }
}

impl From<base64ct::Error> for DeckError {
    fn from(e: base64ct::Error) -> Self {
        Self::DeckSeedDecodeError(e)
    }
}

/// A single 52 card deck, shuffled with a ChaCha rng so a given seed always produces the same
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardDeck {
    cards: Vec<Card>,
}

impl Default for StandardDeck {
    fn default() -> Self {
        Self::new(&DeckSeed::default())
    }
}

impl StandardDeck {
    pub fn new(seed: &DeckSeed) -> Self {
        let mut d = StandardDeck {
            cards: all_cards().to_vec(),
        };
        d.seeded_shuffle(seed);
        d
    }

    pub fn shuffle(&mut self) {
        self.seeded_shuffle(&DeckSeed::default());
    }

    pub fn seeded_shuffle(&mut self, seed: &DeckSeed) {
        let mut rng = ChaChaRng::from_seed(seed.0);
        // A known order before shuffling, so the same seed gives the same deck
        self.cards.sort_unstable();
        self.cards.shuffle(&mut rng)
    }

    /// True when this deck holds every card exactly once.
    pub fn is_complete(&self) -> bool {
        use itertools::Itertools;
        self.cards.len() == DECK_LEN && self.cards.iter().unique().count() == DECK_LEN
    }
}

impl Deck for StandardDeck {
    fn pop_top(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::OutOfCards)
    }

    fn return_many(&mut self, cards: Vec<Card>) {
        self.cards.extend(cards);
    }

    fn len(&self) -> usize {
        self.cards.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSeed([u8; SEED_LEN]);

impl DeckSeed {
    pub fn new(b: [u8; SEED_LEN]) -> Self {
        Self(b)
    }
}

impl Default for DeckSeed {
    fn default() -> Self {
        let mut b = [0u8; SEED_LEN];
        thread_rng().fill_bytes(&mut b);
        Self(b)
    }
}

impl std::fmt::Display for DeckSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut b = [0u8; ENCODED_SEED_LEN];
        let s = Base64::encode(&self.0, &mut b).map_err(|_| fmt::Error)?;
        write!(f, "{}", s)
    }
}

impl FromStr for DeckSeed {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b: [u8; SEED_LEN] = [0; SEED_LEN];
        let decoded = Base64::decode(s, &mut b)?;
        if decoded.len() != SEED_LEN {
            return Err(base64ct::Error::InvalidLength.into());
        }
        Ok(DeckSeed(b))
    }
}
