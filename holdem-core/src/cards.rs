pub mod card;
pub mod deck;
pub mod eval;

pub use card::{Card, Rank, Suit};
pub use deck::{Deck, DeckError, DeckSeed, StandardDeck};
pub use eval::{HandEvaluator, RankEvaluator, Score, Strength};
