pub mod bet;
pub mod cards;
pub mod config;
pub mod hand;
pub mod log;
pub mod player;
pub mod pot;
pub mod round;
pub mod showdown;
#[cfg(test)]
pub(crate) mod testing;

pub use cards::{deck, eval};
pub use config::HandConfig;
pub use hand::{Hand, HandSummary, Resolution};

pub type PlayerId = i32;
pub type Currency = i32;
pub type SeqNum = usize;
pub type SeatIdx = usize;

/// Problems that stop a hand from being played at all. Raised before any card leaves the deck,
/// except for `Deck` which can only happen while dealing.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GameError {
    NotEnoughPlayers,
    StartSeatOutOfRange,
    SmallBlindTooBig,
    InvalidBlind,
    #[display(fmt = "Player {} has no chips", _0)]
    #[error(ignore)]
    PlayerHasNoChips(PlayerId),
    #[display(fmt = "Player {} is seated twice", _0)]
    #[error(ignore)]
    DuplicatePlayer(PlayerId),
    #[display(fmt = "{}", _0)]
    Deck(deck::DeckError),
}

impl From<deck::DeckError> for GameError {
    fn from(d: deck::DeckError) -> Self {
        GameError::Deck(d)
    }
}
