use crate::{Currency, GameError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEF_SB: Currency = 5;
pub const DEF_BB: Currency = 10;
const DEF_RECV_TIMEOUT_SECS: u64 = 20;

/// Table stakes and timing for a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    pub small_blind: Currency,
    pub big_blind: Currency,
    /// Handed to the transport each time a player is asked for an action.
    pub recv_timeout_secs: u64,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            small_blind: DEF_SB,
            big_blind: DEF_BB,
            recv_timeout_secs: DEF_RECV_TIMEOUT_SECS,
        }
    }
}

impl HandConfig {
    pub fn new(small_blind: Currency, big_blind: Currency) -> Self {
        Self {
            small_blind,
            big_blind,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.small_blind < 0 || self.big_blind < 1 {
            return Err(GameError::InvalidBlind);
        }
        if self.small_blind > self.big_blind {
            return Err(GameError::SmallBlindTooBig);
        }
        Ok(())
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_secs(self.recv_timeout_secs)
    }
}
