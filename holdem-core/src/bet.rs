use crate::{Currency, PlayerId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a player may answer when it is their turn. Text form is the wire protocol: `Fold`,
/// `Call` or `Raise <n>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetAction {
    Fold,
    /// Match the current level, or go all in trying
    Call,
    /// Match the current level, then put in this much more
    Raise(Currency),
}

impl std::fmt::Display for BetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BetAction::Fold => write!(f, "Fold"),
            BetAction::Call => write!(f, "Call"),
            BetAction::Raise(v) => write!(f, "Raise {}", v),
        }
    }
}

impl FromStr for BetAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fold" => return Ok(BetAction::Fold),
            "Call" => return Ok(BetAction::Call),
            _ => {}
        }
        let by = s
            .strip_prefix("Raise ")
            .ok_or(ActionError::Unparseable)?
            .parse::<Currency>()
            .map_err(|_| ActionError::Unparseable)?;
        if by < 1 {
            return Err(ActionError::RaiseTooSmall);
        }
        Ok(BetAction::Raise(by))
    }
}

/// A rejected action. Never fatal: the text goes back to the player and they are asked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ActionError {
    #[display(fmt = "Invalid command")]
    Unparseable,
    #[display(fmt = "Invalid command")]
    RaiseNotAllowed,
    #[display(fmt = "raise amount must be at least 1")]
    RaiseTooSmall,
    #[display(fmt = "not enough money to raise by {}", _0)]
    #[error(ignore)]
    NotEnoughToRaise(Currency),
}

/// The choices offered to the player about to act. Fold and Call are always there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BetOptions {
    pub raise: bool,
}

impl std::fmt::Display for BetOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fold/Call")?;
        if self.raise {
            write!(f, "/Raise")?;
        }
        Ok(())
    }
}

/// One player's chips put in during the current betting round.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub amount: Currency,
    pub owner: PlayerId,
}

impl Bet {
    pub const fn new(owner: PlayerId, amount: Currency) -> Self {
        Self { amount, owner }
    }
}

/// Every bet made this betting round, at most one per player, kept in seat order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLedger {
    bets: Vec<Bet>,
}

impl BetLedger {
    /// Add chips to `owner`'s bet, opening one if needed
    pub fn add(&mut self, owner: PlayerId, amount: Currency) {
        match self.bets.iter_mut().find(|b| b.owner == owner) {
            Some(bet) => bet.amount += amount,
            None => self.bets.push(Bet::new(owner, amount)),
        }
    }

    pub fn get(&self, owner: PlayerId) -> Option<&Bet> {
        self.bets.iter().find(|b| b.owner == owner)
    }

    pub fn sum(&self) -> Currency {
        self.bets.iter().map(|b| b.amount).sum()
    }

    pub fn max(&self) -> Currency {
        self.bets.iter().map(|b| b.amount).max().unwrap_or(0)
    }

    /// True if every bet is for the same amount (trivially true when empty)
    pub fn is_level(&self) -> bool {
        use itertools::Itertools;
        self.bets.iter().map(|b| b.amount).all_equal()
    }

    pub fn retain<F: FnMut(&Bet) -> bool>(&mut self, f: F) {
        self.bets.retain(f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bet> + '_ {
        self.bets.iter()
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }
}

impl FromIterator<Bet> for BetLedger {
    fn from_iter<I: IntoIterator<Item = Bet>>(iter: I) -> Self {
        let mut ledger = BetLedger::default();
        for bet in iter {
            ledger.add(bet.owner, bet.amount);
        }
        ledger
    }
}
