use crate::bet::BetLedger;
use crate::{Currency, PlayerId};
use serde::{Deserialize, Serialize};

/// Chips that a fixed set of players may win.
///
/// A hand keeps an ordered chain of these. Only the last one is active (still taking chips); the
/// ones before it were frozen when an all-in split the betting into layers.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    /// Total chips in this pot
    pub amount: Currency,
    /// How much each eligible player has put in, cumulatively across the hand, to be in this pot
    pub level: Currency,
    /// Players who may win this pot, in seat order. May still hold folded players for frozen pots;
    /// callers filter those out when paying out.
    pub eligible: Vec<PlayerId>,
}

impl Pot {
    pub fn new(eligible: Vec<PlayerId>) -> Self {
        Self {
            amount: 0,
            level: 0,
            eligible,
        }
    }

    /// Fold a round in which everybody put in the same amount straight into this pot
    pub fn absorb(&mut self, ledger: &BetLedger) {
        debug_assert!(ledger.is_level());
        self.amount += ledger.sum();
        self.level += ledger.max();
    }

    /// Split this pot's chips evenly between `winners`. Chips that don't divide evenly go one each
    /// to the winners listed first.
    ///
    /// # Panics
    ///
    /// Panics (in debug builds) if the shares don't add up to the pot. That would be a bug here.
    pub fn distribute(&self, winners: &[PlayerId]) -> Vec<(PlayerId, Currency)> {
        if winners.is_empty() {
            return vec![];
        }
        let n = winners.len() as Currency;
        let share = self.amount / n;
        let mut odd = self.amount % n;
        let shares: Vec<(PlayerId, Currency)> = winners
            .iter()
            .map(|&id| {
                let extra = if odd > 0 {
                    odd -= 1;
                    1
                } else {
                    0
                };
                (id, share + extra)
            })
            .collect();
        debug_assert_eq!(shares.iter().map(|(_, v)| v).sum::<Currency>(), self.amount);
        shares
    }
}

impl std::fmt::Display for Pot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pot({}, level {}, {:?})",
            self.amount, self.level, self.eligible
        )
    }
}

/// Turn a round of unequal bets plus the pot carried into the round into a chain of pots, one
/// per distinct bet size.
///
/// The smallest remaining bet sets each tier: every bettor still in pays that much into the tier's
/// pot and only they are eligible for it. The carried pot's chips go into the first tier. The
/// last pot returned is the new active pot.
///
/// Chips are conserved: the returned amounts sum to `carried.amount + ledger.sum()`.
pub fn split_side_pots(carried: &Pot, ledger: &BetLedger) -> Vec<Pot> {
    let mut remaining: Vec<_> = ledger.iter().copied().collect();
    let mut pots = Vec::new();
    let mut base = carried.amount;
    let mut level = carried.level;
    while let Some(tier) = remaining.iter().map(|b| b.amount).min() {
        level += tier;
        pots.push(Pot {
            amount: base + tier * remaining.len() as Currency,
            level,
            eligible: remaining.iter().map(|b| b.owner).collect(),
        });
        for bet in remaining.iter_mut() {
            bet.amount -= tier;
        }
        remaining.retain(|b| b.amount > 0);
        base = 0;
    }
    ::log::debug!(
        "split {} into {} pots: {:?}",
        carried,
        pots.len(),
        pots.iter().map(|p| p.amount).collect::<Vec<_>>()
    );
    pots
}
