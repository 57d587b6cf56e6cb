use super::card::{Card, Rank};
use enum_map::EnumMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Larger is better. Two scores with the same strength are a tie.
pub type Strength = u32;

/// What an evaluator says about a set of cards: a human readable category and a totally ordered
/// strength.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub label: String,
    pub strength: Strength,
}

pub trait HandEvaluator {
    /// Score the best hand that can be made from `cards` (pocket plus community).
    fn evaluate(&self, cards: &[Card]) -> Score;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub enum HandClass {
    #[display(fmt = "High Card")]
    HighCard,
    #[display(fmt = "Pair")]
    Pair,
    #[display(fmt = "Two Pair")]
    TwoPair,
    #[display(fmt = "Three of a Kind")]
    ThreeOfAKind,
    #[display(fmt = "Straight")]
    Straight,
    #[display(fmt = "Flush")]
    Flush,
    #[display(fmt = "Full House")]
    FullHouse,
    #[display(fmt = "Four of a Kind")]
    FourOfAKind,
    #[display(fmt = "Straight Flush")]
    StraightFlush,
    #[display(fmt = "Royal Flush")]
    RoyalFlush,
}

const HAND_SIZE: usize = 5;
const KICKER_BITS: u32 = 4;

/// Standard high-hand ranking over the best five cards.
#[derive(Debug, Default, Clone, Copy)]
pub struct RankEvaluator;

impl HandEvaluator for RankEvaluator {
    fn evaluate(&self, cards: &[Card]) -> Score {
        let (class, strength) = if cards.len() <= HAND_SIZE {
            score_five(cards)
        } else {
            cards
                .iter()
                .copied()
                .combinations(HAND_SIZE)
                .map(|five| score_five(&five))
                .max_by_key(|(_, strength)| *strength)
                .unwrap_or((HandClass::HighCard, 0))
        };
        Score {
            label: class.to_string(),
            strength,
        }
    }
}

/// Classify at most five cards and pack (class, kickers) into one integer whose order matches
/// hand order.
fn score_five(cards: &[Card]) -> (HandClass, Strength) {
    let mut counts: EnumMap<Rank, usize> = EnumMap::default();
    for c in cards {
        counts[c.rank] += 1;
    }
    // (count, rank), biggest groups first then highest rank
    let groups: Vec<(usize, Rank)> = counts
        .iter()
        .filter(|(_, n)| **n > 0)
        .map(|(r, n)| (*n, r))
        .sorted_unstable()
        .rev()
        .collect();
    if groups.is_empty() {
        return (HandClass::HighCard, 0);
    }
    let flush = cards.len() == HAND_SIZE && cards.iter().map(|c| c.suit).all_equal();
    let straight = straight_high(&groups);

    let class = match (straight, flush) {
        (Some(Rank::Ace), true) => HandClass::RoyalFlush,
        (Some(_), true) => HandClass::StraightFlush,
        _ => match (groups[0].0, groups.get(1).map(|g| g.0)) {
            (4, _) => HandClass::FourOfAKind,
            (3, Some(2)) => HandClass::FullHouse,
            _ if flush => HandClass::Flush,
            _ if straight.is_some() => HandClass::Straight,
            (3, _) => HandClass::ThreeOfAKind,
            (2, Some(2)) => HandClass::TwoPair,
            (2, _) => HandClass::Pair,
            _ => HandClass::HighCard,
        },
    };
    let kickers: Vec<Rank> = match straight {
        Some(high) => vec![high],
        _ => groups.iter().map(|(_, r)| *r).collect(),
    };
    let mut strength = class as Strength;
    for i in 0..HAND_SIZE {
        strength <<= KICKER_BITS;
        if let Some(r) = kickers.get(i) {
            strength |= r.value() as Strength;
        }
    }
    (class, strength)
}

/// High card of a five card straight, if `groups` is one. The wheel (A2345) is five high.
fn straight_high(groups: &[(usize, Rank)]) -> Option<Rank> {
    if groups.len() != HAND_SIZE {
        return None;
    }
    // all singletons, so groups are in descending rank order
    let high = groups[0].1;
    let low = groups[HAND_SIZE - 1].1;
    if high.value() - low.value() == 4 {
        Some(high)
    } else if high == Rank::Ace && groups[1].1 == Rank::Five {
        Some(Rank::Five)
    } else {
        None
    }
}
