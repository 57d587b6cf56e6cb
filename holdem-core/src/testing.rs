//! Scripted stand-ins for the things a hand borrows: players that answer from a script, a deck
//! stacked in a known order, and an evaluator that scores cards from a lookup table.
use crate::cards::card::all_cards;
use crate::cards::{Card, Deck, DeckError, HandEvaluator, Score, Strength};
use crate::player::{Coms, Player};
use crate::{Currency, PlayerId};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct ScriptedComs {
    script: VecDeque<String>,
    pub sent: Vec<String>,
    pub pocket: Option<[Card; 2]>,
    pub reveals: Vec<Vec<Card>>,
}

impl ScriptedComs {
    pub(crate) fn new(script: &[&str]) -> Self {
        Self {
            script: script.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn script_left(&self) -> usize {
        self.script.len()
    }

    pub(crate) fn saw(&self, line: &str) -> bool {
        self.sent.iter().any(|s| s == line)
    }
}

impl Coms for ScriptedComs {
    fn send_line(&mut self, line: &str) {
        self.sent.push(line.to_string());
    }

    fn send_hole_cards(&mut self, cards: [Card; 2]) {
        self.pocket = Some(cards);
    }

    fn send_reveal(&mut self, cards: &[Card]) {
        self.reveals.push(cards.to_vec());
    }

    fn recv_action(&mut self, _timeout: Duration) -> String {
        self.script
            .pop_front()
            .expect("asked for an action the script doesn't have")
    }
}

#[derive(Debug)]
pub(crate) struct TestPlayer {
    pub id: PlayerId,
    pub name: String,
    pub holdings: Currency,
    pub coms: ScriptedComs,
}

impl TestPlayer {
    pub(crate) fn new(id: PlayerId, holdings: Currency, script: &[&str]) -> Self {
        Self {
            id,
            name: format!("p{id}"),
            holdings,
            coms: ScriptedComs::new(script),
        }
    }
}

impl Player for TestPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn holdings(&self) -> Currency {
        self.holdings
    }

    fn deduct(&mut self, amount: Currency) {
        assert!(amount <= self.holdings, "deducted more than held");
        self.holdings -= amount;
    }

    fn credit(&mut self, amount: Currency) {
        self.holdings += amount;
    }

    fn coms(&mut self) -> &mut dyn Coms {
        &mut self.coms
    }
}

/// Two distinct cards, different for every `i`
pub(crate) fn pocket(i: usize) -> [Card; 2] {
    let all = all_cards();
    [all[2 * i], all[2 * i + 1]]
}

/// A full deck whose top cards come off in a chosen order.
#[derive(Debug)]
pub(crate) struct StackedDeck {
    /// Bottom first; the top of the deck is the end
    cards: Vec<Card>,
}

impl StackedDeck {
    /// Cards come off in `top` order, then whatever else is left of a full deck.
    pub(crate) fn new(top: &[Card]) -> Self {
        let mut cards: Vec<Card> = all_cards()
            .into_iter()
            .filter(|c| !top.contains(c))
            .collect();
        cards.extend(top.iter().rev());
        Self { cards }
    }

    /// Stack the deck so a hand deals `pockets` (one per seat) and `board`, with the burns in
    /// between taken from the rest of the deck.
    pub(crate) fn dealing(pockets: &[[Card; 2]], board: [Card; 5]) -> Self {
        let mut used: Vec<Card> = pockets.iter().flatten().copied().collect();
        used.extend(board);
        let mut spare = all_cards().into_iter().filter(|c| !used.contains(c));
        let mut burn = || spare.next().expect("a full deck has spare cards");
        let mut top: Vec<Card> = pockets.iter().map(|p| p[0]).collect();
        top.extend(pockets.iter().map(|p| p[1]));
        top.push(burn());
        top.extend(&board[..3]);
        top.push(burn());
        top.push(board[3]);
        top.push(burn());
        top.push(board[4]);
        Self::new(&top)
    }

    pub(crate) fn is_full(&self) -> bool {
        let mut cards = self.cards.clone();
        cards.sort();
        cards.dedup();
        cards.len() == self.cards.len() && cards.len() == all_cards().len()
    }
}

impl Deck for StackedDeck {
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

/// Scores a set of cards as the best strength any one of them maps to. Unlisted cards are worth 0.
#[derive(Debug, Default)]
pub(crate) struct FixedEvaluator {
    strengths: HashMap<Card, Strength>,
}

impl FixedEvaluator {
    pub(crate) fn new(strengths: &[(Card, Strength)]) -> Self {
        Self {
            strengths: strengths.iter().copied().collect(),
        }
    }
}

impl HandEvaluator for FixedEvaluator {
    fn evaluate(&self, cards: &[Card]) -> Score {
        let strength = cards
            .iter()
            .filter_map(|c| self.strengths.get(c))
            .copied()
            .max()
            .unwrap_or(0);
        Score {
            label: format!("Test{strength}"),
            strength,
        }
    }
}

/// Five cards no `pocket(i)` for small `i` will collide with
pub(crate) fn board() -> [Card; 5] {
    let all = all_cards();
    [all[47], all[48], all[49], all[50], all[51]]
}
