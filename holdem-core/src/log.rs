use crate::bet::BetAction;
use crate::cards::Card;
use crate::hand::State;
use crate::pot::Pot;
use crate::{Currency, PlayerId, SeatIdx, SeqNum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Blind {
    #[display(fmt = "small")]
    Small,
    #[display(fmt = "big")]
    Big,
}

/// Something that happened during a hand, in a form an observer can act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogItem {
    HandStarted(Vec<PlayerId>, SeatIdx),
    StateChange(State, State),
    PocketDealt(PlayerId, Option<[Card; 2]>),
    BlindPosted(PlayerId, Blind, Currency),
    NextToAct(PlayerId),
    /// The action and the chips it put in
    Action(PlayerId, BetAction, Currency),
    Flop(Card, Card, Card),
    Turn(Card),
    River(Card),
    /// The active pot after an even round was folded into it
    PotUpdated(Pot),
    /// The pots an uneven round was split into, replacing the active pot
    PotSplit(Vec<Pot>),
    SingleSurvivor(PlayerId),
    HandReveal(PlayerId, [Card; 2], String),
    /// Index into the pot chain and who got what out of it
    WinnerDecided(usize, Vec<(PlayerId, Currency)>),
    CardsReturned(usize),
}

impl std::fmt::Display for LogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogItem::HandStarted(players, start) => {
                write!(f, "Hand started with players {players:?}, first to act is seat {start}")
            }
            LogItem::StateChange(old, new) => write!(f, "State changed from {old} to {new}"),
            LogItem::PocketDealt(player_id, pocket) => match pocket {
                None => write!(f, "Player {player_id} dealt a hand"),
                Some(p) => write!(f, "Player {player_id} dealt {}{}", p[0], p[1]),
            },
            LogItem::BlindPosted(player_id, blind, amount) => {
                write!(f, "Player {player_id} posts {blind} blind of {amount}")
            }
            LogItem::NextToAct(player_id) => write!(f, "Next to act is player {player_id}"),
            LogItem::Action(player_id, action, amount) => {
                write!(f, "Player {player_id}: {action} (puts in {amount})")
            }
            LogItem::Flop(c1, c2, c3) => write!(f, "Flop: {c1} {c2} {c3}"),
            LogItem::Turn(c) => write!(f, "Turn: {c}"),
            LogItem::River(c) => write!(f, "River: {c}"),
            LogItem::PotUpdated(pot) => write!(f, "Active pot is now {pot}"),
            LogItem::PotSplit(pots) => {
                use itertools::Itertools;
                write!(f, "Split into {}", pots.iter().join(", "))
            }
            LogItem::SingleSurvivor(player_id) => {
                write!(f, "Everybody else folded to player {player_id}")
            }
            LogItem::HandReveal(player_id, p, label) => {
                write!(f, "Player {player_id} shows {}{}: {label}", p[0], p[1])
            }
            LogItem::WinnerDecided(idx, shares) => {
                write!(f, "Pot {idx} paid out: {shares:?}")
            }
            LogItem::CardsReturned(n) => write!(f, "{n} cards returned to the deck"),
        }
    }
}

/// Anything that wants to hear about a hand as it happens.
pub trait HandObserver {
    fn observe(&mut self, seq: SeqNum, item: &LogItem);
}

impl<F: FnMut(SeqNum, &LogItem)> HandObserver for F {
    fn observe(&mut self, seq: SeqNum, item: &LogItem) {
        self(seq, item)
    }
}

/// Every event of one hand, numbered from 1, plus whoever is subscribed to them.
#[derive(Default)]
pub struct Log<'a> {
    items: Vec<(SeqNum, LogItem)>,
    last_seq_num: SeqNum,
    observers: Vec<Box<dyn HandObserver + 'a>>,
}

impl<'a> Log<'a> {
    pub(crate) fn push(&mut self, item: LogItem) {
        let seq = self.last_seq_num + 1;
        ::log::debug!("[{seq}] {item}");
        for o in self.observers.iter_mut() {
            o.observe(seq, &item);
        }
        self.items.push((seq, item));
        self.last_seq_num = seq;
    }

    pub(crate) fn extend<I: IntoIterator<Item = LogItem>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }

    pub fn subscribe<O: HandObserver + 'a>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    pub fn into_items(self) -> Vec<(SeqNum, LogItem)> {
        self.items
    }

    pub fn last_seq_num(&self) -> SeqNum {
        self.last_seq_num
    }

    /// Everything logged after `oldest_seq`
    pub fn items_since(&self, oldest_seq: SeqNum) -> impl Iterator<Item = &(SeqNum, LogItem)> + '_ {
        self.items
            .iter()
            .skip_while(move |(seq, _item)| *seq <= oldest_seq)
    }

    /// Like `items_since`, but with other players' pockets hidden from `player_id`
    pub fn filtered_items_since(
        &self,
        oldest_seq: SeqNum,
        player_id: PlayerId,
    ) -> impl Iterator<Item = (SeqNum, LogItem)> + '_ {
        self.items_since(oldest_seq)
            .map(move |(seq, item)| match item {
                LogItem::PocketDealt(pid, _) if *pid != player_id => {
                    (*seq, LogItem::PocketDealt(*pid, None))
                }
                _ => (*seq, item.clone()),
            })
    }
}
