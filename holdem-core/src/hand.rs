use crate::cards::{Card, Deck, HandEvaluator};
use crate::config::HandConfig;
use crate::log::{HandObserver, Log, LogItem};
use crate::player::{HandPlayers, Player, PlayerFilter};
use crate::pot::Pot;
use crate::round::{BettingRound, RoundOutcome};
use crate::{showdown, Currency, GameError, PlayerId, SeatIdx, SeqNum};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const FLOP_SIZE: usize = 3;
/// Three burns, three flop cards, turn, river
const SET_ASIDE: usize = 8;

/// States a hand can be in
#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, Serialize, Deserialize)]
pub enum State {
    NotStarted,
    Dealing,
    #[display(fmt = "{}", _0)]
    Street(Street),
    Showdown,
    EndOfHand,
}

impl Default for State {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, Serialize, Deserialize)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
}

/// How the hand came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Betting ran through the river with two or more players left
    Showdown,
    /// This player was the only one left in the active pot
    SingleSurvivor(PlayerId),
}

/// What a finished hand leaves behind.
#[derive(Debug, Clone)]
pub struct HandSummary {
    pub resolution: Resolution,
    /// The pot chain as it was paid out, oldest first
    pub pots: Vec<Pot>,
    /// Chips each player was paid. Players who won nothing are absent.
    pub winnings: HashMap<PlayerId, Currency>,
    pub board: Vec<Card>,
    pub log: Vec<(SeqNum, LogItem)>,
}

/// Everything the betting and the payout act on: the players, the pot chain, and the event log.
pub(crate) struct Table<'a, P: Player> {
    pub(crate) players: HandPlayers<'a, P>,
    /// Pots closed off by earlier all-ins, oldest first
    pub(crate) frozen: Vec<Pot>,
    /// The one pot still taking chips
    pub(crate) active: Pot,
    pub(crate) log: Log<'a>,
    pub(crate) config: HandConfig,
}

impl<'a, P: Player> Table<'a, P> {
    pub(crate) fn new(players: HandPlayers<'a, P>, config: HandConfig) -> Self {
        let active = Pot::new(players.ids());
        Self {
            players,
            frozen: vec![],
            active,
            log: Log::default(),
            config,
        }
    }

    /// The whole chain, the active pot last
    pub(crate) fn pots(&self) -> impl Iterator<Item = &Pot> + '_ {
        self.frozen.iter().chain(std::iter::once(&self.active))
    }

    pub(crate) fn pot_total(&self) -> Currency {
        self.pots().map(|p| p.amount).sum()
    }

    /// Whether some pot still has two or more players who haven't folded
    fn contested(&self) -> bool {
        self.pots().any(|pot| {
            self.players
                .filter(&pot.eligible, PlayerFilter::POT_ELIGIBLE)
                .count()
                > 1
        })
    }
}

/// One hand of hold'em over borrowed players, deck and evaluator.
///
/// Nothing moves until [`Hand::run`]. Every card taken from the deck goes back to it when the hand
/// ends, whether it ended normally or not.
pub struct Hand<'a, P: Player, D: Deck, E: HandEvaluator> {
    table: Table<'a, P>,
    deck: &'a mut D,
    evaluator: &'a E,
    /// First to act, as an index into the active pot's players
    start_seat: SeatIdx,
    /// Hole cards in the order they came off the deck
    pockets: Vec<Card>,
    /// Burn cards
    discard: Vec<Card>,
    /// Community cards and the burns before them, in the order they will be used
    face_down: Vec<Card>,
    face_up: Vec<Card>,
    winnings: HashMap<PlayerId, Currency>,
    __state_dont_change_directly: State,
}

impl<'a, P: Player, D: Deck, E: HandEvaluator> Hand<'a, P, D, E> {
    /// Check that a hand can be played at all. Nothing is dealt yet.
    pub fn new(
        players: &'a mut [P],
        deck: &'a mut D,
        evaluator: &'a E,
        start_seat: SeatIdx,
        config: HandConfig,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if players.len() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        if start_seat >= players.len() {
            return Err(GameError::StartSeatOutOfRange);
        }
        if let Some(id) = players.iter().map(|p| p.id()).duplicates().next() {
            return Err(GameError::DuplicatePlayer(id));
        }
        if let Some(p) = players.iter().find(|p| !p.has_chips()) {
            return Err(GameError::PlayerHasNoChips(p.id()));
        }
        Ok(Self {
            table: Table::new(HandPlayers::new(players), config),
            deck,
            evaluator,
            start_seat,
            pockets: vec![],
            discard: vec![],
            face_down: vec![],
            face_up: vec![],
            winnings: HashMap::new(),
            __state_dont_change_directly: State::NotStarted,
        })
    }

    pub fn subscribe<O: HandObserver + 'a>(&mut self, observer: O) {
        self.table.log.subscribe(observer);
    }

    pub const fn state(&self) -> State {
        self.__state_dont_change_directly
    }

    fn change_state(&mut self, new: State) {
        self.table
            .log
            .push(LogItem::StateChange(self.__state_dont_change_directly, new));
        // this is the only place the state should ever be changed directly
        self.__state_dont_change_directly = new;
    }

    /// Play the hand to the end and pay it out.
    pub fn run(mut self) -> Result<HandSummary, GameError> {
        let played = self.play();
        self.return_cards();
        let resolution = played?;
        Ok(HandSummary {
            resolution,
            pots: self.table.pots().cloned().collect(),
            winnings: self.winnings,
            board: self.face_up,
            log: self.table.log.into_items(),
        })
    }

    fn play(&mut self) -> Result<Resolution, GameError> {
        let ids = self.table.players.ids();
        self.table.players.broadcast(&ids, "----New Hand----", &[]);
        for &id in &ids {
            let line = format!("Money left: {}", self.table.players.holdings(id));
            self.table.players.send_line(id, &line);
        }
        self.table
            .log
            .push(LogItem::HandStarted(ids, self.start_seat));
        ::log::info!("hand started, first to act is seat {}", self.start_seat);

        self.change_state(State::Dealing);
        self.deal()?;

        self.change_state(State::Street(Street::PreFlop));
        let mut round = BettingRound::new(&self.table, self.start_seat);
        round.post_blinds(&mut self.table);
        let mut outcome = round.run(&mut self.table);
        while let RoundOutcome::Continues = outcome {
            self.start_seat %= self.table.active.eligible.len().max(1);
            let Some(street) = self.next_street() else {
                break;
            };
            self.change_state(State::Street(street));
            self.reveal(street);
            outcome = BettingRound::new(&self.table, self.start_seat).run(&mut self.table);
        }

        let resolution = match outcome {
            RoundOutcome::Continues => Resolution::Showdown,
            RoundOutcome::HandResolved(winner) => {
                self.table.log.push(LogItem::SingleSurvivor(winner));
                // all in players may still be owed a showdown for the pots they're in
                if self.table.contested() {
                    while let Some(street) = self.next_street() {
                        self.change_state(State::Street(street));
                        self.reveal(street);
                    }
                }
                Resolution::SingleSurvivor(winner)
            }
        };
        self.change_state(State::Showdown);
        self.winnings = showdown::settle(&mut self.table, &self.face_up, self.evaluator);
        self.change_state(State::EndOfHand);
        Ok(resolution)
    }

    fn next_street(&self) -> Option<Street> {
        match self.state() {
            State::Street(Street::PreFlop) => Some(Street::Flop),
            State::Street(Street::Flop) => Some(Street::Turn),
            State::Street(Street::Turn) => Some(Street::River),
            _ => None,
        }
    }

    /// Two hole cards each, one card at a time around the table, then the community cards and
    /// their burns set aside.
    fn deal(&mut self) -> Result<(), GameError> {
        let n = self.table.players.len();
        for _ in 0..2 * n {
            self.pockets.push(self.deck.pop_top()?);
        }
        for _ in 0..SET_ASIDE {
            self.face_down.push(self.deck.pop_top()?);
        }
        for seat in 0..n {
            let pocket = [self.pockets[seat], self.pockets[n + seat]];
            self.table.players.deal_in(seat, pocket);
        }
        let dealt: Vec<_> = self
            .table
            .players
            .ids()
            .into_iter()
            .map(|id| LogItem::PocketDealt(id, self.table.players.get(id).map(|hp| hp.pocket())))
            .collect();
        self.table.log.extend(dealt);
        Ok(())
    }

    /// Burn one, turn the street's cards face up and show them to everybody still in.
    fn reveal(&mut self, street: Street) {
        let n = match street {
            Street::Flop => FLOP_SIZE,
            _ => 1,
        };
        if self.face_down.len() < n + 1 {
            return;
        }
        self.discard.extend(self.face_down.drain(..1));
        let cards: Vec<Card> = self.face_down.drain(..n).collect();
        match cards[..] {
            [c1, c2, c3] => self.table.log.push(LogItem::Flop(c1, c2, c3)),
            [c] if street == Street::Turn => self.table.log.push(LogItem::Turn(c)),
            [c] => self.table.log.push(LogItem::River(c)),
            _ => {}
        }
        let ids = self.table.players.ids();
        let in_hand: Vec<_> = self
            .table
            .players
            .filter(&ids, PlayerFilter::POT_ELIGIBLE)
            .collect();
        for id in in_hand {
            self.table.players.send_reveal(id, &cards);
        }
        self.face_up.extend(cards);
    }

    /// Give every card this hand took back to the deck.
    fn return_cards(&mut self) {
        let mut cards = std::mem::take(&mut self.pockets);
        cards.append(&mut self.discard);
        cards.extend(self.face_up.iter().copied());
        cards.append(&mut self.face_down);
        self.table.log.push(LogItem::CardsReturned(cards.len()));
        self.deck.return_many(cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::DeckError;
    use crate::testing::{board, pocket, FixedEvaluator, StackedDeck, TestPlayer};
    use std::cell::RefCell;

    fn pockets(n: usize) -> Vec<[Card; 2]> {
        (0..n).map(pocket).collect()
    }

    /// Evaluator under which seat i's pocket is worth `strengths[i]`
    fn ranked(strengths: &[u32]) -> FixedEvaluator {
        let pairs: Vec<_> = strengths
            .iter()
            .enumerate()
            .map(|(i, s)| (pocket(i)[0], *s))
            .collect();
        FixedEvaluator::new(&pairs)
    }

    fn chips(seats: &[TestPlayer]) -> Currency {
        seats.iter().map(|p| p.holdings).sum()
    }

    #[test]
    fn setup_errors_touch_nothing() {
        let eval = ranked(&[]);
        let mut deck = StackedDeck::new(&[]);
        let cases: Vec<(Vec<TestPlayer>, SeatIdx, HandConfig)> = vec![
            (vec![TestPlayer::new(1, 100, &[])], 0, HandConfig::default()),
            (
                vec![TestPlayer::new(1, 100, &[]), TestPlayer::new(2, 100, &[])],
                2,
                HandConfig::default(),
            ),
            (
                vec![TestPlayer::new(1, 100, &[]), TestPlayer::new(2, 100, &[])],
                0,
                HandConfig::new(20, 10),
            ),
            (
                vec![TestPlayer::new(1, 100, &[]), TestPlayer::new(1, 100, &[])],
                0,
                HandConfig::default(),
            ),
            (
                vec![TestPlayer::new(1, 100, &[]), TestPlayer::new(2, 0, &[])],
                0,
                HandConfig::default(),
            ),
        ];
        let mut errors = vec![];
        for (mut seats, start, config) in cases {
            match Hand::new(&mut seats, &mut deck, &eval, start, config) {
                Ok(_) => panic!("hand should not have been allowed"),
                Err(e) => errors.push(e.to_string()),
            }
            assert!(seats.iter().all(|p| p.coms.pocket.is_none()));
        }
        assert_eq!(
            errors,
            vec![
                "NotEnoughPlayers",
                "StartSeatOutOfRange",
                "SmallBlindTooBig",
                "Player 1 is seated twice",
                "Player 2 has no chips",
            ]
        );
        assert!(deck.is_full());
    }

    #[test]
    fn checked_down_to_showdown() {
        let mut seats = vec![
            TestPlayer::new(1, 100, &["Call", "Call", "Call", "Call"]),
            TestPlayer::new(2, 100, &["Call", "Call", "Call", "Call"]),
        ];
        let mut deck = StackedDeck::dealing(&pockets(2), board());
        let eval = ranked(&[3, 8]);
        let summary = Hand::new(&mut seats, &mut deck, &eval, 0, HandConfig::default())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.resolution, Resolution::Showdown);
        assert_eq!(summary.board, board().to_vec());
        assert_eq!(summary.winnings, [(2, 20)].into());
        assert_eq!(seats[0].holdings, 90);
        assert_eq!(seats[1].holdings, 110);
        assert_eq!(seats[0].coms.pocket, Some(pocket(0)));
        assert_eq!(seats[1].coms.reveals.len(), 3);
        assert!(seats[1].coms.saw("YOU WIN\nWinnings: 10"));
        assert!(seats[0].coms.saw("YOU LOSE"));
        assert!(seats[0].coms.saw("----New Hand----"));
        assert!(seats[0].coms.saw("Money left: 100"));
        assert!(deck.is_full());
        assert!(summary
            .log
            .iter()
            .any(|(_, item)| *item == LogItem::CardsReturned(2 * 2 + SET_ASIDE)));
    }

    #[test]
    fn tie_splits_the_pot() {
        let mut seats = vec![
            TestPlayer::new(1, 100, &["Call", "Call", "Call", "Call"]),
            TestPlayer::new(2, 100, &["Call", "Call", "Call", "Call"]),
            TestPlayer::new(3, 100, &["Call", "Call", "Call", "Call"]),
        ];
        let mut deck = StackedDeck::dealing(&pockets(3), board());
        let eval = ranked(&[6, 6, 2]);
        let summary = Hand::new(&mut seats, &mut deck, &eval, 0, HandConfig::default())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.winnings, [(1, 15), (2, 15)].into());
        assert_eq!(chips(&seats), 300);
        assert!(seats[0].coms.saw("YOU DRAW\nWinnings: 5"));
        assert!(seats[1].coms.saw("YOU DRAW\nWinnings: 5"));
        assert!(seats[2].coms.saw("YOU LOSE"));
    }

    #[test]
    fn everybody_folds_preflop() {
        let mut seats = vec![
            TestPlayer::new(1, 100, &[]),
            TestPlayer::new(2, 100, &["Fold"]),
            TestPlayer::new(3, 100, &["Fold"]),
        ];
        let mut deck = StackedDeck::dealing(&pockets(3), board());
        let eval = ranked(&[]);
        let summary = Hand::new(&mut seats, &mut deck, &eval, 1, HandConfig::default())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.resolution, Resolution::SingleSurvivor(1));
        assert!(summary.board.is_empty());
        assert_eq!(summary.winnings.values().sum::<Currency>(), 15);
        assert_eq!(
            seats.iter().map(|p| p.holdings).collect::<Vec<_>>(),
            vec![105, 100, 95]
        );
        assert!(seats.iter().all(|p| p.coms.reveals.is_empty()));
        assert!(seats[0].coms.saw("YOU WIN\nWinnings: 5"));
        assert!(deck.is_full());
    }

    #[test]
    fn all_in_player_still_gets_a_showdown() {
        // p1 is big blind and calls all in for 30, p2 folds to p3 on the flop
        let mut seats = vec![
            TestPlayer::new(1, 30, &["Call"]),
            TestPlayer::new(2, 100, &["Raise 40", "Fold"]),
            TestPlayer::new(3, 100, &["Call", "Raise 10"]),
        ];
        let mut deck = StackedDeck::dealing(&pockets(3), board());
        let eval = ranked(&[9, 1, 2]);
        let summary = Hand::new(&mut seats, &mut deck, &eval, 1, HandConfig::default())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.resolution, Resolution::SingleSurvivor(3));
        assert_eq!(summary.board, board().to_vec());
        assert_eq!(
            summary.pots,
            vec![
                Pot {
                    amount: 90,
                    level: 30,
                    eligible: vec![1, 2, 3]
                },
                Pot {
                    amount: 50,
                    level: 60,
                    eligible: vec![3]
                },
            ]
        );
        assert_eq!(summary.winnings, [(1, 90), (3, 50)].into());
        assert_eq!(
            seats.iter().map(|p| p.holdings).collect::<Vec<_>>(),
            vec![90, 50, 90]
        );
        assert_eq!(seats[0].coms.reveals.len(), 3);
        assert_eq!(seats[1].coms.reveals.len(), 1);
        assert!(seats[0].coms.saw("p3 got Test2"));
        assert!(deck.is_full());
    }

    #[test]
    fn out_of_cards_returns_what_was_dealt() {
        // 23 players need 54 cards
        let mut seats: Vec<_> = (1..=23).map(|id| TestPlayer::new(id, 100, &[])).collect();
        let mut deck = StackedDeck::new(&[]);
        let eval = ranked(&[]);
        let r = Hand::new(&mut seats, &mut deck, &eval, 0, HandConfig::default())
            .unwrap()
            .run();
        assert!(matches!(r, Err(GameError::Deck(DeckError::OutOfCards))));
        assert!(deck.is_full());
        assert_eq!(chips(&seats), 2300);
    }

    #[test]
    fn observers_see_the_whole_log() {
        let seen = RefCell::new(vec![]);
        let mut seats = vec![
            TestPlayer::new(1, 100, &["Fold"]),
            TestPlayer::new(2, 100, &[]),
        ];
        let mut deck = StackedDeck::dealing(&pockets(2), board());
        let eval = ranked(&[]);
        let summary = {
            let mut hand =
                Hand::new(&mut seats, &mut deck, &eval, 0, HandConfig::default()).unwrap();
            hand.subscribe(|seq: SeqNum, item: &LogItem| {
                seen.borrow_mut().push((seq, item.clone()))
            });
            hand.run().unwrap()
        };
        assert_eq!(seen.into_inner(), summary.log);
        let kinds: Vec<_> = summary
            .log
            .iter()
            .filter_map(|(_, item)| match item {
                LogItem::StateChange(_, new) => Some(*new),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                State::Dealing,
                State::Street(Street::PreFlop),
                State::Showdown,
                State::EndOfHand
            ]
        );
        assert!(summary
            .log
            .iter()
            .any(|(_, item)| *item == LogItem::PocketDealt(2, Some(pocket(1)))));
        assert!(summary
            .log
            .iter()
            .any(|(_, item)| *item == LogItem::SingleSurvivor(2)));
    }
}
