use crate::cards::Card;
use crate::{Currency, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const POCKET_SIZE: usize = 2;

/// Line based link to one player. Whatever carries the lines (socket, terminal, test script) is
/// not our concern, and neither are its failures.
pub trait Coms {
    fn send_line(&mut self, line: &str);
    fn send_hole_cards(&mut self, cards: [Card; POCKET_SIZE]);
    fn send_reveal(&mut self, cards: &[Card]);
    /// Block until the player answers. The transport enforces `timeout` however it likes; an
    /// answer it can't get should come back as text that doesn't parse as an action.
    fn recv_action(&mut self, timeout: Duration) -> String;
}

/// A player as they exist outside of any one hand: who they are and what they hold.
///
/// The hand never asks to deduct more than `holdings()`.
pub trait Player {
    fn id(&self) -> PlayerId;
    fn name(&self) -> &str;
    fn holdings(&self) -> Currency;
    fn deduct(&mut self, amount: Currency);
    fn credit(&mut self, amount: Currency);
    fn coms(&mut self) -> &mut dyn Coms;

    fn has_chips(&self) -> bool {
        self.holdings() > 0
    }
}

/// What a hand needs to remember about one of its players.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandPlayer {
    pub id: PlayerId,
    /// Index into the seats this hand was dealt to
    seat: usize,
    /// Everything put in so far this hand. Only grows.
    contribution: Currency,
    /// Once set, never cleared
    folded: bool,
    pocket: [Card; POCKET_SIZE],
}

impl HandPlayer {
    pub(crate) fn new(id: PlayerId, seat: usize, pocket: [Card; POCKET_SIZE]) -> Self {
        Self {
            id,
            seat,
            contribution: 0,
            folded: false,
            pocket,
        }
    }

    pub const fn contribution(&self) -> Currency {
        self.contribution
    }

    pub const fn is_folded(&self) -> bool {
        self.folded
    }

    pub const fn pocket(&self) -> [Card; POCKET_SIZE] {
        self.pocket
    }
}

bitflags::bitflags! {
    /// Which players a query should yield. Flags narrow the selection; no flags means everybody.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PlayerFilter: u8 {
        /// Hasn't folded
        const POT_ELIGIBLE = 0b01;
        /// Has chips behind
        const HAS_CHIPS = 0b10;
        /// Could still put chips in
        const MAY_BET = Self::POT_ELIGIBLE.bits() | Self::HAS_CHIPS.bits();
    }
}

/// The players of one hand: the persistent players the hand borrows, and per-hand state for each
/// of them looked up by id.
pub struct HandPlayers<'a, P: Player> {
    seats: &'a mut [P],
    state: HashMap<PlayerId, HandPlayer>,
}

impl<'a, P: Player> HandPlayers<'a, P> {
    pub(crate) fn new(seats: &'a mut [P]) -> Self {
        let state = HashMap::with_capacity(seats.len());
        Self { seats, state }
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Ids of everybody at the table, in seat order
    pub fn ids(&self) -> Vec<PlayerId> {
        self.seats.iter().map(|p| p.id()).collect()
    }

    /// Attach per-hand state to the player at `seat`. Pockets are dealt exactly once.
    pub(crate) fn deal_in(&mut self, seat: usize, pocket: [Card; POCKET_SIZE]) {
        let id = self.seats[seat].id();
        debug_assert!(!self.state.contains_key(&id));
        self.state.insert(id, HandPlayer::new(id, seat, pocket));
        self.seats[seat].coms().send_hole_cards(pocket);
    }

    pub fn get(&self, id: PlayerId) -> Option<&HandPlayer> {
        self.state.get(&id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&P> {
        match self.state.get(&id) {
            Some(hp) => Some(&self.seats[hp.seat]),
            None => self.seats.iter().find(|p| p.id() == id),
        }
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut P> {
        match self.state.get(&id) {
            Some(hp) => Some(&mut self.seats[hp.seat]),
            None => self.seats.iter_mut().find(|p| p.id() == id),
        }
    }

    pub fn name(&self, id: PlayerId) -> String {
        self.player(id)
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| format!("p{id}"))
    }

    pub fn holdings(&self, id: PlayerId) -> Currency {
        self.player(id).map(|p| p.holdings()).unwrap_or(0)
    }

    pub fn contribution(&self, id: PlayerId) -> Currency {
        self.get(id).map(|hp| hp.contribution).unwrap_or(0)
    }

    pub fn is_folded(&self, id: PlayerId) -> bool {
        self.get(id).map(|hp| hp.folded).unwrap_or(true)
    }

    pub fn matches(&self, id: PlayerId, filter: PlayerFilter) -> bool {
        (!filter.contains(PlayerFilter::POT_ELIGIBLE) || !self.is_folded(id))
            && (!filter.contains(PlayerFilter::HAS_CHIPS) || self.holdings(id) > 0)
    }

    /// The players in `ids` that pass `filter`, keeping the order of `ids`
    pub fn filter<'s>(
        &'s self,
        ids: &'s [PlayerId],
        filter: PlayerFilter,
    ) -> impl Iterator<Item = PlayerId> + 's {
        ids.iter().copied().filter(move |id| self.matches(*id, filter))
    }

    /// Take `amount` out of the player's holdings and count it towards their contribution
    pub(crate) fn commit(&mut self, id: PlayerId, amount: Currency) {
        debug_assert!(amount >= 0);
        if amount == 0 {
            return;
        }
        if let Some(hp) = self.state.get_mut(&id) {
            hp.contribution += amount;
            let seat = hp.seat;
            self.seats[seat].deduct(amount);
        }
    }

    pub(crate) fn fold(&mut self, id: PlayerId) {
        if let Some(hp) = self.state.get_mut(&id) {
            hp.folded = true;
        }
    }

    pub(crate) fn credit(&mut self, id: PlayerId, amount: Currency) {
        if let Some(p) = self.player_mut(id) {
            p.credit(amount);
        }
    }

    pub(crate) fn send_line(&mut self, id: PlayerId, line: &str) {
        if let Some(p) = self.player_mut(id) {
            p.coms().send_line(line);
        }
    }

    pub(crate) fn send_reveal(&mut self, id: PlayerId, cards: &[Card]) {
        if let Some(p) = self.player_mut(id) {
            p.coms().send_reveal(cards);
        }
    }

    pub(crate) fn recv_action(&mut self, id: PlayerId, timeout: Duration) -> Option<String> {
        self.player_mut(id).map(|p| p.coms().recv_action(timeout))
    }

    /// Send `line` to each of `ids` except those in `exclude`
    pub(crate) fn broadcast(&mut self, ids: &[PlayerId], line: &str, exclude: &[PlayerId]) {
        for id in ids.iter().filter(|id| !exclude.contains(id)) {
            self.send_line(*id, line);
        }
    }

    /// Sum of everybody's holdings, dealt in or not
    pub fn total_holdings(&self) -> Currency {
        self.seats.iter().map(|p| p.holdings()).sum()
    }
}
