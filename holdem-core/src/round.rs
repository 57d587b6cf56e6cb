use crate::bet::{ActionError, Bet, BetAction, BetLedger, BetOptions};
use crate::hand::Table;
use crate::log::{Blind, LogItem};
use crate::player::{Player, PlayerFilter};
use crate::pot::split_side_pots;
use crate::{Currency, PlayerId, SeatIdx};
use std::collections::HashSet;

/// How a betting round left the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Two or more players still contest the active pot
    Continues,
    /// Only this player is left in the active pot
    HandResolved(PlayerId),
}

/// One street of betting over the players contesting the active pot.
///
/// Seats are indices into the active pot's eligible list as it stood when the round started.
/// Folded players and players with nothing left to bet keep their seat but are never asked to
/// act.
pub struct BettingRound {
    seats: Vec<PlayerId>,
    actor: SeatIdx,
    /// The round is over once this seat has had its turn
    end: SeatIdx,
    ledger: BetLedger,
    /// Players who have acted since the last raise
    acted: HashSet<PlayerId>,
}

impl BettingRound {
    pub(crate) fn new<P: Player>(table: &Table<'_, P>, start: SeatIdx) -> Self {
        let seats = table.active.eligible.clone();
        // everybody still in starts with a bet, even if it stays at zero
        let ledger = table
            .players
            .filter(&seats, PlayerFilter::POT_ELIGIBLE)
            .map(|id| Bet::new(id, 0))
            .collect();
        let mut round = Self {
            seats,
            actor: 0,
            end: 0,
            ledger,
            acted: HashSet::new(),
        };
        round.actor = start % round.seats.len().max(1);
        round.end = round.prev(round.actor);
        round
    }

    fn next(&self, seat: SeatIdx) -> SeatIdx {
        (seat + 1) % self.seats.len()
    }

    fn prev(&self, seat: SeatIdx) -> SeatIdx {
        let n = self.seats.len().max(1);
        (seat + n - 1) % n
    }

    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    /// What a player has to have put in, over the whole hand, to stay in
    fn level<P: Player>(&self, table: &Table<'_, P>) -> Currency {
        table.active.level + self.ledger.max()
    }

    fn owed<P: Player>(&self, table: &Table<'_, P>, id: PlayerId) -> Currency {
        (self.level(table) - table.players.contribution(id)).max(0)
    }

    fn contenders<P: Player>(&self, table: &Table<'_, P>) -> usize {
        table
            .players
            .filter(&self.seats, PlayerFilter::POT_ELIGIBLE)
            .count()
    }

    /// Whether anybody besides `id` could still answer a bet
    fn others_with_chips<P: Player>(&self, table: &Table<'_, P>, id: PlayerId) -> bool {
        table
            .players
            .filter(&self.seats, PlayerFilter::MAY_BET)
            .any(|other| other != id)
    }

    fn may_act<P: Player>(&self, table: &Table<'_, P>, id: PlayerId) -> bool {
        table.players.matches(id, PlayerFilter::MAY_BET)
            && (self.owed(table, id) > 0 || self.others_with_chips(table, id))
    }

    /// Force the blinds in: big blind from the seat before the first actor, small blind from the
    /// seat before that when more than two are playing. Short stacks go all in for what they have.
    pub(crate) fn post_blinds<P: Player>(&mut self, table: &mut Table<'_, P>) {
        let (sb, bb) = (table.config.small_blind, table.config.big_blind);
        let bb_seat = self.prev(self.actor);
        let sb_seat = (self.seats.len() > 2).then(|| self.prev(bb_seat));

        table
            .players
            .broadcast(&self.seats, &format!("big blind is {bb}"), &[]);
        let sb_line = match sb_seat {
            Some(_) => format!("small blind is {sb}"),
            None => "no small blind".to_string(),
        };
        table.players.broadcast(&self.seats, &sb_line, &[]);

        for (seat, &id) in self.seats.iter().enumerate() {
            let line = if seat == bb_seat {
                "You are big blind"
            } else if Some(seat) == sb_seat {
                "You are small blind"
            } else {
                "You are not the blind"
            };
            table.players.send_line(id, line);
        }

        if let Some(seat) = sb_seat {
            self.post_blind(table, self.seats[seat], Blind::Small, sb);
        }
        self.post_blind(table, self.seats[bb_seat], Blind::Big, bb);
    }

    fn post_blind<P: Player>(
        &mut self,
        table: &mut Table<'_, P>,
        id: PlayerId,
        blind: Blind,
        amount: Currency,
    ) {
        let amount = amount.min(table.players.holdings(id));
        table.players.commit(id, amount);
        self.ledger.add(id, amount);
        table.log.push(LogItem::BlindPosted(id, blind, amount));
    }

    /// Go around the table until action closes, then settle the round's bets into the pots.
    pub(crate) fn run<P: Player>(mut self, table: &mut Table<'_, P>) -> RoundOutcome {
        while !self.seats.is_empty() {
            let id = self.seats[self.actor];
            if self.may_act(table, id) {
                self.take_turn(table, id);
            }
            if self.contenders(table) < 2 || self.actor == self.end {
                break;
            }
            self.actor = self.next(self.actor);
        }
        self.resolve(table)
    }

    fn take_turn<P: Player>(&mut self, table: &mut Table<'_, P>, id: PlayerId) {
        let holdings = table.players.holdings(id);
        let options = BetOptions {
            raise: !self.acted.contains(&id)
                && holdings > self.owed(table, id)
                && self.others_with_chips(table, id),
        };
        let status = format!(
            "current pot: {}\ncurrent pot bet: {}\nyour current bet: {}\nyour holdings: {}",
            table.pot_total() + self.ledger.sum(),
            self.level(table),
            table.players.contribution(id),
            holdings,
        );
        table.players.send_line(id, &status);
        table.log.push(LogItem::NextToAct(id));

        let timeout = table.config.recv_timeout();
        let (action, amount) = loop {
            table.players.send_line(id, &options.to_string());
            let text = table.players.recv_action(id, timeout).unwrap_or_default();
            match text
                .parse::<BetAction>()
                .and_then(|action| self.apply(table, id, action, options))
            {
                Ok(done) => break done,
                Err(e) => {
                    ::log::debug!("player {id} sent {text:?}: {e}");
                    table.players.send_line(id, &e.to_string());
                }
            }
        };
        self.acted.insert(id);
        table.log.push(LogItem::Action(id, action, amount));

        let name = table.players.name(id);
        let line = match action {
            BetAction::Fold => format!("{name} Folded"),
            BetAction::Call => format!("{name} Called"),
            BetAction::Raise(by) => format!(
                "{name} Raised by {by} to {}",
                table.players.contribution(id)
            ),
        };
        table.players.broadcast(&self.seats, &line, &[id]);
    }

    /// Carry out a parsed action for the player in the acting seat. Nothing changes on error.
    fn apply<P: Player>(
        &mut self,
        table: &mut Table<'_, P>,
        id: PlayerId,
        action: BetAction,
        options: BetOptions,
    ) -> Result<(BetAction, Currency), ActionError> {
        let owed = self.owed(table, id);
        let holdings = table.players.holdings(id);
        let amount = match action {
            BetAction::Fold => {
                table.players.fold(id);
                return Ok((action, 0));
            }
            BetAction::Call => owed.min(holdings),
            BetAction::Raise(by) => {
                if !options.raise {
                    return Err(ActionError::RaiseNotAllowed);
                }
                if by > holdings - owed {
                    return Err(ActionError::NotEnoughToRaise(by));
                }
                self.end = self.prev(self.actor);
                self.acted.clear();
                owed + by
            }
        };
        table.players.commit(id, amount);
        self.ledger.add(id, amount);
        Ok((action, amount))
    }

    /// Move the round's bets into the pot chain and drop folded players from the active pot.
    fn resolve<P: Player>(mut self, table: &mut Table<'_, P>) -> RoundOutcome {
        let players = &table.players;
        self.ledger
            .retain(|b| b.amount > 0 || !players.is_folded(b.owner));

        if self.ledger.is_level() {
            table.active.absorb(&self.ledger);
            table.log.push(LogItem::PotUpdated(table.active.clone()));
        } else {
            let mut pots = split_side_pots(&table.active, &self.ledger);
            table.log.push(LogItem::PotSplit(pots.clone()));
            if let Some(active) = pots.pop() {
                table.active = active;
                table.frozen.extend(pots);
            }
        }

        let players = &table.players;
        table.active.eligible.retain(|id| !players.is_folded(*id));
        // nobody left on top: its chips belong to the layer below
        while table.active.eligible.is_empty() {
            let Some(mut below) = table.frozen.pop() else {
                break;
            };
            below.amount += table.active.amount;
            below.eligible.retain(|id| !players.is_folded(*id));
            table.active = below;
        }
        ::log::debug!("round over, active pot {}", table.active);

        match table.active.eligible[..] {
            [winner] => RoundOutcome::HandResolved(winner),
            _ => RoundOutcome::Continues,
        }
    }
}
