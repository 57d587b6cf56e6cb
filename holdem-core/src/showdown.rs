use crate::cards::{Card, HandEvaluator, Score};
use crate::hand::Table;
use crate::log::LogItem;
use crate::player::{Player, PlayerFilter};
use crate::{Currency, PlayerId};
use std::collections::{HashMap, HashSet};

/// The players among `contenders` holding the best score, in the order given. Empty if none of
/// them were scored.
pub fn best_of(contenders: &[PlayerId], scores: &HashMap<PlayerId, Score>) -> Vec<PlayerId> {
    let Some(top) = contenders
        .iter()
        .filter_map(|id| scores.get(id))
        .map(|s| s.strength)
        .max()
    else {
        return vec![];
    };
    contenders
        .iter()
        .copied()
        .filter(|id| scores.get(id).map(|s| s.strength) == Some(top))
        .collect()
}

/// Score whoever is still fighting over a pot with somebody else, then pay out every pot, oldest
/// first, to the best of its own contenders. Returns what each player was paid.
///
/// Each player still in is then told how it went. Taking any contested pot alone is a win, and
/// sharing one is a draw. Otherwise uncontested pots count as a win only when they leave the
/// player ahead, so getting back the unmatched top of one's own bet is still a loss.
pub(crate) fn settle<P: Player, E: HandEvaluator>(
    table: &mut Table<'_, P>,
    board: &[Card],
    evaluator: &E,
) -> HashMap<PlayerId, Currency> {
    let pots: Vec<_> = table.pots().cloned().collect();
    let contenders: Vec<Vec<PlayerId>> = pots
        .iter()
        .map(|pot| {
            table
                .players
                .filter(&pot.eligible, PlayerFilter::POT_ELIGIBLE)
                .collect()
        })
        .collect();

    let seated = table.players.ids();
    let contested: Vec<PlayerId> = seated
        .iter()
        .copied()
        .filter(|id| contenders.iter().any(|c| c.len() > 1 && c.contains(id)))
        .collect();
    let scores = score(table, &contested, board, evaluator);

    let mut winnings: HashMap<PlayerId, Currency> = HashMap::new();
    let mut won_alone = HashSet::new();
    let mut drew = HashSet::new();
    let mut carry = 0;
    for (idx, (pot, contenders)) in pots.iter().zip(&contenders).enumerate() {
        let winners = match contenders[..] {
            [only] => vec![only],
            _ => best_of(contenders, &scores),
        };
        if winners.is_empty() {
            carry += pot.amount;
            continue;
        }
        let mut pot = pot.clone();
        pot.amount += std::mem::take(&mut carry);
        let shares = pot.distribute(&winners);
        for &(id, amount) in &shares {
            table.players.credit(id, amount);
            *winnings.entry(id).or_default() += amount;
        }
        match winners[..] {
            _ if contenders.len() < 2 => {}
            [only] => {
                won_alone.insert(only);
            }
            _ => drew.extend(winners.iter().copied()),
        }
        ::log::info!("pot {idx} of {} goes to {:?}", pot.amount, winners);
        table.log.push(LogItem::WinnerDecided(idx, shares));
    }
    if carry > 0 {
        ::log::warn!("{carry} chips left with no one to pay them to");
    }

    let in_hand: Vec<PlayerId> = table
        .players
        .filter(&seated, PlayerFilter::POT_ELIGIBLE)
        .collect();
    for id in in_hand {
        let won = winnings.get(&id).copied().unwrap_or(0);
        let net = won - table.players.contribution(id);
        let line = if won_alone.contains(&id) || (won > 0 && net > 0 && !drew.contains(&id)) {
            format!("YOU WIN\nWinnings: {net}")
        } else if drew.contains(&id) {
            format!("YOU DRAW\nWinnings: {net}")
        } else {
            "YOU LOSE".to_string()
        };
        table.players.send_line(id, &line);
    }
    winnings
}

/// Evaluate each player's pocket with the board, revealing it to the other `ids`.
fn score<P: Player, E: HandEvaluator>(
    table: &mut Table<'_, P>,
    ids: &[PlayerId],
    board: &[Card],
    evaluator: &E,
) -> HashMap<PlayerId, Score> {
    let mut scores = HashMap::with_capacity(ids.len());
    for &id in ids {
        let Some(pocket) = table.players.get(id).map(|hp| hp.pocket()) else {
            continue;
        };
        let mut cards = pocket.to_vec();
        cards.extend_from_slice(board);
        let score = evaluator.evaluate(&cards);
        table
            .log
            .push(LogItem::HandReveal(id, pocket, score.label.clone()));
        let name = table.players.name(id);
        table
            .players
            .broadcast(ids, &format!("{name} got {}", score.label), &[id]);
        table
            .players
            .send_line(id, &format!("You got {}", score.label));
        scores.insert(id, score);
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandConfig;
    use crate::player::HandPlayers;
    use crate::pot::Pot;
    use crate::testing::{board, pocket, FixedEvaluator, TestPlayer};

    fn s(strength: u32) -> Score {
        Score {
            label: String::new(),
            strength,
        }
    }

    #[test]
    fn best_of_keeps_ties_in_order() {
        let scores: HashMap<_, _> = [(1, s(5)), (2, s(9)), (3, s(9)), (4, s(1))].into();
        assert_eq!(best_of(&[1, 2, 3, 4], &scores), vec![2, 3]);
        assert_eq!(best_of(&[3, 2], &scores), vec![3, 2]);
        assert_eq!(best_of(&[1, 4], &scores), vec![1]);
        assert_eq!(best_of(&[7], &scores), Vec::<PlayerId>::new());
    }

    /// Three players with 50 in each, pockets 0, 1, 2 worth the given strengths
    fn showdown(
        strengths: [u32; 3],
        pots: Vec<Pot>,
    ) -> (HashMap<PlayerId, Currency>, Vec<TestPlayer>) {
        let mut seats: Vec<_> = (1..=3)
            .map(|id| TestPlayer::new(id, 100, &[]))
            .collect();
        let eval = FixedEvaluator::new(&[
            (pocket(0)[0], strengths[0]),
            (pocket(1)[0], strengths[1]),
            (pocket(2)[0], strengths[2]),
        ]);
        let winnings = {
            let mut players = HandPlayers::new(&mut seats);
            for seat in 0..3 {
                players.deal_in(seat, pocket(seat));
                players.commit(seat as PlayerId + 1, 50);
            }
            let mut table = crate::hand::Table::new(players, HandConfig::default());
            let mut pots = pots;
            table.active = pots.pop().unwrap();
            table.frozen = pots;
            settle(&mut table, &board(), &eval)
        };
        (winnings, seats)
    }

    #[test]
    fn single_best_takes_it() {
        let pot = Pot {
            amount: 150,
            level: 50,
            eligible: vec![1, 2, 3],
        };
        let (w, seats) = showdown([3, 7, 5], vec![pot]);
        assert_eq!(w, [(2, 150)].into());
        assert_eq!(seats[1].holdings, 200);
        assert!(seats[1].coms.saw("YOU WIN\nWinnings: 100"));
        assert!(seats[0].coms.saw("YOU LOSE"));
        assert!(seats[2].coms.saw("YOU LOSE"));
        assert!(seats[0].coms.saw("You got Test3"));
        assert!(seats[0].coms.saw("p2 got Test7"));
    }

    #[test]
    fn two_way_tie_splits() {
        let pot = Pot {
            amount: 150,
            level: 50,
            eligible: vec![1, 2, 3],
        };
        let (w, seats) = showdown([7, 7, 5], vec![pot]);
        assert_eq!(w, [(1, 75), (2, 75)].into());
        assert!(seats[0].coms.saw("YOU DRAW\nWinnings: 25"));
        assert!(seats[1].coms.saw("YOU DRAW\nWinnings: 25"));
        assert!(seats[2].coms.saw("YOU LOSE"));
    }

    #[test]
    fn three_way_tie_odd_chip() {
        let pot = Pot {
            amount: 151,
            level: 50,
            eligible: vec![1, 2, 3],
        };
        let (w, _) = showdown([4, 4, 4], vec![pot]);
        assert_eq!(w, [(1, 51), (2, 50), (3, 50)].into());
    }

    #[test]
    fn side_pot_goes_to_its_own_contenders() {
        // player 1 is best but only eligible for the main pot
        let pots = vec![
            Pot {
                amount: 90,
                level: 30,
                eligible: vec![1, 2, 3],
            },
            Pot {
                amount: 60,
                level: 50,
                eligible: vec![2, 3],
            },
        ];
        let (w, seats) = showdown([9, 2, 6], pots);
        assert_eq!(w, [(1, 90), (3, 60)].into());
        assert!(seats[1].coms.saw("YOU LOSE"));
    }

    #[test]
    fn uncontested_pot_is_not_scored() {
        let pots = vec![
            Pot {
                amount: 90,
                level: 30,
                eligible: vec![1, 2],
            },
            Pot {
                amount: 60,
                level: 50,
                eligible: vec![3],
            },
        ];
        let (w, seats) = showdown([9, 2, 6], pots);
        assert_eq!(w, [(1, 90), (3, 60)].into());
        // player 3 had nobody to show to
        assert!(!seats[2].coms.sent.iter().any(|l| l.starts_with("You got")));
        assert!(!seats[0].coms.saw("p3 got Test6"));
    }

    #[test]
    fn winning_one_pot_alone_beats_sharing_another() {
        // 1 and 2 split the main pot, 2 also takes the side pot over 3
        let pots = vec![
            Pot {
                amount: 90,
                level: 30,
                eligible: vec![1, 2, 3],
            },
            Pot {
                amount: 60,
                level: 50,
                eligible: vec![2, 3],
            },
        ];
        let (w, seats) = showdown([9, 9, 2], pots);
        assert_eq!(w, [(1, 45), (2, 105)].into());
        assert!(seats[1].coms.saw("YOU WIN\nWinnings: 55"));
        assert!(!seats[1].coms.sent.iter().any(|l| l.starts_with("YOU DRAW")));
        assert!(seats[0].coms.saw("YOU DRAW\nWinnings: -5"));
        assert!(seats[2].coms.saw("YOU LOSE"));
    }

    #[test]
    fn getting_own_chips_back_is_a_loss() {
        let pots = vec![
            Pot {
                amount: 150,
                level: 50,
                eligible: vec![1, 2, 3],
            },
            Pot {
                amount: 40,
                level: 70,
                eligible: vec![3],
            },
        ];
        let (w, seats) = showdown([9, 2, 1], pots);
        assert_eq!(w, [(1, 150), (3, 40)].into());
        assert!(seats[0].coms.saw("YOU WIN\nWinnings: 100"));
        assert!(seats[2].coms.saw("YOU LOSE"));
        assert!(!seats[2].coms.sent.iter().any(|l| l.starts_with("YOU WIN")));
    }
}
