use std::cell::Cell;
use std::error::Error;
use std::io::{stdin, stdout, BufRead, Write};
use std::rc::Rc;
use std::time::Duration;

use holdem_core::cards::{Card, DeckSeed, RankEvaluator, StandardDeck};
use holdem_core::log::LogItem;
use holdem_core::player::{Coms, Player};
use holdem_core::{Currency, Hand, HandConfig, PlayerId, SeqNum};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(about = "Play hold'em hands hot-seat, every player on this terminal")]
struct Opt {
    #[structopt(short, default_value = "3")]
    n_players: u8,
    #[structopt(long, default_value = "1000")]
    start_stack: Currency,
    #[structopt(long, default_value = "5")]
    small_blind: Currency,
    #[structopt(long, default_value = "10")]
    big_blind: Currency,
    #[structopt(long, default_value = "0", help = "Seat of the first player to act")]
    start_seat: usize,
    #[structopt(long, default_value)]
    seed: DeckSeed,
    #[structopt(
        long,
        help = "Silence game prompts (useful for tests with set input)"
    )]
    no_prompts: bool,
    #[structopt(long, help = "Print every hand event as it happens")]
    events: bool,
    #[structopt(
        long,
        help = "Keep playing new hands until quit command is given"
    )]
    multi_round: bool,
}

fn print_help() {
    println!("Known commands are:");
    for (cmds, desc) in [
        ("(h)elp", "This output."),
        ("(q)uit", "Fold and stop playing after this hand."),
        ("Fold", "Current player folds."),
        ("Call", "Current player matches the current bet, or goes all in trying."),
        ("Raise X", "Current player calls and then puts in X more."),
    ] {
        println!("  {:9}: {}", cmds, desc);
    }
    println!("Lines starting with # are ignored.");
}

/// One player's view of the shared terminal.
struct Console {
    name: String,
    display_prompts: bool,
    quit: Rc<Cell<bool>>,
}

impl Console {
    fn read_line(&self) -> Result<Option<String>, Box<dyn Error>> {
        if self.display_prompts {
            print!("{}> ", self.name);
            stdout().flush()?;
        }
        let mut s = String::new();
        if stdin().lock().read_line(&mut s)? == 0 {
            return Ok(None);
        }
        Ok(Some(s.trim().to_string()))
    }
}

impl Coms for Console {
    fn send_line(&mut self, line: &str) {
        if self.display_prompts {
            for l in line.lines() {
                println!("[{}] {}", self.name, l);
            }
        }
    }

    fn send_hole_cards(&mut self, cards: [Card; 2]) {
        self.send_line(&format!("Your cards: {} {}", cards[0], cards[1]));
    }

    fn send_reveal(&mut self, cards: &[Card]) {
        let shown: Vec<String> = cards.iter().map(|c| c.to_string()).collect();
        self.send_line(&format!("Revealed: {}", shown.join(" ")));
    }

    fn recv_action(&mut self, _timeout: Duration) -> String {
        loop {
            if self.quit.get() {
                return "Fold".to_string();
            }
            let line = match self.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.quit.set(true);
                    continue;
                }
                Err(e) => {
                    ::log::error!("unable to read from stdin: {e}");
                    self.quit.set(true);
                    continue;
                }
            };
            match line.as_str() {
                "" => {}
                l if l.starts_with('#') => {}
                "h" | "help" => print_help(),
                "q" | "quit" => self.quit.set(true),
                _ => return line,
            }
        }
    }
}

struct Seat {
    id: PlayerId,
    name: String,
    holdings: Currency,
    console: Console,
}

impl Player for Seat {
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
        self.holdings -= amount;
    }

    fn credit(&mut self, amount: Currency) {
        self.holdings += amount;
    }

    fn coms(&mut self) -> &mut dyn Coms {
        &mut self.console
    }
}

fn print_event(seq: SeqNum, item: &LogItem) {
    println!("  #{seq:<3} {item}");
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let opt = Opt::from_args();
    let config = HandConfig::new(opt.small_blind, opt.big_blind);
    config.validate()?;

    let quit = Rc::new(Cell::new(false));
    let mut seats: Vec<Seat> = (1..=opt.n_players)
        .map(|n| Seat {
            id: n.into(),
            name: format!("Player{n}"),
            holdings: opt.start_stack,
            console: Console {
                name: format!("Player{n}"),
                display_prompts: !opt.no_prompts,
                quit: Rc::clone(&quit),
            },
        })
        .collect();
    if !opt.no_prompts {
        println!(
            "{} players seated with {} each",
            opt.n_players, opt.start_stack
        );
    }

    let mut seed = opt.seed;
    let mut start_seat = opt.start_seat;
    let mut hand_num = 0;
    loop {
        seats.retain(|s| s.holdings > 0);
        if seats.len() < 2 {
            println!("Not enough players with chips left");
            break;
        }
        hand_num += 1;
        start_seat %= seats.len();
        if !opt.no_prompts {
            println!("--- Begin hand {:2} ---", hand_num);
            println!("DeckSeed: {}", seed);
        }
        let mut deck = StandardDeck::new(&seed);
        let mut hand = Hand::new(&mut seats, &mut deck, &RankEvaluator, start_seat, config)?;
        if opt.events {
            hand.subscribe(print_event);
        }
        let summary = hand.run()?;
        ::log::info!("hand {hand_num} over: {:?}", summary.resolution);

        for s in seats.iter() {
            let won = summary.winnings.get(&s.id).copied().unwrap_or(0);
            println!("{:>10} [{:>8}] won {}", s.name, s.holdings, won);
        }
        if quit.get() || !opt.multi_round {
            break;
        }
        seed = DeckSeed::default();
        start_seat += 1;
    }
    Ok(())
}
