mod logger;
mod persistence;
mod render;

use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate, Utc};
use deckdungeon_core::{Action, CalendarDate, CardRef, EventBus, Phase, RngState, RunState};
use deckdungeon_data::load_or_builtin;
use persistence::{default_storage_dir, Storage};
use render::{
    drain_events, phase_label, print_deck, print_help, print_inventory, print_map,
    print_run_error, print_state, print_stats,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
struct CliOptions {
    seed: Option<u64>,
    daily: bool,
    fresh: bool,
    assets: Option<PathBuf>,
    home: Option<PathBuf>,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--daily" => options.daily = true,
            "--new" => options.fresh = true,
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--assets" => {
                if let Some(value) = args.get(idx + 1) {
                    options.assets = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--home" => {
                if let Some(value) = args.get(idx + 1) {
                    options.home = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            other => log::warn!("ignoring argument {other}"),
        }
        idx += 1;
    }
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    State,
    Map,
    Deck,
    Inventory,
    Stats,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Help,
    Quit,
    View(View),
    NewRun { daily: bool },
    Save(Option<PathBuf>),
    Load(Option<PathBuf>),
    Dispatch(Action),
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

fn calendar_date(date: NaiveDate) -> CalendarDate {
    CalendarDate::new(date.year(), date.month(), date.day())
}

/// The daily challenge follows the player's local calendar day.
fn today() -> CalendarDate {
    calendar_date(Local::now().date_naive())
}

fn parse_card_ref(arg: &str) -> CardRef {
    match arg.parse::<usize>() {
        Ok(idx) => CardRef::Index(idx),
        Err(_) => CardRef::Id(arg.to_string()),
    }
}

fn parse_index(arg: Option<&&str>, what: &str) -> Result<usize, String> {
    let raw = arg.ok_or_else(|| format!("missing {what}"))?;
    raw.parse::<usize>()
        .map_err(|_| format!("invalid {what} '{raw}'"))
}

fn parse_optional_index(arg: Option<&&str>, what: &str) -> Result<Option<usize>, String> {
    match arg {
        Some(_) => parse_index(arg, what).map(Some),
        None => Ok(None),
    }
}

fn required<'a>(arg: Option<&&'a str>, what: &str) -> Result<&'a str, String> {
    arg.copied().ok_or_else(|| format!("missing {what}"))
}

/// Turns one input line into a command. Words that mean different things in
/// different rooms (`heal`, `leave`) resolve against the current phase.
fn parse_command(line: &str, phase: Phase) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();
    let dispatch =
        |action: Action| -> Result<Option<Command>, String> { Ok(Some(Command::Dispatch(action))) };
    match cmd {
        "help" | "h" | "?" => Ok(Some(Command::Help)),
        "quit" | "exit" => Ok(Some(Command::Quit)),
        "state" | "s" => Ok(Some(Command::View(View::State))),
        "map" | "m" => Ok(Some(Command::View(View::Map))),
        "deck" => Ok(Some(Command::View(View::Deck))),
        "inv" | "inventory" => Ok(Some(Command::View(View::Inventory))),
        "stats" => Ok(Some(Command::View(View::Stats))),
        "new" => Ok(Some(Command::NewRun { daily: false })),
        "daily" => Ok(Some(Command::NewRun { daily: true })),
        "save" => Ok(Some(Command::Save(args.first().map(PathBuf::from)))),
        "load" => Ok(Some(Command::Load(args.first().map(PathBuf::from)))),
        "enter" | "e" => dispatch(Action::EnterNode {
            node_id: required(args.first(), "node id")?.to_string(),
        }),
        "play" | "p" => dispatch(Action::PlayCard {
            card: parse_card_ref(required(args.first(), "card")?),
            target: parse_optional_index(args.get(1), "enemy")?,
        }),
        "end" => dispatch(Action::EndTurn),
        "potion" => dispatch(Action::UsePotion {
            slot: parse_index(args.first(), "potion slot")?,
            target: parse_optional_index(args.get(1), "enemy")?,
        }),
        "pick" => dispatch(Action::ChooseCardReward {
            card_id: Some(required(args.first(), "card id")?.to_string()),
        }),
        "skip" => dispatch(Action::ChooseCardReward { card_id: None }),
        "heal" => match phase {
            Phase::Shop => dispatch(Action::ShopHeal),
            _ => dispatch(Action::RestHeal),
        },
        "upgrade" => dispatch(Action::RestUpgrade {
            card_id: required(args.first(), "card id")?.to_string(),
        }),
        "remove" => dispatch(Action::RestRemove {
            card_id: required(args.first(), "card id")?.to_string(),
            second: args.get(1).map(|id| id.to_string()),
        }),
        "purge" => dispatch(Action::ShopRemoveCard {
            card_id: required(args.first(), "card id")?.to_string(),
        }),
        "buy" => {
            let offer = parse_index(args.get(1), "offer")?;
            match args.first().copied() {
                Some("card") => dispatch(Action::BuyCard { offer }),
                Some("potion") => dispatch(Action::BuyPotion { offer }),
                _ => Err("usage: buy card|potion <idx>".to_string()),
            }
        }
        "choose" | "c" => dispatch(Action::ChooseEventOption {
            choice_id: required(args.first(), "option")?.to_string(),
            card_id: args.get(1).map(|id| id.to_string()),
        }),
        "collect" => dispatch(Action::CollectTreasure),
        "leave" => match phase {
            Phase::Event => dispatch(Action::LeaveEvent),
            _ => dispatch(Action::LeaveShop),
        },
        other => Err(format!("unknown command '{other}' (try help)")),
    }
}

struct Session {
    run: RunState,
    events: EventBus,
    storage: Option<Storage>,
    seed: Option<u64>,
    /// Set once the finished run has been written to the stats files.
    recorded: bool,
}

impl Session {
    fn start_run(&mut self, daily: bool) {
        self.run.rng = match self.seed {
            Some(seed) => RngState::from_seed(seed),
            None => RngState::from_entropy(),
        };
        let started_at_ms = now_ms();
        let action = if daily {
            Action::StartDailyChallenge {
                date: today(),
                started_at_ms,
            }
        } else {
            Action::StartNewGame { started_at_ms }
        };
        self.recorded = false;
        self.apply(action);
    }

    fn apply(&mut self, action: Action) {
        let is_load = matches!(action, Action::Load { .. });
        match self.run.dispatch(action, &mut self.events) {
            Ok(()) => {
                drain_events(&mut self.events);
                if is_load {
                    self.recorded = self.run.state.phase.is_terminal();
                }
                self.after_accepted();
            }
            Err(err) => print_run_error(&err),
        }
    }

    fn after_accepted(&mut self) {
        let phase = self.run.state.phase;
        if !phase.is_terminal() {
            if let Some(storage) = &self.storage {
                if let Err(err) = storage.save_game(&self.run.state) {
                    log::warn!("autosave failed: {err:#}");
                }
            }
            return;
        }
        if self.recorded {
            return;
        }
        self.recorded = true;
        let victory = phase == Phase::Victory;
        println!(
            "{}",
            if victory {
                "*** VICTORY ***"
            } else {
                "*** GAME OVER ***"
            }
        );
        let Some(storage) = &self.storage else {
            return;
        };
        let floors = self.run.config.map.floors;
        match storage.record_finished_run(&self.run.state, victory, floors, now_ms()) {
            Ok(Some(result)) => println!("daily score for {}: {}", result.date, result.score),
            Ok(None) => {}
            Err(err) => log::warn!("record run failed: {err:#}"),
        }
        println!("type `new` or `daily` to play again");
    }

    fn save(&mut self, path: Option<PathBuf>) {
        if let Err(err) = self.run.dispatch(Action::Save, &mut self.events) {
            print_run_error(&err);
            return;
        }
        let Some(storage) = &self.storage else {
            println!("save path unavailable");
            return;
        };
        let path = path.unwrap_or_else(|| storage.save_path());
        match storage.save_game_to(&self.run.state, &path) {
            Ok(()) => println!("saved: {}", path.display()),
            Err(err) => println!("error: {err:#}"),
        }
    }

    fn load(&mut self, path: Option<PathBuf>) {
        let Some(storage) = &self.storage else {
            println!("save path unavailable");
            return;
        };
        let path = path.unwrap_or_else(|| storage.save_path());
        match storage.load_game_from(&path) {
            Some(state) => {
                self.apply(Action::Load {
                    state: Box::new(state),
                });
                println!("loaded: {}", path.display());
            }
            None => println!("no usable save at {}", path.display()),
        }
    }

    fn show(&self, view: View) {
        match view {
            View::State => print_state(&self.run),
            View::Map => print_map(&self.run),
            View::Deck => print_deck(&self.run),
            View::Inventory => print_inventory(&self.run),
            View::Stats => match &self.storage {
                Some(storage) => {
                    print_stats(&storage.load_stats(), &storage.load_daily_results())
                }
                None => println!("stats unavailable"),
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    let (config, content) =
        load_or_builtin(options.assets.as_deref()).context("load game data")?;
    let storage = options
        .home
        .clone()
        .or_else(default_storage_dir)
        .map(Storage::new);
    if let Some(storage) = &storage {
        log::debug!("storage directory {}", storage.dir().display());
    }

    let mut session = Session {
        run: RunState::new(config, content, RngState::from_entropy()),
        events: EventBus::default(),
        storage,
        seed: options.seed,
        recorded: false,
    };

    let resumed = match (&session.storage, options.fresh || options.daily) {
        (Some(storage), false) => storage.load_game(),
        _ => None,
    };
    match resumed {
        Some(state) => {
            println!("resuming saved run");
            session.apply(Action::Load {
                state: Box::new(state),
            });
        }
        None => session.start_run(options.daily),
    }

    print_help();
    print_state(&session.run);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("[{}] > ", phase_label(session.run.state.phase));
        io::stdout().flush().context("flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read stdin")?;
        let command = match parse_command(line.trim(), session.run.state.phase) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("error: {err}");
                continue;
            }
        };
        match command {
            Command::Help => print_help(),
            Command::Quit => break,
            Command::View(view) => session.show(view),
            Command::NewRun { daily } => {
                session.start_run(daily);
                print_state(&session.run);
            }
            Command::Save(path) => session.save(path),
            Command::Load(path) => {
                session.load(path);
                print_state(&session.run);
            }
            Command::Dispatch(action) => {
                let before = session.run.state.phase;
                session.apply(action);
                if session.run.state.phase != before || before == Phase::Combat {
                    print_state(&session.run);
                }
            }
        }
    }
    Ok(())
}
