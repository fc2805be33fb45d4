use std::fmt;
use std::time::Duration;

use arcade_core::model::{CellIndex, Level, LevelId};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use services::{Clock, GameSession, MemoryRound, Phase, RoundMachine, TriviaRound};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

const STEP: Duration = Duration::from_millis(250);

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidGame { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidSkill { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidGame { raw } => {
                write!(f, "invalid --game value: {raw} (expected trivia or memory)")
            }
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidSkill { raw } => {
                write!(f, "invalid --skill value: {raw} (expected 0.0 to 1.0)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--game trivia|memory] [--rounds <n>]");
    eprintln!("                      [--seed <u64>] [--skill <0.0-1.0>]");
    eprintln!();
    eprintln!("Plays rounds with a simulated player and records progress.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://arcade.sqlite3");
    eprintln!("  --game trivia");
    eprintln!("  --rounds 5");
    eprintln!("  --skill 0.8");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ARCADE_DB_URL, ARCADE_GAME, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Game {
    Trivia,
    Memory,
}

impl Game {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "trivia" => Some(Self::Trivia),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    game: Game,
    rounds: u32,
    seed: Option<u64>,
    skill: f64,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ARCADE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://arcade.sqlite3".into(), normalize_sqlite_url);
        let mut game = std::env::var("ARCADE_GAME")
            .ok()
            .and_then(|value| Game::from_arg(&value))
            .unwrap_or(Game::Trivia);
        let mut rounds = 5;
        let mut seed = None;
        let mut skill = 0.8;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--game" => {
                    let value = require_value(args, "--game")?;
                    game = Game::from_arg(&value).ok_or(ArgsError::InvalidGame { raw: value })?;
                }
                "--rounds" => {
                    let value = require_value(args, "--rounds")?;
                    rounds = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--rounds",
                        raw: value.clone(),
                    })?;
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = Some(value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--seed",
                        raw: value.clone(),
                    })?);
                }
                "--skill" => {
                    let value = require_value(args, "--skill")?;
                    skill = value
                        .parse::<f64>()
                        .ok()
                        .filter(|s| (0.0..=1.0).contains(s))
                        .ok_or(ArgsError::InvalidSkill { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            game,
            rounds,
            seed,
            skill,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

//
// ─── SIMULATED PLAYER ──────────────────────────────────────────────────────────
//

struct Player {
    rng: StdRng,
    skill: f64,
}

impl Player {
    fn new(seed: Option<u64>, skill: f64) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self { rng, skill }
    }

    fn machine_seed(&mut self) -> u64 {
        self.rng.random()
    }

    fn gets_it_right(&mut self) -> bool {
        self.rng.random_bool(self.skill)
    }

    fn think(&mut self, from_ms: u64, to_ms: u64) -> Duration {
        Duration::from_millis(self.rng.random_range(from_ms..=to_ms))
    }
}

/// Furthest unlocked level in catalog order.
fn pick_level<M: RoundMachine>(session: &GameSession<M>) -> Option<LevelId> {
    session
        .catalog()
        .levels()
        .iter()
        .rev()
        .map(Level::id)
        .find(|id| session.ledger().is_unlocked(*id))
}

async fn wait_until_playable<M: RoundMachine>(session: &mut GameSession<M>) {
    while matches!(session.machine().phase(), Phase::Countdown | Phase::Reveal) {
        session.advance(STEP).await;
    }
}

fn report<M: RoundMachine>(session: &GameSession<M>, round: u32) {
    let Some(result) = session.machine().result() else {
        return;
    };
    let outcome = session.last_outcome();
    println!(
        "round {round}: level {} {:?} score={} accuracy={:.0}% streak={} stars+{} unlocked={:?}",
        result.level(),
        result.outcome(),
        result.score(),
        result.accuracy(),
        result.highest_streak(),
        outcome.map_or(0, |o| o.new_stars),
        outcome.map(|o| o.newly_unlocked.clone()).unwrap_or_default(),
    );
}

fn summary<M: RoundMachine>(session: &GameSession<M>) {
    let ledger = session.ledger();
    println!(
        "rank: {} | stars: {} | rounds: {} | correct: {}/{}",
        ledger.rank().map_or("-", |r| r.title.as_str()),
        ledger.total_stars(),
        ledger.stats().rounds_played,
        ledger.stats().total_correct,
        ledger.stats().total_answered,
    );
}

async fn play_trivia(
    storage: &Storage,
    player: &mut Player,
    rounds: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = GameSession::trivia(storage, Clock::default()).await?;
    for round in 1..=rounds {
        session = session.with_machine(TriviaRound::with_seed(player.machine_seed()));
        session.open_level_select();
        let Some(level) = pick_level(&session) else {
            break;
        };
        session.select_level(level);
        wait_until_playable(&mut session).await;

        while session.machine().phase() == Phase::Active {
            let snapshot = session.snapshot();
            if snapshot.feedback.is_some() {
                session.next_question();
                continue;
            }
            let Some(question) = session.machine().current_question().cloned() else {
                break;
            };
            let delay = player.think(800, 6_000);
            session.advance(delay).await;
            if session.machine().phase() != Phase::Active || session.snapshot().feedback.is_some() {
                continue;
            }
            let wrong: Vec<&str> = question
                .options
                .iter()
                .filter(|o| !o.is_correct)
                .map(|o| o.id.as_str())
                .collect();
            let pick = if player.gets_it_right() {
                question.correct_option().map(|o| o.id.as_str())
            } else {
                wrong.choose(&mut player.rng).copied()
            };
            match pick {
                Some(id) => session.answer(id).await,
                None => session.skip().await,
            }
        }
        report(&session, round);
    }
    summary(&session);
    Ok(())
}

async fn play_memory(
    storage: &Storage,
    player: &mut Player,
    rounds: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = GameSession::memory(storage, Clock::default()).await?;
    for round in 1..=rounds {
        session = session.with_machine(MemoryRound::with_seed(player.machine_seed()));
        session.open_level_select();
        let Some(level) = pick_level(&session) else {
            break;
        };
        session.select_level(level);
        wait_until_playable(&mut session).await;

        while session.machine().phase() == Phase::Active {
            let delay = player.think(300, 1_500);
            session.advance(delay).await;
            if session.machine().phase() != Phase::Active {
                break;
            }
            let snapshot = session.snapshot();
            let Some(pattern) = session.machine().pattern() else {
                break;
            };
            let next = pattern
                .cells()
                .iter()
                .copied()
                .find(|c| !snapshot.found.contains(c) && !snapshot.missed.contains(c));
            let cell = if player.gets_it_right() {
                next
            } else {
                let cells = snapshot.grid_size * snapshot.grid_size;
                let misses: Vec<CellIndex> = (0..cells)
                    .map(CellIndex::new)
                    .filter(|c| !pattern.contains(*c) && !snapshot.wrong.contains(c))
                    .collect();
                misses.choose(&mut player.rng).copied()
            };
            match cell {
                Some(cell) => session.tap(cell).await,
                None => session.skip().await,
            }
        }
        report(&session, round);
    }
    summary(&session);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut iter = std::env::args().skip(1);
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    tracing::info!(db = %parsed.db_url, game = ?parsed.game, rounds = parsed.rounds, "autoplay");

    let mut player = Player::new(parsed.seed, parsed.skill);
    match parsed.game {
        Game::Trivia => play_trivia(&storage, &mut player, parsed.rounds).await,
        Game::Memory => play_memory(&storage, &mut player, parsed.rounds).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
