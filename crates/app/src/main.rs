use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use services::{
    AppServices, CheckOutcome, FeedbackCue, FeedbackSink, Phase, SessionController, TimerOutcome,
    TokioTimer,
};

mod command;
mod render;

use command::{Command, HELP};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
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
    eprintln!("  cargo run -p app -- [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://order.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ORDER_DB_URL, ORDER_LOG (falls back to RUST_LOG)");
}

struct Args {
    db_url: String,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ORDER_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://order.sqlite3".into(), normalize_sqlite_url);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
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

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ORDER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Rings the terminal bell when a level is solved.
struct TerminalBell;

impl FeedbackSink for TerminalBell {
    fn play(&self, cue: FeedbackCue) {
        match cue {
            FeedbackCue::LevelSolved => print!("\x07"),
            FeedbackCue::CardMoved => debug!("card moved cue"),
        }
    }
}

/// Apply one line of input. Returns `false` once the player quits.
async fn handle_line(controller: &mut SessionController, line: &str) -> bool {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(err) => {
            println!("{err}");
            return true;
        }
    };

    let result = match command {
        Command::Levels => {
            print!("{}", render::levels(&controller.level_select()));
            Ok(())
        }
        Command::Play(level_id) => controller
            .start(level_id)
            .map(|snapshot| print!("{}", render::board(&snapshot))),
        // Outside play the controller reports the phase, so slots go through unchecked.
        Command::Move { from, to } if controller.phase() != Phase::Playing => controller
            .move_card(from - 1, to - 1)
            .map(|snapshot| print!("{}", render::board(&snapshot))),
        Command::Move { from, to } => {
            match command::list_move(from, to, controller.snapshot().cards.len()) {
                Ok((from, destination)) => controller
                    .move_card(from, destination)
                    .map(|snapshot| print!("{}", render::board(&snapshot))),
                Err(err) => {
                    println!("{err}");
                    Ok(())
                }
            }
        }
        Command::Check => match controller.check().await {
            Ok(CheckOutcome::Solved(win)) => {
                print!("{}", render::win_summary(&win));
                Ok(())
            }
            Ok(CheckOutcome::Incorrect { incorrect }) => {
                println!("Not yet: {} cards are out of place.", incorrect.len());
                print!("{}", render::board(&controller.snapshot()));
                Ok(())
            }
            Err(err) => Err(err),
        },
        Command::Hint => controller
            .request_hint()
            .await
            .map(|hint| print!("{}", render::hint(&hint))),
        Command::Retry => controller
            .retry()
            .map(|snapshot| print!("{}", render::board(&snapshot))),
        Command::Next => controller
            .advance()
            .map(|snapshot| print!("{}", render::board(&snapshot))),
        Command::Exit => {
            let snapshot = controller.exit();
            print!("{}", render::board(&snapshot));
            Ok(())
        }
        Command::Status => {
            print!("{}", render::board(&controller.snapshot()));
            Ok(())
        }
        Command::Reset => {
            controller.reset_progress().await;
            println!("Progress cleared.");
            Ok(())
        }
        Command::Sound(enabled) => {
            let settings = controller.set_sound_enabled(enabled).await;
            let state = if settings.sound_enabled() { "on" } else { "off" };
            println!("Sound {state}.");
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => return false,
    };

    if let Err(err) = result {
        println!("{err}");
    }
    true
}

fn handle_timer_outcome(controller: &SessionController, outcome: TimerOutcome) {
    match outcome {
        TimerOutcome::TimedOut => print!("{}", render::board(&controller.snapshot())),
        TimerOutcome::Ticked { remaining } if remaining <= 5 || remaining % 10 == 0 => {
            println!("{remaining}s left");
        }
        TimerOutcome::HighlightCleared
        | TimerOutcome::Ticked { .. }
        | TimerOutcome::Ignored => {}
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url).await?;
    info!(db = %parsed.db_url, "storage ready");

    let (timer, mut events) = TokioTimer::new(Handle::current());
    let mut controller = services
        .controller(Arc::new(timer), Arc::new(TerminalBell))
        .await;

    println!("Order the Cards");
    if !controller.settings().has_seen_onboarding() {
        println!("Put the cards in the right order before the 30 second clock runs out.");
        println!("{HELP}");
        controller.mark_onboarding_seen().await;
    }
    print!("{}", render::levels(&controller.level_select()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !handle_line(&mut controller, &line).await {
                    break;
                }
            }
            Some(event) = events.recv() => {
                let outcome = controller.handle_timer(event);
                handle_timer_outcome(&controller, outcome);
            }
        }
    }

    controller.exit();
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
