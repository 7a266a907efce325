use std::fmt;
use std::io::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use chem_core::model::{ModuleKey, Percent, Principal, UserId};
use services::progress::{PercentSource, ProgressService, RecordOutcome};
use services::quiz::{HighScoreOutcome, QuizService, QuizState, RunAdvance, Selection};
use services::{Clock, QuizError};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidModule { raw: String },
    InvalidPercent { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidModule { raw } => write!(f, "unknown module: {raw}"),
            ArgsError::InvalidPercent { raw } => {
                write!(f, "invalid percent (expected 0..=100): {raw}")
            }
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    principal: Option<Principal>,
    record: Option<(ModuleKey, Percent)>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("CHEM_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user_id = std::env::var("CHEM_USER_ID").ok();
        let mut email = std::env::var("CHEM_USER_EMAIL").ok();
        let mut record = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    user_id = Some(require_value(args, "--user")?);
                }
                "--email" => {
                    email = Some(require_value(args, "--email")?);
                }
                "--record" => {
                    let module = require_value(args, "--record")?;
                    let module = ModuleKey::from_str(&module)
                        .map_err(|_| ArgsError::InvalidModule { raw: module })?;
                    let raw = require_value(args, "--record")?;
                    let percent = raw
                        .parse::<u8>()
                        .ok()
                        .and_then(|value| Percent::new(value).ok())
                        .ok_or(ArgsError::InvalidPercent { raw })?;
                    record = Some((module, percent));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let principal = match (user_id, email) {
            (Some(id), Some(email)) => Some(Principal::new(UserId::new(id), email)),
            (Some(id), None) => {
                let email = format!("{id}@example.com");
                Some(Principal::new(UserId::new(id), email))
            }
            _ => None,
        };

        Ok(Self {
            db_url,
            principal,
            record,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz     [--db <sqlite_url>] [--user <id>] [--email <addr>]");
    eprintln!("  cargo run -p app -- progress [--db <sqlite_url>] [--user <id>] [--email <addr>]");
    eprintln!("                               [--record <module> <percent>]");
    eprintln!();
    eprintln!("Modules:");
    for module in ModuleKey::ALL {
        eprintln!("  {:<18} {}", module.as_str(), module.title());
    }
    eprintln!();
    eprintln!("Without --user the app runs signed out: progress stays in the local");
    eprintln!("cache and quiz scores are not saved.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CHEM_DB_URL, CHEM_USER_ID, CHEM_USER_EMAIL");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let clock = Clock::default_clock();

    match cmd {
        Command::Quiz => run_quiz(&storage, clock, args.principal).await,
        Command::Progress => run_progress(&storage, clock, args.principal, args.record).await,
    }
}

async fn run_progress(
    storage: &Storage,
    clock: Clock,
    principal: Option<Principal>,
    record: Option<(ModuleKey, Percent)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut progress = ProgressService::new(
        clock,
        Arc::clone(&storage.documents),
        Arc::clone(&storage.cache),
        principal,
    );

    if let Some((module, percent)) = record {
        match progress.record(module, percent).await {
            RecordOutcome::Advanced => println!("{module}: recorded {percent}"),
            RecordOutcome::Ignored => {
                println!("{module}: {percent} does not beat the stored value, ignored");
            }
        }
    }

    println!();
    for module in ModuleKey::ALL {
        let loaded = progress.load(module).await;
        let source = match loaded.source() {
            PercentSource::Remote => "remote",
            PercentSource::Cache => "cache",
            PercentSource::Default => "none",
        };
        println!(
            "  {:<20} {:>4}  ({source})",
            module.title(),
            loaded.percent().to_string()
        );
    }
    println!();
    println!("  overall: {}", progress.overall_progress());

    Ok(())
}

async fn run_quiz(
    storage: &Storage,
    clock: Clock,
    principal: Option<Principal>,
) -> Result<(), Box<dyn std::error::Error>> {
    let signed_in = principal.is_some();
    let quiz = QuizService::new(
        clock,
        Arc::clone(&storage.questions),
        Arc::clone(&storage.documents),
        principal,
    );

    let best = quiz.high_score().await;
    if best > 0 {
        println!("Current high score: {best}");
    }

    let mut session = quiz.new_session();
    let drawn = quiz.start(&mut session).await?;
    if drawn == 0 {
        eprintln!("The question pool is empty; run the seed binary first.");
        return Ok(());
    }
    println!("Starting a {drawn}-question quiz. Answer with the choice number.");

    let stdin = std::io::stdin();
    while session.state() == QuizState::InProgress {
        let Some(question) = session.current_question() else {
            break;
        };
        let index = session.current_index().unwrap_or(0);
        println!();
        println!("[{}/{}] {}", index + 1, drawn, question.prompt());
        for (i, answer) in question.answers().iter().enumerate() {
            println!("  {}. {}", i + 1, answer.text());
        }
        let explanation = question.explanation().to_owned();

        let picked = loop {
            print!("> ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            if stdin.read_line(&mut line)? == 0 {
                println!();
                println!("Quiz abandoned.");
                return Ok(());
            }
            match line.trim().parse::<usize>() {
                Ok(n) if n >= 1 => break n - 1,
                _ => println!("Enter a choice number."),
            }
        };

        match session.select_answer(picked) {
            Ok(Selection::Recorded { correct }) => {
                if correct {
                    println!("Correct!");
                } else {
                    println!("Not quite.");
                }
                println!("{explanation}");
            }
            Ok(Selection::AlreadyAnswered) => {}
            Err(QuizError::InvalidAnswer(_)) => {
                println!("That choice does not exist.");
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        if let RunAdvance::Finished {
            correct_count,
            final_score,
            high_score,
        } = quiz.advance(&mut session).await?
        {
            println!();
            println!(
                "Done: {correct_count}/{drawn} correct, final score {final_score} of {}.",
                session.config().max_score()
            );

            match high_score {
                HighScoreOutcome::NewHighScore { score } => {
                    println!("New high score: {score}!");
                }
                HighScoreOutcome::Unchanged { best } => {
                    println!("High score stays at {best}.");
                }
                HighScoreOutcome::NotSaved => {
                    if signed_in {
                        println!("Score could not be saved this time.");
                    } else {
                        println!("Sign in with --user to save scores.");
                    }
                }
            }
        }
    }

    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
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

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
