use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use quiz_core::model::{Progress, QuizId, RewardPolicy};
use services::{AppServices, Clock, QuestionView, QuizCatalog, QuizCompletion};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingQuizId,
    InvalidDbUrl { raw: String },
    InvalidPoints { raw: String },
    UnknownQuiz { id: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingQuizId => write!(f, "play requires a quiz id"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPoints { raw } => {
                write!(f, "invalid QUIZ_POINTS_PER_CORRECT value: {raw}")
            }
            ArgsError::UnknownQuiz { id } => write!(f, "no quiz with id `{id}` in the catalog"),
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
    eprintln!("  app list     [--catalog <path>]");
    eprintln!("  app play <quiz-id> [--catalog <path>] [--db <sqlite_url>]");
    eprintln!("  app progress [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --catalog quizzes.json");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_CATALOG, QUIZ_DB_URL, QUIZ_POINTS_PER_CORRECT, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Play,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "play" => Some(Self::Play),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    catalog: PathBuf,
    points_per_correct: u64,
    quiz_id: Option<QuizId>,
}

impl Args {
    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("QUIZ_DB_URL")
            .map_or_else(|| normalize_sqlite_url("quiz.sqlite3"), |v| normalize_sqlite_url(&v));
        let mut catalog = env("QUIZ_CATALOG").map_or_else(|| "quizzes.json".into(), PathBuf::from);
        let points_per_correct = match env("QUIZ_POINTS_PER_CORRECT") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ArgsError::InvalidPoints { raw })?,
            None => RewardPolicy::DEFAULT_POINTS_PER_CORRECT,
        };
        let mut quiz_id = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(&value);
                }
                "--catalog" => {
                    catalog = PathBuf::from(require_value(args, "--catalog")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if cmd == Command::Play && quiz_id.is_none() && !other.starts_with("--") => {
                    quiz_id = Some(QuizId::new(other));
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if cmd == Command::Play && quiz_id.is_none() {
            return Err(ArgsError::MissingQuizId);
        }

        Ok(Self {
            db_url,
            catalog,
            points_per_correct,
            quiz_id,
        })
    }
}

/// Turn a path or partial URL into an absolute `sqlite://` URL that creates
/// the file on first use.
fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.contains('?') {
        return trimmed.to_string();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}?mode=rwc", absolute.display())
}

fn print_question(view: &QuestionView) -> io::Result<()> {
    println!();
    println!("Question {} of {}: {}", view.number(), view.total, view.text);
    for option in &view.options {
        println!("  {}: {}", option.key, option.text);
    }
    print!("> ");
    io::stdout().flush()
}

fn print_progress(progress: &Progress) {
    let filled = usize::try_from(progress.level_progress() / 5).unwrap_or(0);
    println!(
        "Eco points: {} (level {}) [{}{}] {}%",
        progress.points(),
        progress.level(),
        "#".repeat(filled),
        "-".repeat(20 - filled),
        progress.level_progress()
    );
    if progress.badges().is_empty() {
        println!("Badges: none yet");
    } else {
        let names: Vec<&str> = progress.badges().iter().map(String::as_str).collect();
        println!("Badges: {}", names.join(", "));
    }
}

fn print_completion(done: &QuizCompletion) {
    println!();
    println!(
        "You scored {} / {} in {}s (+{} points)",
        done.summary.score(),
        done.summary.total(),
        done.summary.duration().num_seconds(),
        done.points_earned()
    );
    for badge in &done.new_badges {
        println!("You earned a new badge: {badge}!");
    }
    print_progress(&done.progress);
}

async fn play(app: &AppServices, quiz_id: &QuizId) -> Result<(), Box<dyn std::error::Error>> {
    let quiz = app
        .catalog()
        .get(quiz_id)
        .ok_or_else(|| ArgsError::UnknownQuiz {
            id: quiz_id.to_string(),
        })?;
    let quiz_loop = app.quiz_loop();
    println!("{}", quiz.title());
    let mut run = quiz_loop.start_quiz(quiz)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !run.is_complete() {
        let view = quiz_loop.current_question(&run)?;
        print_question(&view)?;

        let Some(line) = lines.next() else {
            println!();
            println!("Quiz abandoned.");
            return Ok(());
        };
        let key = line?.trim().to_string();
        if !view.has_option(&key) {
            println!("Unknown option `{key}`, pick one of the listed keys.");
            continue;
        }

        let outcome = quiz_loop.answer(&mut run, &key).await?;
        if outcome.correct {
            println!("Correct! +{}", outcome.points_awarded);
        } else {
            println!("Not quite.");
        }
        if let Some(done) = outcome.completion {
            print_completion(&done);
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            ArgsError::UnknownArg(first.clone())
        })?,
    };

    let parsed = Args::parse(cmd, &mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let policy = RewardPolicy::default().with_points_per_correct(parsed.points_per_correct);

    match cmd {
        Command::List => {
            let catalog = QuizCatalog::load(&parsed.catalog)?;
            if catalog.is_empty() {
                println!("No quizzes available yet.");
            }
            for quiz in catalog.quizzes() {
                println!("{}\t{} ({} questions)", quiz.id(), quiz.title(), quiz.len());
            }
            Ok(())
        }
        Command::Play => {
            let catalog = QuizCatalog::load(&parsed.catalog)?;
            let app =
                AppServices::new_sqlite(&parsed.db_url, Clock::default(), policy, catalog).await?;
            tracing::info!(db = %parsed.db_url, "progress store ready");
            match &parsed.quiz_id {
                Some(id) => play(&app, id).await,
                None => Err(ArgsError::MissingQuizId.into()),
            }
        }
        Command::Progress => {
            let app = AppServices::new_sqlite(
                &parsed.db_url,
                Clock::default(),
                policy,
                QuizCatalog::default(),
            )
            .await?;
            print_progress(&app.quiz_loop().progress().await);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so they never interleave with the quiz prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
