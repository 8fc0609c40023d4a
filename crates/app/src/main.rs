mod terminal;

use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{QuestionSet, TAIL_RESERVE_SECS, VideoId, extract_video_id, parse_question_document};
use services::{
    ApiKeySettings, Clock, ProgressStore, QuestionCache, QuestionProvider, QuizEngine,
    SimulatedPlayer,
};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingVideo,
    UnknownArg(String),
    InvalidVideoUrl { raw: String },
    InvalidDuration { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingVideo => write!(f, "a YouTube URL is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidVideoUrl { raw } => write!(f, "not a YouTube video URL: {raw}"),
            ArgsError::InvalidDuration { raw } => write!(f, "invalid --duration value: {raw}"),
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
    eprintln!("  cargo run -p app -- play <youtube_url> [--db <sqlite_url>] [--questions <file>]");
    eprintln!("                       [--duration <secs>] [--title <text>] [--description <text>]");
    eprintln!("                       [--practice]");
    eprintln!("  cargo run -p app -- keys --openai <key> --youtube <key> [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL,");
    eprintln!("  QUIZ_YOUTUBE_API_KEY, QUIZ_YOUTUBE_BASE_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Keys,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "keys" => Some(Self::Keys),
            _ => None,
        }
    }
}

struct PlayArgs {
    db_url: String,
    video_id: VideoId,
    questions_file: Option<PathBuf>,
    duration: Option<u32>,
    title: String,
    description: String,
    practice: bool,
}

struct KeysArgs {
    db_url: String,
    openai: String,
    youtube: String,
}

fn default_db_url() -> String {
    std::env::var("QUIZ_DB_URL")
        .ok()
        .map_or_else(|| normalize_sqlite_url("sqlite:quiz.sqlite3".into()), normalize_sqlite_url)
}

fn parse_db(args: &mut impl Iterator<Item = String>) -> Result<String, ArgsError> {
    let value = require_value(args, "--db")?;
    if value.trim().is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw: value });
    }
    Ok(normalize_sqlite_url(value))
}

impl PlayArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = default_db_url();
        let mut video_id = None;
        let mut questions_file = None;
        let mut duration = None;
        let mut title = String::new();
        let mut description = String::new();
        let mut practice = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = parse_db(args)?,
                "--questions" => questions_file = Some(PathBuf::from(require_value(args, "--questions")?)),
                "--duration" => {
                    let value = require_value(args, "--duration")?;
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDuration { raw: value.clone() })?;
                    duration = Some(parsed);
                }
                "--title" => title = require_value(args, "--title")?,
                "--description" => description = require_value(args, "--description")?,
                "--practice" => practice = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if !arg.starts_with("--") && video_id.is_none() => {
                    video_id = Some(
                        extract_video_id(&arg).ok_or(ArgsError::InvalidVideoUrl { raw: arg.clone() })?,
                    );
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            video_id: video_id.ok_or(ArgsError::MissingVideo)?,
            questions_file,
            duration,
            title,
            description,
            practice,
        })
    }
}

impl KeysArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = default_db_url();
        let mut openai = None;
        let mut youtube = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = parse_db(args)?,
                "--openai" => openai = Some(require_value(args, "--openai")?),
                "--youtube" => youtube = Some(require_value(args, "--youtube")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            openai: openai.ok_or(ArgsError::MissingValue { flag: "--openai" })?,
            youtube: youtube.ok_or(ArgsError::MissingValue { flag: "--youtube" })?,
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
            .unwrap_or_else(|_| PathBuf::from("."))
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

async fn open_storage(db_url: &str) -> Result<Storage, Box<dyn std::error::Error>> {
    prepare_sqlite_file(db_url)?;
    Ok(Storage::sqlite(db_url).await?)
}

/// Questions from a local `{ "questions": [...] }` file, redistributed when the
/// video length is known.
fn load_questions_file(path: &std::path::Path, duration: Option<u32>) -> Result<QuestionSet, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let questions = parse_question_document(&raw).map_err(quiz_core::Error::from)?;
    let set = match duration {
        Some(secs) => QuestionSet::distributed(questions, secs),
        None => QuestionSet::new(questions),
    }
    .map_err(quiz_core::Error::from)?;
    Ok(set)
}

/// Video length for the simulated player. Without a known length, leave the usual
/// tail after the last question.
fn playback_length(duration: Option<u32>, questions: &QuestionSet) -> u32 {
    duration.unwrap_or_else(|| {
        questions
            .as_slice()
            .last()
            .map_or(TAIL_RESERVE_SECS, |q| q.time().saturating_add(TAIL_RESERVE_SECS))
    })
}

async fn play(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(&args.db_url).await?;

    let questions = match &args.questions_file {
        Some(path) => load_questions_file(path, args.duration)?,
        None => {
            let keys = ApiKeySettings::new(storage.kv.clone()).load().await?;
            let provider = QuestionProvider::new(
                QuestionCache::new(storage.kv.clone()),
                keys.question_source()?,
            );
            provider
                .questions_for(&args.video_id, &args.title, &args.description)
                .await?
        }
    };

    let duration = playback_length(args.duration, &questions);
    if let Err(err) = questions.check_tail(duration) {
        tracing::warn!(%err, "question times crowd the end of the video");
    }

    let progress = ProgressStore::new(storage.kv.clone(), Clock::default_clock());
    let engine = QuizEngine::new(
        args.video_id,
        questions,
        SimulatedPlayer::new(duration),
        progress,
    )
    .with_practice_mode(args.practice);

    terminal::run(engine).await
}

async fn keys(args: KeysArgs) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(&args.db_url).await?;
    let settings = ApiKeySettings::new(storage.kv.clone());
    settings.configure(&args.openai, &args.youtube).await?;
    println!(
        "API keys saved (configured: {}).",
        settings.are_configured().await?
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default to `play` when the first argument is a URL or a flag.
    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).unwrap_or(Command::Play),
    };
    if argv.first().and_then(|a| Command::from_arg(a)).is_some() {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let report = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };
    match cmd {
        Command::Play => play(PlayArgs::parse(&mut iter).map_err(report)?).await,
        Command::Keys => keys(KeysArgs::parse(&mut iter).map_err(report)?).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
