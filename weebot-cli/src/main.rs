//! weebot — command-line interview practice client
//!
//! Talks to the WeeBot gateway over HTTP for questions, analysis and tips, and
//! keeps completed practice sessions in a local file-backed session log.
//!
//! # Subcommands
//! - `question` / `analyze-response` / `analyze-communication` / `analyze-code` / `tips`
//!   — one gateway call each
//! - `record coding|communication` — append a finished session to the log
//! - `sessions list|show|delete|stats` — query the log
//! - `status` — show gateway health

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use weebot_core::{
    CodingSession, CommunicationSession, FileKeyValueStore, Session, SessionKind, SessionStats,
    SessionStore, WeebotConfig, WriteOutcome,
};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "weebot", version, about = "WeeBot interview practice client")]
struct Cli {
    /// Gateway URL (overrides WEEBOT_HTTP_URL env var)
    #[arg(long, env = "WEEBOT_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Directory holding the local session log [default: storage.data_dir from config]
    #[arg(long, env = "WEEBOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file supplying `[storage] data_dir`
    #[arg(long, env = "WEEBOT_CONFIG", default_value = "weebot.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate the next behavioral interview question
    Question {
        /// Role or focus for the question
        #[arg(long, default_value = "")]
        context: String,

        /// 1-based question number
        #[arg(short = 'n', long, default_value_t = 1)]
        number: u32,

        /// Total questions in the round
        #[arg(short = 't', long, default_value_t = 3)]
        total: u32,
    },

    /// Score one answer against its question
    AnalyzeResponse {
        #[arg(long)]
        question: String,

        #[arg(long, conflicts_with = "transcript_file")]
        transcript: Option<String>,

        #[arg(long)]
        transcript_file: Option<PathBuf>,
    },

    /// Communication metrics for a transcript
    AnalyzeCommunication {
        #[arg(long, conflicts_with = "transcript_file")]
        transcript: Option<String>,

        #[arg(long)]
        transcript_file: Option<PathBuf>,
    },

    /// Review a solution file
    AnalyzeCode {
        #[arg(long)]
        language: String,

        /// Source file to analyze
        #[arg(long)]
        file: PathBuf,

        /// Problem statement the code solves
        #[arg(long, default_value = "")]
        problem: String,
    },

    /// Improvement tips
    Tips {
        /// communication or coding
        #[arg(long)]
        category: String,

        #[arg(long)]
        level: Option<String>,
    },

    /// Append a finished practice session to the local log
    Record {
        #[command(subcommand)]
        session: RecordCommand,
    },

    /// Query the local session log
    Sessions {
        #[command(subcommand)]
        action: SessionsCommand,
    },

    /// Show gateway status
    Status,
}

#[derive(Debug, Subcommand)]
enum RecordCommand {
    Coding {
        #[arg(long)]
        solved: u32,

        #[arg(long)]
        total: u32,

        /// Seconds spent
        #[arg(long)]
        duration: u64,
    },
    Communication {
        /// Seconds spent
        #[arg(long)]
        duration: u64,

        #[arg(long)]
        transcript_file: Option<PathBuf>,

        /// Question asked (repeatable, in order)
        #[arg(long = "question")]
        questions: Vec<String>,

        #[arg(long, default_value_t = 0)]
        answered: u32,

        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        score: Option<u8>,
    },
}

#[derive(Debug, Subcommand)]
enum SessionsCommand {
    List {
        #[arg(long, value_parser = parse_kind)]
        kind: Option<SessionKind>,

        /// Print the raw records as a JSON array
        #[arg(long)]
        json: bool,
    },
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
    Stats {
        #[arg(long, value_parser = parse_kind)]
        kind: Option<SessionKind>,
    },
}

fn parse_kind(s: &str) -> Result<SessionKind, String> {
    s.parse()
}

// ============================================================================
// Gateway calls
// ============================================================================

fn gateway_client() -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()?)
}

/// POST a JSON body to a gateway endpoint. Returns the status and parsed body;
/// only transport failures and non-JSON replies are errors.
fn post_gateway(
    server: &str,
    endpoint: &str,
    body: Value,
) -> anyhow::Result<(reqwest::StatusCode, Value)> {
    let url = format!("{}/{}", server, endpoint);
    let resp = gateway_client()?
        .post(&url)
        .json(&body)
        .send()
        .with_context(|| format!("connection failed to {}", url))?;

    let status = resp.status();
    let body: Value = resp
        .json()
        .with_context(|| format!("{} returned a non-JSON body (HTTP {})", url, status))?;
    Ok((status, body))
}

/// Bail on 4xx/5xx; warn when the gateway served its canned payload.
fn check_reply(status: reqwest::StatusCode, body: &Value) -> anyhow::Result<()> {
    let error = body["error"].as_str();
    if !status.is_success() {
        bail!(
            "gateway returned {}: {}",
            status,
            error.unwrap_or("unknown error")
        );
    }
    if let Some(e) = error {
        eprintln!("weebot: {} (showing default content)", e);
    }
    Ok(())
}

fn read_text(inline: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display())),
        (None, None) => bail!("provide --transcript or --transcript-file"),
    }
}

fn print_list(title: &str, items: &Value) {
    println!("{}:", title);
    for item in items.as_array().into_iter().flatten() {
        println!("  - {}", item.as_str().unwrap_or_default());
    }
}

fn do_question(server: &str, context: &str, number: u32, total: u32) -> anyhow::Result<()> {
    let (status, body) = post_gateway(
        server,
        "generate-question",
        json!({ "context": context, "questionNumber": number, "totalQuestions": total }),
    )?;
    check_reply(status, &body)?;
    println!("{}", body["question"].as_str().unwrap_or_default());
    Ok(())
}

fn do_analyze_response(server: &str, question: &str, transcript: &str) -> anyhow::Result<()> {
    let (status, body) = post_gateway(
        server,
        "analyze-response",
        json!({ "question": question, "transcript": transcript }),
    )?;
    check_reply(status, &body)?;

    let analysis = &body["analysis"];
    println!("Score: {}", analysis["score"]);
    print_list("Strengths", &analysis["strengths"]);
    print_list("Improvements", &analysis["improvements"]);
    println!("\n{}", analysis["feedback"].as_str().unwrap_or_default());
    Ok(())
}

fn do_analyze_communication(server: &str, transcript: &str) -> anyhow::Result<()> {
    let (status, body) = post_gateway(
        server,
        "analyze-communication",
        json!({ "transcript": transcript }),
    )?;
    check_reply(status, &body)?;

    let m = &body["metrics"];
    println!("Communication: {}", m["communicationSkills"]);
    println!("Vocabulary:    {}", m["vocabulary"]);
    println!("Confidence:    {}", m["confidence"]);
    println!("Body language: {}", m["bodyLanguage"]);
    println!("Clarity:       {}", m["clarity"]);
    Ok(())
}

fn do_analyze_code(server: &str, language: &str, code: &str, problem: &str) -> anyhow::Result<()> {
    let (status, body) = post_gateway(
        server,
        "analyze-code",
        json!({ "code": code, "language": language, "problemDescription": problem }),
    )?;
    check_reply(status, &body)?;

    let a = &body["analysis"];
    println!("Code quality: {}", a["codeQuality"]);
    println!("Efficiency:   {}", a["efficiency"]);
    println!("Readability:  {}", a["readability"]);
    print_list("Suggestions", &a["suggestions"]);
    print_list("Optimizations", &a["optimizations"]);
    Ok(())
}

fn do_tips(server: &str, category: &str, level: Option<&str>) -> anyhow::Result<()> {
    let mut req = json!({ "category": category });
    if let Some(level) = level {
        req["skillLevel"] = json!(level);
    }
    let (status, body) = post_gateway(server, "generate-tips", req)?;
    check_reply(status, &body)?;

    for (i, tip) in body["tips"].as_array().into_iter().flatten().enumerate() {
        println!("{}. {}", i + 1, tip.as_str().unwrap_or_default());
    }
    Ok(())
}

/// Show the gateway status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server);
    let resp = client
        .get(&url)
        .send()
        .with_context(|| format!("cannot reach {}", url))?;

    if !resp.status().is_success() {
        bail!("gateway unhealthy (HTTP {})", resp.status());
    }

    let body: Value = resp.json().unwrap_or_default();
    println!("WeeBot gateway: {}", body["status"].as_str().unwrap_or("unknown"));
    println!("Version:        {}", body["version"].as_str().unwrap_or("?"));
    println!("Generator:      {}", body["generator"].as_str().unwrap_or("?"));
    println!("Model:          {}", body["model"].as_str().unwrap_or("?"));
    Ok(())
}

// ============================================================================
// Session log
// ============================================================================

/// `--data-dir` / `WEEBOT_DATA_DIR` win; otherwise `storage.data_dir` from the
/// config file and its `WEEBOT__STORAGE__DATA_DIR` override.
fn resolve_data_dir(flag: Option<PathBuf>, config_path: &str) -> anyhow::Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    let config = WeebotConfig::load(config_path)
        .with_context(|| format!("failed to load config from {}", config_path))?;
    Ok(PathBuf::from(config.storage.data_dir))
}

fn open_store(data_dir: &Path) -> anyhow::Result<SessionStore> {
    let kv = FileKeyValueStore::open(data_dir)
        .with_context(|| format!("cannot open data dir {}", data_dir.display()))?;
    Ok(SessionStore::new(Arc::new(kv)))
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn do_record(store: &SessionStore, cmd: RecordCommand) -> anyhow::Result<()> {
    let now = chrono::Utc::now();
    let session: Session = match cmd {
        RecordCommand::Coding {
            solved,
            total,
            duration,
        } => {
            if total == 0 {
                bail!("--total must be at least 1");
            }
            CodingSession::from_progress(new_session_id(), now, duration, solved, total).into()
        }
        RecordCommand::Communication {
            duration,
            transcript_file,
            questions,
            answered,
            score,
        } => {
            let transcript = match transcript_file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("cannot read {}", path.display()))?,
                None => String::new(),
            };
            CommunicationSession::new(
                new_session_id(),
                now,
                duration,
                transcript,
                questions,
                answered,
                score,
            )
            .into()
        }
    };

    let line = session_line(&session);
    match store.save_session(session) {
        WriteOutcome::Written => {
            println!("Saved {}", line);
            Ok(())
        }
        WriteOutcome::Failed { reason } => bail!("session not saved: {}", reason),
        other => bail!("session not saved: {:?}", other),
    }
}

fn do_sessions(store: &SessionStore, action: SessionsCommand) -> anyhow::Result<()> {
    match action {
        SessionsCommand::List { kind, json } => {
            let sessions = match kind {
                Some(k) => store.sessions_by_kind(k),
                None => store.sessions(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                eprintln!("No sessions recorded yet");
            } else {
                for s in &sessions {
                    println!("{}", session_line(s));
                }
            }
        }
        SessionsCommand::Show { id } => match store.session_by_id(&id) {
            Some(s) => println!("{}", serde_json::to_string_pretty(&s)?),
            None => bail!("no session with id {}", id),
        },
        SessionsCommand::Delete { id } => match store.delete_session(&id) {
            WriteOutcome::Written => println!("Deleted {}", id),
            WriteOutcome::Unchanged => eprintln!("No session with id {}", id),
            WriteOutcome::Failed { reason } => bail!("delete failed: {}", reason),
            WriteOutcome::Unavailable => bail!("no session storage available"),
        },
        SessionsCommand::Stats { kind } => {
            print!("{}", stats_report(&store.stats(kind)));
        }
    }
    Ok(())
}

/// `12m 05s`, or `45s` under a minute.
pub fn format_duration(seconds: u64) -> String {
    let (m, s) = (seconds / 60, seconds % 60);
    if m == 0 {
        format!("{}s", s)
    } else {
        format!("{}m {:02}s", m, s)
    }
}

/// One-line summary used by `sessions list` and `record`.
pub fn session_line(session: &Session) -> String {
    let score = session
        .score()
        .map(|s| format!("{}%", s))
        .unwrap_or_else(|| "—".to_string());
    let detail = match session {
        Session::Communication(c) => format!(
            "{}/{} answered",
            c.questions_answered,
            c.questions.len()
        ),
        Session::Coding(c) => format!("{}/{} solved", c.problems_solved, c.total_problems),
    };
    format!(
        "{} {:<13} {} {:>8} score {:>4} {}",
        session.date().format("%Y-%m-%d %H:%M"),
        session.kind(),
        session.id(),
        format_duration(session.duration()),
        score,
        detail
    )
}

pub fn stats_report(stats: &SessionStats) -> String {
    format!(
        "Sessions:      {}\nTotal time:    {}\nAverage score: {}%\n",
        stats.total_sessions,
        format_duration(stats.total_duration),
        stats.average_score
    )
}

// ============================================================================
// Main
// ============================================================================

fn run(cli: Cli) -> anyhow::Result<()> {
    let server = cli.server.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Question {
            context,
            number,
            total,
        } => do_question(&server, &context, number, total),
        Commands::AnalyzeResponse {
            question,
            transcript,
            transcript_file,
        } => {
            let transcript = read_text(transcript, transcript_file)?;
            do_analyze_response(&server, &question, &transcript)
        }
        Commands::AnalyzeCommunication {
            transcript,
            transcript_file,
        } => {
            let transcript = read_text(transcript, transcript_file)?;
            do_analyze_communication(&server, &transcript)
        }
        Commands::AnalyzeCode {
            language,
            file,
            problem,
        } => {
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            do_analyze_code(&server, &language, &code, &problem)
        }
        Commands::Tips { category, level } => do_tips(&server, &category, level.as_deref()),
        Commands::Record { session } => {
            let data_dir = resolve_data_dir(cli.data_dir, &cli.config)?;
            do_record(&open_store(&data_dir)?, session)
        }
        Commands::Sessions { action } => {
            let data_dir = resolve_data_dir(cli.data_dir, &cli.config)?;
            do_sessions(&open_store(&data_dir)?, action)
        }
        Commands::Status => do_status(&server),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("weebot: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
