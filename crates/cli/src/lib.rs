use anyhow::{Context as AnyhowContext, Result};
use assist_indexer::{build_index, IndexSummary, KeywordExtractor};
use assist_memory::{Metadata, Role, SessionStore};
use assist_search::{ContextService, QueryCategory};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

pub mod config;
pub mod orchestrator;

use config::{AssistConfig, ConfigOverrides, CONFIG_ENV};
use orchestrator::{Assistant, DryRunModel};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    print_stdout(&serde_json::to_string_pretty(value)?)
}

#[derive(Parser)]
#[command(name = "assist-context")]
#[command(about = "Project context and conversation memory for the dispatch assistant", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Project root to index (overrides [index].root)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Session snapshot file (overrides [memory].store_path)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Keep sessions in memory only
    #[arg(long, global = true)]
    memory_only: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the file index and report statistics
    Index,

    /// Show the files selected for a query, with scores
    Files(QueryArgs),

    /// Print the assembled context for a query
    Context(ContextArgs),

    /// Regex search across indexed files
    Grep(GrepArgs),

    /// First lines of a file
    Summary(SummaryArgs),

    /// Conversation sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Run one query through the assistant pipeline without calling a model
    Ask(AskArgs),

    /// Index, session and request statistics
    Status,
}

#[derive(Args)]
struct QueryArgs {
    query: String,
}

#[derive(Args)]
struct ContextArgs {
    query: String,

    /// Use these files instead of selecting by relevance
    #[arg(long = "file")]
    files: Vec<String>,

    /// Character budget (overrides [context].max_chars)
    #[arg(long)]
    max_chars: Option<usize>,
}

#[derive(Args)]
struct GrepArgs {
    pattern: String,

    /// Only search paths ending with this suffix, e.g. ".ts"
    #[arg(long)]
    ext: Option<String>,
}

#[derive(Args)]
struct SummaryArgs {
    path: String,

    #[arg(long, default_value_t = 10)]
    lines: usize,
}

#[derive(Args)]
struct AskArgs {
    query: String,

    #[arg(long)]
    session: Option<String>,

    #[arg(long = "file")]
    files: Vec<String>,

    /// Do not send earlier turns
    #[arg(long)]
    no_history: bool,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Create a session (or reset an existing id)
    Create {
        #[arg(long)]
        id: Option<String>,
    },
    /// Append a message
    Add {
        id: String,
        role: String,
        content: String,
    },
    /// Context window handed to the model
    History { id: String },
    Info { id: String },
    List,
    Clear { id: String },
    /// Full session state
    Export { id: String },
    /// Drop idle sessions
    Cleanup {
        #[arg(long)]
        timeout_hours: Option<u64>,
    },
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let max_chars = match &cli.command {
        Commands::Context(args) => args.max_chars,
        _ => None,
    };
    let mut config = AssistConfig::resolve(cli.config.as_deref())?;
    config.apply(&ConfigOverrides {
        root: cli.root.clone(),
        store: cli.store.clone(),
        memory_only: cli.memory_only,
        max_chars,
    });
    config.validate()?;

    match cli.command {
        Commands::Index => run_index(&config),
        Commands::Files(args) => run_files(&config, &args.query),
        Commands::Context(args) => run_context(&config, args),
        Commands::Grep(args) => run_grep(&config, args),
        Commands::Summary(args) => run_summary(&config, args),
        Commands::Session(command) => run_session(&config, command),
        Commands::Ask(args) => run_ask(config, args).await,
        Commands::Status => run_status(config),
    }
}

fn open_context(config: &AssistConfig) -> Result<ContextService> {
    ContextService::new(
        config.index.clone(),
        config.context.clone(),
        config.rules.clone(),
    )
    .with_context(|| format!("Cannot index {}", config.index.root.display()))
}

fn open_sessions(config: &AssistConfig) -> Result<SessionStore> {
    SessionStore::open(config.memory.clone()).context("Cannot open session store")
}

fn run_index(config: &AssistConfig) -> Result<()> {
    let (index, stats) = build_index(&config.index, &KeywordExtractor::default())
        .with_context(|| format!("Cannot index {}", config.index.root.display()))?;
    eprintln!("Indexed {} files in {}ms", stats.files, stats.time_ms);
    print_json(&json!({
        "root": config.index.root,
        "stats": stats,
        "summary": IndexSummary::of(&index),
    }))
}

fn run_files(config: &AssistConfig, query: &str) -> Result<()> {
    let service = open_context(config)?;
    print_json(&json!({
        "query": query,
        "query_type": QueryCategory::classify(query),
        "selected": service.context_files(query),
        "ranked": service.ranked(query),
    }))
}

fn run_context(config: &AssistConfig, args: ContextArgs) -> Result<()> {
    let service = open_context(config)?;
    let files = (!args.files.is_empty()).then_some(args.files.as_slice());
    let context = service.prepare_context(&args.query, files);
    eprintln!(
        "{} files, {} chars{}",
        context.files.len(),
        context.total_chars,
        if context.truncated { " (truncated)" } else { "" }
    );
    print_stdout(&context.text)
}

fn run_grep(config: &AssistConfig, args: GrepArgs) -> Result<()> {
    let service = open_context(config)?;
    let hits = service.search_files(&args.pattern, args.ext.as_deref())?;
    print_json(&hits)
}

fn run_summary(config: &AssistConfig, args: SummaryArgs) -> Result<()> {
    let service = open_context(config)?;
    let summary = service
        .file_summary(&args.path, args.lines)
        .with_context(|| format!("Cannot read {}", args.path))?;
    print_json(&json!({ "path": args.path, "summary": summary }))
}

fn run_session(config: &AssistConfig, command: SessionCommand) -> Result<()> {
    let store = open_sessions(config)?;
    match command {
        SessionCommand::Create { id } => {
            let id = store.create_session(id.as_deref());
            print_json(&json!({ "session_id": id }))
        }
        SessionCommand::Add { id, role, content } => {
            let role: Role = role.parse()?;
            store.add_message(&id, role, &content, Metadata::new());
            print_json(&store.session_info(&id))
        }
        SessionCommand::History { id } => print_json(&store.conversation_context(&id)),
        SessionCommand::Info { id } => match store.session_info(&id) {
            Some(info) => print_json(&info),
            None => anyhow::bail!("Session not found: {id}"),
        },
        SessionCommand::List => print_json(&store.list_sessions()),
        SessionCommand::Clear { id } => {
            let cleared = store.clear_session(&id);
            print_json(&json!({ "session_id": id, "cleared": cleared }))
        }
        SessionCommand::Export { id } => match store.export_session(&id) {
            Some(session) => print_json(&session),
            None => anyhow::bail!("Session not found: {id}"),
        },
        SessionCommand::Cleanup { timeout_hours } => {
            let mut memory = config.memory.clone();
            if let Some(hours) = timeout_hours {
                memory.session_timeout_hours = hours;
            }
            let timeout = memory.session_timeout();
            let removed = store.cleanup_expired(timeout);
            print_json(&json!({ "removed": removed }))
        }
    }
}

fn assistant(config: AssistConfig) -> Result<Assistant> {
    let context = Arc::new(open_context(&config)?);
    let sessions = Arc::new(open_sessions(&config)?);
    Ok(Assistant::new(
        Box::new(DryRunModel),
        context,
        sessions,
        config.assistant,
    ))
}

async fn run_ask(config: AssistConfig, args: AskArgs) -> Result<()> {
    let assistant = assistant(config)?;
    let files = (!args.files.is_empty()).then_some(args.files.as_slice());
    let reply = assistant
        .process_query(&args.query, args.session.as_deref(), files, !args.no_history)
        .await?;
    print_json(&reply)
}

fn run_status(config: AssistConfig) -> Result<()> {
    let assistant = assistant(config)?;
    print_json(&assistant.status())
}
