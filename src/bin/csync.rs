//! csync - Content sync CLI tool
//!
//! Exports content from a store snapshot to a payload file, previews a
//! payload against the store, and imports it with a chosen action.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use content_sync::value::Map;
use content_sync::{
    diff, summarize, Action, CommitPlan, ContentKind, Decision, ExportFilter, ExportRequest,
    Exporter, MemoryStore, ReconciliationSession, SyncConfig, SyncError,
};

/// csync - Export and reconcile structured content
#[derive(Parser)]
#[command(name = "csync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Store snapshot file used as the live content store
    #[arg(short, long, global = true, default_value = "store.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an export payload for one content type
    Export {
        /// collections, taxonomies, navigation, globals or assets
        #[arg(short = 't', long = "type")]
        kind: ContentKind,

        /// Only these handles (comma separated)
        #[arg(long, value_delimiter = ',')]
        handles: Vec<String>,

        /// Only these sites (comma separated)
        #[arg(long, value_delimiter = ',')]
        sites: Vec<String>,

        /// Only items updated at or after this date or RFC 3339 time
        #[arg(long, value_parser = parse_since)]
        since: Option<DateTime<Utc>>,

        /// Custom file name inside the sync folder
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Show what importing a payload would change
    Preview {
        /// Payload path or name inside the sync folder
        file: String,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import a payload into the store
    Import {
        /// Payload path or name inside the sync folder
        file: String,

        /// Apply one action to every difference
        #[arg(long, conflicts_with = "decisions")]
        apply: Option<Action>,

        /// JSON list of {"key", "action"} decisions
        #[arg(long)]
        decisions: Option<PathBuf>,
    },

    /// Compare two JSON documents
    Diff {
        #[arg(long)]
        current: PathBuf,

        #[arg(long)]
        incoming: PathBuf,
    },
}

fn parse_since(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", raw))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("content_sync=info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::load(cli.config.as_deref())?;
    let mut output = io::stdout();

    match cli.command {
        Commands::Export {
            kind,
            handles,
            sites,
            since,
            out,
        } => {
            let store = MemoryStore::load(&cli.store)?;
            let mut request = ExportRequest::new(kind)
                .filter(ExportFilter::new().handles(handles).sites(sites).since(since));
            request.out = out;

            let written = Exporter::with_signer(config.signer()).export_to(
                &store,
                &request,
                &config.writer(),
            )?;
            writeln!(
                output,
                "Exported {} item(s) to {}",
                written.count,
                written.path.display()
            )?;
        }
        Commands::Preview { file, json } => {
            let payload = config.reader().read(&file)?;
            let store = MemoryStore::load(&cli.store)?;
            let mut session = ReconciliationSession::new(store);
            let preview = session.preview(&payload)?;
            if json {
                writeln!(output, "{}", serde_json::to_string_pretty(preview)?)?;
            } else {
                write!(output, "{}", preview)?;
            }
        }
        Commands::Import {
            file,
            apply,
            decisions,
        } => {
            let plan = commit_plan(apply.or(config.default_action), decisions.as_deref())?;
            let payload = config.reader().read(&file)?;
            let store = MemoryStore::load(&cli.store)?;

            let mut session = ReconciliationSession::new(store);
            session.preview(&payload)?;
            let result = session.commit(payload.kind, plan)?;

            session.into_repository().save(&cli.store)?;
            info!(store = %cli.store.display(), "store saved");

            writeln!(output, "Import finished: {}", result)?;
            for error in &result.errors {
                writeln!(output, "  ! {}", error)?;
            }
        }
        Commands::Diff { current, incoming } => {
            let current = read_map(&current)?;
            let incoming = read_map(&incoming)?;
            let diffs = diff(Some(&current), &incoming);
            if diffs.is_empty() {
                writeln!(output, "Documents are identical")?;
            } else {
                writeln!(output, "Documents differ ({}):", summarize(&diffs))?;
                writeln!(output, "{}", diffs)?;
            }
        }
    }

    Ok(())
}

fn commit_plan(apply: Option<Action>, decisions: Option<&Path>) -> Result<CommitPlan, SyncError> {
    if let Some(path) = decisions {
        let json = fs::read_to_string(path).map_err(|e| SyncError::io("read", path, e))?;
        let decisions = Decision::list_from_json(&json)
            .map_err(|e| SyncError::config(format!("invalid decisions file: {}", e)))?;
        return Ok(CommitPlan::Decisions(decisions));
    }
    match apply {
        Some(action) => Ok(CommitPlan::Auto(action)),
        None => Err(SyncError::config(
            "import needs --apply, --decisions or a default_action in the config",
        )),
    }
}

fn read_map(path: &Path) -> Result<Map, SyncError> {
    let json = fs::read_to_string(path).map_err(|e| SyncError::io("read", path, e))?;
    content_sync::value::map_from_json(&json)
        .map_err(|e| SyncError::malformed(format!("{}: {}", path.display(), e)))
}
