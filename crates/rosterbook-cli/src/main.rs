//! Rosterbook - command line scheduling for a worship ministry.
//!
//! Reads and writes the JSON data directory managed by `rosterbook-core`.

mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rosterbook_core::{BookError, Config, EventType, RosterError, Role, YearMonth};

/// Environment variable overriding the data directory
const DATA_DIR_ENV: &str = "ROSTERBOOK_DATA_DIR";

/// Log file prefix inside `<data_dir>/logs`
const LOG_FILE: &str = "rosterbook.log";

#[derive(Parser)]
#[command(name = "rosterbook")]
#[command(about = "Service calendar, availability and roster assignments for a worship ministry", long_about = None)]
struct Cli {
    /// Data directory (defaults to the config value, then the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the services of a month
    Events {
        #[arg(long)]
        month: YearMonth,
    },
    /// List members
    Members {
        /// Match against name or email
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        /// Only active members
        #[arg(long)]
        active: bool,
    },
    /// Import members from a JSON file, replacing records with the same id
    ImportMembers { file: PathBuf },
    /// Toggle a member's unavailability for a date
    Block {
        #[arg(long)]
        member: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Show blocked dates for a member, or who is out on a date
    #[command(group(
        ArgGroup::new("who")
            .args(["member", "date"])
            .required(true)
            .multiple(false)
    ))]
    Blocked {
        #[arg(long)]
        member: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Assign a member to a role at a service
    Assign {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        event: EventType,
        #[arg(long)]
        role: Role,
        #[arg(long)]
        member: String,
    },
    /// Remove whoever holds a role at a service
    Unassign {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        event: EventType,
        #[arg(long)]
        role: Role,
    },
    /// Replace the holder of a role at a service
    Reassign {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        event: EventType,
        #[arg(long)]
        role: Role,
        #[arg(long)]
        member: String,
    },
    /// Show the roster of one service
    Roster {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        event: EventType,
    },
    /// List services of a month that still have open roles
    OpenSlots {
        #[arg(long)]
        month: YearMonth,
    },
    /// Members who could fill a role at a service
    Candidates {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        event: EventType,
        #[arg(long)]
        role: Role,
    },
    /// Participation report for a date range
    Report {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Only count one service type
        #[arg(long)]
        event: Option<EventType>,
        /// Only report one member
        #[arg(long)]
        member: Option<String>,
    },
    /// Month at a glance
    Summary {
        #[arg(long)]
        month: YearMonth,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug). Logs go to
/// stderr and to a daily file under `<data_dir>/logs`.
fn init_tracing(data_dir: &std::path::Path) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_writer(non_blocking_file).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

/// Flag value, then environment, then config file, then platform default.
fn resolve_data_dir(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    config.data_dir()
}

fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = resolve_data_dir(cli.data_dir, &config)?;
    let _guard = init_tracing(&data_dir)?;
    info!(data_dir = %data_dir.display(), "Rosterbook starting");

    let ctx = commands::Context::new(config, data_dir);
    let result = commands::dispatch(&ctx, cli.command);
    debug!(ok = result.is_ok(), "Command finished");
    result
}

/// Print an error prefixed with its kind so scripts can tell a conflict
/// from a typo.
fn report_error(error: &anyhow::Error) {
    if let Some(book_error) = error.downcast_ref::<BookError>() {
        eprintln!("Error [{}]: {}", book_error.label(), book_error);
    } else if let Some(roster_error) = error.downcast_ref::<RosterError>() {
        eprintln!("Error [{}]: {}", roster_error.kind(), roster_error);
    } else {
        eprintln!("Error: {:#}", error);
    }
}
