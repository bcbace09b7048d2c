// qgrid - player lookups against shared quest spreadsheets

mod config_cmd;
mod exit_codes;
mod lookup;
mod output;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use questgrid_core::SourceError;
use questgrid_resolve::LevelCalculator;
use serde::Serialize;

use config_cmd::ConfigCommands;
use exit_codes::{EXIT_GRID_UNAVAILABLE, EXIT_SUCCESS};
use output::{print_json, progress_bar, Meta};
use settings::{Settings, CONFIG_ENV};

#[derive(Parser)]
#[command(name = "qgrid")]
#[command(about = "Look up a player's level and quest progress in shared spreadsheets")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    /// Config file (default: <config dir>/questgrid/questgrid.toml)
    #[arg(long, global = true, env = CONFIG_ENV, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log scan decisions to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a handle to identity, level and quests
    #[command(after_help = "\
Examples:
  qgrid lookup ElArg
  qgrid lookup elarg --json
  qgrid lookup ElArg --timeout 10 --config class-12b.toml")]
    Lookup {
        /// Player handle (case-insensitive)
        handle: String,

        /// Output JSON to stdout instead of only the human summary
        #[arg(long)]
        json: bool,

        /// Give up after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// List every listing of a handle and which one a lookup would use
    Candidates {
        handle: String,

        #[arg(long)]
        json: bool,
    },

    /// Level and bracket progress for an XP total
    Level {
        xp: u64,

        #[arg(long)]
        json: bool,
    },

    /// Configuration files
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Lookup {
            handle,
            json,
            timeout,
        } => Settings::discover(cli.config.as_deref())
            .and_then(|s| lookup::cmd_lookup(&s, &handle, json, timeout)),
        Commands::Candidates { handle, json } => Settings::discover(cli.config.as_deref())
            .and_then(|s| lookup::cmd_candidates(&s, &handle, json)),
        Commands::Level { xp, json } => {
            Settings::discover(cli.config.as_deref()).and_then(|s| cmd_level(&s, xp, json))
        }
        Commands::Config(cmd) => config_cmd::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("QGRID_COMMIT"), ")",
            "\ntarget:  ", env!("QGRID_TARGET"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("QGRID_COMMIT"), ")",
            "\ntarget:  ", env!("QGRID_TARGET"),
            "\nbuild:   release",
        )
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            hint: None,
        }
    }

    /// A sheet could not be fetched.
    pub fn source(err: SourceError) -> Self {
        let hint = match &err {
            SourceError::SheetNotFound { .. } => {
                Some("check the sheet names in the [identity] and [quests] sections".to_string())
            }
            SourceError::Transport { .. } => Some("check the [source] url and network".to_string()),
            SourceError::Io { .. } | SourceError::Parse { .. } => None,
        };
        Self {
            code: EXIT_GRID_UNAVAILABLE,
            message: err.to_string(),
            hint,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// level
// ============================================================================

#[derive(Serialize)]
struct LevelReport {
    meta: Meta,
    xp: u64,
    max_level: u32,
    #[serde(flatten)]
    info: questgrid_resolve::LevelInfo,
}

fn cmd_level(settings: &Settings, xp: u64, json: bool) -> Result<(), CliError> {
    let calc = LevelCalculator::new(&settings.resolver.levels.thresholds);
    let info = calc.level_info(xp);

    eprintln!(
        "level {}  {}  {}",
        info.level,
        progress_bar(info.progress, 20),
        info.label
    );

    if json {
        print_json(&LevelReport {
            meta: Meta::now(settings.origin.as_deref()),
            xp,
            max_level: calc.max_level(),
            info,
        })?;
    }
    Ok(())
}
