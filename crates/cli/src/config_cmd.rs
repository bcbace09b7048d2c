//! `qgrid config` - inspect configuration files.

use std::path::PathBuf;

use clap::Subcommand;

use crate::settings::Settings;
use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Parse and validate a config file without touching any sheet
    #[command(after_help = "\
Examples:
  qgrid config check questgrid.toml")]
    Check {
        /// Path to the questgrid.toml file
        file: PathBuf,
    },
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Check { file } => cmd_config_check(file),
    }
}

fn cmd_config_check(file: PathBuf) -> Result<(), CliError> {
    let settings = Settings::load(&file)?;
    let r = &settings.resolver;

    eprintln!("ok: {}", file.display());
    eprintln!("  source:   {}", settings.source.describe());
    eprintln!(
        "  identity: sheet '{}', header row {}, marker {}",
        r.identity.sheet,
        r.identity.header_row + 1,
        r.identity
            .header_marker
            .as_deref()
            .map(|m| format!("'{m}'"))
            .unwrap_or_else(|| "(none, full grid)".to_string())
    );
    eprintln!(
        "  quests:   sheet '{}', labels row {}, rewards row {}, data from row {}, column {}",
        r.quests.sheet,
        r.quests.header_row + 1,
        r.quests.master_row + 1,
        r.quests.data_start_row + 1,
        r.quests.start_column + 1
    );
    eprintln!("  levels:   {}", r.levels.thresholds.len());
    Ok(())
}
