// Shared output helpers: JSON envelope, progress bar

use serde::Serialize;

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

#[derive(Debug, Serialize)]
pub struct Meta {
    pub engine_version: &'static str,
    pub run_at: String,
    /// Config file in effect; absent when running on built-in defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

impl Meta {
    pub fn now(config: Option<&std::path::Path>) -> Self {
        Self {
            engine_version: env!("CARGO_PKG_VERSION"),
            run_at: chrono::Utc::now().to_rfc3339(),
            config: config.map(|p| p.display().to_string()),
        }
    }
}

/// Print exactly one pretty JSON value to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

/// `[######----]` for a fraction in `[0, 1]`.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
