//! `questgrid.toml`: resolver sections plus a `[source]` section naming
//! where the sheets come from.
//!
//! ```toml
//! [source]
//! kind = "csv"          # csv | workbook | http
//! path = "exports"      # directory (csv) or file (workbook), relative to this file
//! # url = "https://example.com/export?format=csv&sheet={sheet}"
//! timeout_secs = 30
//!
//! [identity]
//! sheet = "Gamertags"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use questgrid_core::GridSource;
use questgrid_io::{CachedSource, CsvDirSource, HttpCsvSource, OpenError, WorkbookSource};
use questgrid_resolve::ResolverConfig;
use serde::Deserialize;

use crate::exit_codes::{EXIT_GRID_UNAVAILABLE, EXIT_INVALID_CONFIG, EXIT_USAGE};
use crate::CliError;

pub const CONFIG_ENV: &str = "QUESTGRID_CONFIG";
pub const CONFIG_FILE_NAME: &str = "questgrid.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Csv,
    Workbook,
    Http,
}

impl SourceKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Workbook => "workbook",
            Self::Http => "http",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    /// URL template containing `{sheet}` (http only).
    pub url: Option<String>,
    /// HTTP request timeout.
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Csv,
            path: None,
            url: None,
            timeout_secs: 30,
        }
    }
}

impl SourceSettings {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("source.timeout_secs must be at least 1".into());
        }
        match self.kind {
            SourceKind::Http if self.url.is_none() => {
                Err("source.url is required when kind = \"http\"".into())
            }
            SourceKind::Csv | SourceKind::Workbook if self.path.is_none() => Err(format!(
                "source.path is required when kind = \"{}\"",
                self.kind.as_str()
            )),
            _ => Ok(()),
        }
    }

    /// Human-readable location, for summaries.
    pub fn describe(&self) -> String {
        match (self.kind, &self.path, &self.url) {
            (SourceKind::Http, _, Some(url)) => format!("http {url}"),
            (kind, Some(path), _) => format!("{} {}", kind.as_str(), path.display()),
            (kind, _, _) => format!("{} (unset)", kind.as_str()),
        }
    }
}

/// Only the `[source]` table; resolver sections are parsed separately.
#[derive(Deserialize)]
struct SourceProbe {
    source: Option<SourceSettings>,
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub resolver: ResolverConfig,
    pub source: SourceSettings,
    /// File the settings were read from; `None` for built-in defaults.
    pub origin: Option<PathBuf>,
}

impl Settings {
    pub fn from_toml(input: &str) -> Result<Self, CliError> {
        let resolver = ResolverConfig::from_toml(input).map_err(|e| invalid_config(e.to_string()))?;
        let probe: SourceProbe = toml::from_str(input)
            .map_err(|e| invalid_config(format!("config parse error: {e}")))?;
        // A file without [source] is valid; lookups then report the missing source.
        if let Some(source) = &probe.source {
            source.validate().map_err(invalid_config)?;
        }

        Ok(Self {
            resolver,
            source: probe.source.unwrap_or_default(),
            origin: None,
        })
    }

    /// Read a settings file. Relative source paths are taken relative to it.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let input = std::fs::read_to_string(path).map_err(|e| {
            CliError::new(EXIT_USAGE, format!("cannot read config {}: {e}", path.display()))
        })?;
        let mut settings = Self::from_toml(&input)
            .map_err(|e| e.with_hint(format!("in {}", path.display())))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        if let Some(source_path) = settings.source.path.as_mut() {
            if source_path.is_relative() {
                *source_path = base_dir.join(&*source_path);
            }
        }
        settings.origin = Some(path.to_path_buf());
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Explicit path (flag or `QUESTGRID_CONFIG`), else the per-user file if
    /// present, else built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Build the configured grid source, cached for the life of the process.
    pub fn open_source(&self) -> Result<CachedSource<Box<dyn GridSource>>, CliError> {
        let s = &self.source;
        let inner: Box<dyn GridSource> = match (s.kind, &s.path, &s.url) {
            (SourceKind::Csv, Some(dir), _) => {
                Box::new(CsvDirSource::new(dir).map_err(open_error)?)
            }
            (SourceKind::Workbook, Some(file), _) => Box::new(WorkbookSource::new(file)),
            (SourceKind::Http, _, Some(url)) => Box::new(
                HttpCsvSource::new(url, Duration::from_secs(s.timeout_secs))
                    .map_err(open_error)?,
            ),
            _ => {
                return Err(CliError::new(EXIT_USAGE, "no grid source configured").with_hint(
                    format!(
                        "add a [source] section to {} (or pass --config / set {CONFIG_ENV})",
                        default_config_path_display()
                    ),
                ))
            }
        };
        log::debug!("grid source: {}", s.describe());
        Ok(CachedSource::new(inner))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("questgrid").join(CONFIG_FILE_NAME))
}

fn default_config_path_display() -> String {
    default_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string())
}

fn invalid_config(message: String) -> CliError {
    CliError::new(EXIT_INVALID_CONFIG, message)
}

fn open_error(err: OpenError) -> CliError {
    match err {
        OpenError::InvalidTemplate { .. } => invalid_config(err.to_string()),
        OpenError::NotADirectory(_) | OpenError::Client(_) => {
            CliError::new(EXIT_GRID_UNAVAILABLE, err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_file_is_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.resolver, ResolverConfig::default());
        assert_eq!(settings.source, SourceSettings::default());
    }

    #[test]
    fn source_and_resolver_sections_together() {
        let input = r#"
[source]
kind = "http"
url = "https://example.com/export?sheet={sheet}"
timeout_secs = 5

[quests]
start_column = 4
"#;
        let settings = Settings::from_toml(input).unwrap();
        assert_eq!(settings.source.kind, SourceKind::Http);
        assert_eq!(settings.source.timeout_secs, 5);
        assert_eq!(settings.resolver.quests.start_column, 4);
    }

    #[test]
    fn unknown_kind_is_invalid_config() {
        let err = Settings::from_toml("[source]\nkind = \"ftp\"\n").unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CONFIG);
    }

    #[test]
    fn http_with_path_needs_url() {
        let err = Settings::from_toml("[source]\nkind = \"http\"\npath = \"x\"\n").unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CONFIG);
        assert!(err.message.contains("source.url"), "{}", err.message);
    }

    #[test]
    fn http_without_url_is_invalid_config() {
        let err = Settings::from_toml("[source]\nkind = \"http\"\n").unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CONFIG);
        assert!(err.message.contains("source.url"), "{}", err.message);
    }

    #[test]
    fn file_sources_without_path_are_invalid_config() {
        for kind in ["csv", "workbook"] {
            let err = Settings::from_toml(&format!("[source]\nkind = \"{kind}\"\n")).unwrap_err();
            assert_eq!(err.code, EXIT_INVALID_CONFIG, "kind {kind}");
            assert!(err.message.contains("source.path"), "{}", err.message);
        }
        assert!(Settings::from_toml("[source]\n").is_err());
    }

    #[test]
    fn resolver_only_file_has_no_source() {
        let settings = Settings::from_toml("[quests]\nstart_column = 4\n").unwrap();
        assert_eq!(settings.source, SourceSettings::default());
        assert_eq!(settings.open_source().err().unwrap().code, EXIT_USAGE);
    }

    #[test]
    fn resolver_validation_is_invalid_config() {
        let err = Settings::from_toml("[levels]\nthresholds = [5, 1]\n").unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CONFIG);
        assert!(err.message.contains("ascending"));
    }

    #[test]
    fn relative_path_is_resolved_against_config_dir() {
        let dir = tempdir().unwrap();
        let config = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config, "[source]\nkind = \"csv\"\npath = \"exports\"\n").unwrap();

        let settings = Settings::load(&config).unwrap();
        assert_eq!(settings.source.path, Some(dir.path().join("exports")));
        assert_eq!(settings.origin.as_deref(), Some(config.as_path()));
    }

    #[test]
    fn unreadable_file_is_usage_error() {
        let dir = tempdir().unwrap();
        let err = Settings::load(&dir.path().join("missing.toml")).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }

    #[test]
    fn missing_source_is_usage_error() {
        let err = Settings::default().open_source().err().unwrap();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.is_some());
    }

    #[test]
    fn missing_csv_dir_is_grid_unavailable() {
        let dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.source.path = Some(dir.path().join("nope"));
        let err = settings.open_source().err().unwrap();
        assert_eq!(err.code, EXIT_GRID_UNAVAILABLE);
    }

    #[test]
    fn csv_source_opens() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Gamertags.csv"), "Gamertag;XP\nElArg;10\n").unwrap();
        let mut settings = Settings::default();
        settings.source.path = Some(dir.path().to_path_buf());

        let source = settings.open_source().unwrap();
        let grid = source.fetch("Gamertags").unwrap();
        assert_eq!(grid.text(1, 0), "ElArg");
    }
}
