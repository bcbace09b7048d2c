use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every heuristic constant the resolver consumes. An empty TOML document is
/// a valid config and yields the reference layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub identity: IdentityConfig,
    pub names: NameConfig,
    pub quests: QuestConfig,
    pub levels: LevelConfig,
}

// ---------------------------------------------------------------------------
// Identity sheet
// ---------------------------------------------------------------------------

/// Where handles live and how their stat cells sit relative to them.
///
/// Offsets are column deltas from the cell holding the handle. Missing
/// columns read as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub sheet: String,
    pub header_row: usize,
    /// Restrict the search to columns whose header contains this token.
    /// `None` searches the full grid.
    pub header_marker: Option<String>,
    pub xp_offset: i64,
    pub level_offset: i64,
    pub status_offset: i64,
    pub name_offset: i64,
    /// Substrings in the level or status cell marking an exhausted player.
    pub terminal_markers: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            sheet: "Gamertags".into(),
            header_row: 0,
            header_marker: Some("gamertag".into()),
            xp_offset: 1,
            level_offset: 2,
            status_offset: 3,
            name_offset: -1,
            terminal_markers: strings(&["game over", "gameover", "ausgeschieden", "☠", "💀"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Name matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameConfig {
    /// Class/group codes stripped from the front of a display name.
    pub cohort_prefixes: Vec<String>,
    /// Number of leading columns concatenated per row before token search.
    pub window: usize,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            cohort_prefixes: strings(&[
                "fos11a", "fos11b", "fos12a", "fos12b", "fos 11a", "fos 11b", "fos 12a",
                "fos 12b", "11a", "11b", "12a", "12b",
            ]),
            window: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Quest sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestConfig {
    pub sheet: String,
    /// Row holding quest labels.
    pub header_row: usize,
    /// Row holding the nominal reward per quest.
    pub master_row: usize,
    /// First row holding player data; name matching starts here.
    pub data_start_row: usize,
    /// First column that may hold a quest anchor.
    pub start_column: usize,
    /// Label prefixes that end the scan (aggregate / summary columns).
    pub sentinels: Vec<String>,
    /// Labels (exact match) that are metadata, never quests.
    pub stoplist: Vec<String>,
    pub completion_markers: Vec<String>,
    pub negation_markers: Vec<String>,
    /// Status texts (exact match) that count as a ticked checkbox.
    pub truthy: Vec<String>,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            sheet: "Quests".into(),
            header_row: 0,
            master_row: 1,
            data_start_row: 2,
            start_column: 3,
            sentinels: strings(&["gesamtsumme", "gesamt", "total", "endstand"]),
            stoplist: strings(&[
                "name", "vorname", "nachname", "klasse", "gamertag", "kategorie", "category",
                "xp", "punkte", "coins", "münzen", "€", "eur", "level", "status", "datum",
            ]),
            completion_markers: strings(&[
                "abgeschlossen", "erledigt", "fertig", "bestanden", "done", "complete", "✓", "✔",
            ]),
            negation_markers: strings(&["nicht", "kein", "not", "incomplete", "unvollständig"]),
            truthy: strings(&["true", "wahr", "ja", "yes", "x", "✓", "✔", "☑"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// Minimum XP per level, ascending; index 0 is level 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub thresholds: Vec<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![
                0, 50, 150, 332, 640, 1000, 1450, 2000, 2650, 3400, 4250, 5200, 6250, 7400, 8650,
                10000,
            ],
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ResolverConfig {
    pub fn from_toml(input: &str) -> Result<Self, ResolveError> {
        let config: ResolverConfig =
            toml::from_str(input).map_err(|e| ResolveError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ResolveError> {
        let thresholds = &self.levels.thresholds;
        if thresholds.is_empty() {
            return Err(ResolveError::ConfigValidation(
                "levels.thresholds must not be empty".into(),
            ));
        }
        if let Some(i) = thresholds.windows(2).position(|w| w[1] < w[0]) {
            return Err(ResolveError::ConfigValidation(format!(
                "levels.thresholds must be ascending: level {} ({}) is below level {} ({})",
                i + 2,
                thresholds[i + 1],
                i + 1,
                thresholds[i]
            )));
        }

        if self.names.window == 0 {
            return Err(ResolveError::ConfigValidation(
                "names.window must be at least 1".into(),
            ));
        }

        let id = &self.identity;
        for (field, offset) in [
            ("xp_offset", id.xp_offset),
            ("level_offset", id.level_offset),
            ("status_offset", id.status_offset),
        ] {
            if offset == 0 {
                return Err(ResolveError::ConfigValidation(format!(
                    "identity.{field} must not be 0 (that is the handle column)"
                )));
            }
        }

        let q = &self.quests;
        if q.master_row == q.header_row {
            return Err(ResolveError::ConfigValidation(format!(
                "quests.master_row and quests.header_row are both {}",
                q.header_row
            )));
        }
        if q.data_start_row <= q.header_row {
            return Err(ResolveError::ConfigValidation(format!(
                "quests.data_start_row ({}) must be below quests.header_row ({})",
                q.data_start_row, q.header_row
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
