use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Caller-supplied key for a player. Compared case-insensitively, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlayerHandle(String);

impl PlayerHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trimmed, lower-cased form used for comparison.
    pub fn folded(&self) -> String {
        self.0.trim().to_lowercase()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for PlayerHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.trim())
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// One occurrence of a handle in the identity grid, with its stat cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub row: usize,
    pub col: usize,
    pub xp: u64,
    pub level_raw: String,
    pub status: String,
    pub is_terminal: bool,
}

/// The row chosen to stand for a handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalIdentity {
    pub handle: String,
    pub display_name: String,
    pub source_row: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub xp: u64,
    pub level: u32,
    /// Fraction of the current level bracket, in `[0, 1]`.
    pub progress: f64,
    pub label: String,
    pub is_terminal: bool,
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestDefinition {
    pub label: String,
    pub anchor_column: usize,
}

/// Which signal decided a quest's completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionSignal {
    EarnedXp,
    StatusText,
    Checkbox,
    None,
}

impl CompletionSignal {
    pub fn is_completed(self) -> bool {
        !matches!(self, CompletionSignal::None)
    }
}

impl std::fmt::Display for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EarnedXp => write!(f, "earned_xp"),
            Self::StatusText => write!(f, "status_text"),
            Self::Checkbox => write!(f, "checkbox"),
            Self::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestRecord {
    pub definition: QuestDefinition,
    pub earned_xp: u64,
    pub master_xp: u64,
    pub completed: bool,
    /// `earned_xp` when positive, otherwise `master_xp`.
    pub display_xp: u64,
    pub status: String,
    pub signal: CompletionSignal,
}

/// Quests split by completion, each list in scan order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestPartition {
    pub completed: Vec<QuestRecord>,
    pub open: Vec<QuestRecord>,
}

impl QuestPartition {
    pub fn len(&self) -> usize {
        self.completed.len() + self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn earned_total(&self) -> u64 {
        self.completed.iter().map(|q| q.earned_xp).sum()
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlayer {
    pub identity: CanonicalIdentity,
    pub progress: ProgressSnapshot,
    pub quests_completed: Vec<QuestRecord>,
    pub quests_open: Vec<QuestRecord>,
    /// Row of the player in the quest grid.
    pub quest_row: usize,
    /// The winning candidate and how many listings the handle had.
    pub candidate: Candidate,
    pub candidate_count: usize,
}

/// Pipeline step, reported when a lookup runs out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FetchIdentity,
    FetchQuests,
    MatchName,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchIdentity => write!(f, "fetch_identity"),
            Self::FetchQuests => write!(f, "fetch_quests"),
            Self::MatchName => write!(f, "match_name"),
        }
    }
}

/// Every outcome of a lookup the caller is expected to branch on.
/// Transport failure is the only thing reported as an `Err` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ResolvedPlayer),
    HandleNotFound {
        handle: String,
    },
    /// The handle resolved but its display name has no row in the quest grid.
    NameRowNotFound {
        identity: CanonicalIdentity,
        progress: ProgressSnapshot,
    },
    TimedOut {
        stage: Stage,
    },
}

impl Resolution {
    pub fn player(&self) -> Option<&ResolvedPlayer> {
        match self {
            Resolution::Resolved(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_folds_case_and_whitespace() {
        let h = PlayerHandle::new("  ElArg ");
        assert_eq!(h.folded(), "elarg");
        assert_eq!(h.to_string(), "ElArg");
        assert!(PlayerHandle::new(" ").is_blank());
    }

    #[test]
    fn not_found_serializes_with_outcome_tag() {
        let r = Resolution::HandleNotFound { handle: "ghost".into() };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["outcome"], "handle_not_found");
        assert_eq!(json["handle"], "ghost");
    }

    #[test]
    fn timed_out_names_the_stage() {
        let r = Resolution::TimedOut { stage: Stage::FetchQuests };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["stage"], "fetch_quests");
        assert!(r.player().is_none());
    }
}
