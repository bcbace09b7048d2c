//! Pairwise quest column scan.
//!
//! Quest columns come in pairs: the anchor column carries the quest label in
//! the header row, the master reward in the master row and the player's
//! status in the player row; the column to its right carries the XP the
//! player earned. The scan walks the header row from the configured start
//! column and partitions quests into completed and open.

use std::collections::HashSet;

use questgrid_core::grid::cell_at;
use questgrid_core::{normalize, Cell};

use crate::config::QuestConfig;
use crate::model::{CompletionSignal, QuestDefinition, QuestPartition, QuestRecord};
use crate::vocab;

/// What a header label means to the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Aggregate column: nothing from here on is a quest.
    Sentinel,
    /// Blank or metadata header.
    Skip,
    Quest,
}

pub struct QuestScanner<'a> {
    config: &'a QuestConfig,
}

impl<'a> QuestScanner<'a> {
    pub fn new(config: &'a QuestConfig) -> Self {
        Self { config }
    }

    /// `folded` must be trimmed and lower-cased.
    pub fn label_kind(&self, folded: &str) -> LabelKind {
        if vocab::starts_with_any(folded, &self.config.sentinels) {
            LabelKind::Sentinel
        } else if folded.is_empty() || vocab::equals_any(folded, &self.config.stoplist) {
            LabelKind::Skip
        } else {
            LabelKind::Quest
        }
    }

    /// Scan from `start_column` to the end of `header`.
    ///
    /// Value columns claimed by the previous quest are never read as labels, so
    /// a sentinel-looking header there ("Gesamt XP") does not stop the scan.
    pub fn scan(
        &self,
        header: &[Cell],
        master: &[Cell],
        student: &[Cell],
        start_column: usize,
    ) -> QuestPartition {
        let mut partition = QuestPartition::default();
        let mut consumed: HashSet<usize> = HashSet::new();

        for col in start_column..header.len() {
            if consumed.contains(&col) {
                continue;
            }
            let label_cell = cell_at(header, col);
            match self.label_kind(&label_cell.folded()) {
                LabelKind::Sentinel => {
                    log::debug!("quest scan stopped at column {col} ('{}')", label_cell.display());
                    break;
                }
                LabelKind::Skip => continue,
                LabelKind::Quest => {}
            }

            let record = self.read_quest(label_cell.display(), col, master, student);
            consumed.insert(col);
            consumed.insert(col + 1);

            if record.completed {
                partition.completed.push(record);
            } else {
                partition.open.push(record);
            }
        }

        partition
    }

    fn read_quest(&self, label: String, col: usize, master: &[Cell], student: &[Cell]) -> QuestRecord {
        let master_xp = match normalize(cell_at(master, col)) {
            0 => normalize(cell_at(master, col + 1)),
            xp => xp,
        };
        let status = cell_at(student, col);
        let earned_xp = normalize(cell_at(student, col + 1));

        let signal = self.completion_signal(status, earned_xp);
        let display_xp = if earned_xp > 0 { earned_xp } else { master_xp };

        QuestRecord {
            definition: QuestDefinition {
                label,
                anchor_column: col,
            },
            earned_xp,
            master_xp,
            completed: signal.is_completed(),
            display_xp,
            status: status.display(),
            signal,
        }
    }

    /// First satisfied rule wins: earned XP, affirmative status text without a
    /// negation, a ticked checkbox.
    pub fn completion_signal(&self, status: &Cell, earned_xp: u64) -> CompletionSignal {
        if earned_xp > 0 {
            return CompletionSignal::EarnedXp;
        }

        let folded = status.folded();
        if vocab::contains_any(&folded, &self.config.completion_markers)
            && !vocab::contains_any(&folded, &self.config.negation_markers)
        {
            return CompletionSignal::StatusText;
        }

        if self.is_checkbox_truthy(status, &folded) {
            return CompletionSignal::Checkbox;
        }

        CompletionSignal::None
    }

    fn is_checkbox_truthy(&self, status: &Cell, folded: &str) -> bool {
        match status {
            Cell::Bool(b) => *b,
            Cell::Number(n) => *n >= 1.0,
            Cell::Text(_) => {
                vocab::equals_any(folded, &self.config.truthy)
                    || folded.parse::<f64>().map(|n| n >= 1.0).unwrap_or(false)
            }
            Cell::Empty => false,
        }
    }
}
