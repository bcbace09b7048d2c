//! Handle lookup in a grid whose column layout is not known in advance.
//!
//! The searched region is either the columns whose header carries the
//! configured marker, or the whole grid. Within it columns are walked left to
//! right and each column top to bottom; that walk defines scan order.

use questgrid_core::{normalize, Grid};

use crate::config::IdentityConfig;
use crate::model::{Candidate, CanonicalIdentity, PlayerHandle};
use crate::vocab;

/// Columns and first row searched for handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRegion {
    pub columns: Vec<usize>,
    pub first_row: usize,
}

pub struct IdentityResolver<'a> {
    config: &'a IdentityConfig,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(config: &'a IdentityConfig) -> Self {
        Self { config }
    }

    pub fn search_region(&self, grid: &Grid) -> SearchRegion {
        let full = SearchRegion {
            columns: (0..grid.width()).collect(),
            first_row: 0,
        };

        let marker = match self.config.header_marker.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_lowercase(),
            _ => return full,
        };

        let header_row = self.config.header_row;
        let columns: Vec<usize> = (0..grid.width())
            .filter(|&c| grid.cell(header_row, c).folded().contains(&marker))
            .collect();

        if columns.is_empty() {
            log::warn!(
                "sheet '{}': no header in row {} contains '{}', searching the full grid",
                grid.name(),
                header_row,
                marker
            );
            return full;
        }

        SearchRegion {
            columns,
            first_row: header_row + 1,
        }
    }

    /// Every exact occurrence of `handle`, in scan order.
    pub fn candidates(&self, grid: &Grid, handle: &PlayerHandle) -> Vec<Candidate> {
        if handle.is_blank() {
            return Vec::new();
        }
        let needle = handle.folded();
        let region = self.search_region(grid);

        let mut found = Vec::new();
        for &col in &region.columns {
            for row in region.first_row..grid.height() {
                if grid.cell(row, col).folded() == needle {
                    found.push(self.candidate_at(grid, row, col));
                }
            }
        }
        found
    }

    fn candidate_at(&self, grid: &Grid, row: usize, col: usize) -> Candidate {
        let xp = normalize(grid.cell_offset(row, col, self.config.xp_offset));
        let level_cell = grid.cell_offset(row, col, self.config.level_offset);
        let status_cell = grid.cell_offset(row, col, self.config.status_offset);

        let markers = &self.config.terminal_markers;
        let is_terminal = vocab::contains_any(&level_cell.folded(), markers)
            || vocab::contains_any(&status_cell.folded(), markers);

        Candidate {
            row,
            col,
            xp,
            level_raw: level_cell.display(),
            status: status_cell.display(),
            is_terminal,
        }
    }

    /// The canonical candidate for `handle`, or `None` when it occurs nowhere.
    pub fn resolve(&self, grid: &Grid, handle: &PlayerHandle) -> Option<Candidate> {
        self.disambiguate(grid, handle).map(|(candidate, _)| candidate)
    }

    /// Canonical candidate plus the number of listings it was chosen from.
    pub fn disambiguate(&self, grid: &Grid, handle: &PlayerHandle) -> Option<(Candidate, usize)> {
        let candidates = self.candidates(grid, handle);
        let candidate = pick_canonical(&candidates)?.clone();
        if candidates.len() > 1 {
            log::info!(
                "handle '{}' listed {} times in '{}', using row {} col {}",
                handle,
                candidates.len(),
                grid.name(),
                candidate.row,
                candidate.col
            );
        }
        Some((candidate, candidates.len()))
    }

    /// Identity for a chosen candidate. The display name sits at `name_offset`;
    /// when that cell is blank the handle text from the grid stands in.
    pub fn identity(&self, grid: &Grid, candidate: &Candidate) -> CanonicalIdentity {
        let handle = grid.text(candidate.row, candidate.col);
        let name = grid
            .cell_offset(candidate.row, candidate.col, self.config.name_offset)
            .display();
        let display_name = if name.is_empty() { handle.clone() } else { name };
        CanonicalIdentity {
            handle,
            display_name,
            source_row: candidate.row,
        }
    }
}

/// Non-terminal beats terminal, then higher XP, then earlier in scan order.
pub fn pick_canonical(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(idx, c)| (c.is_terminal, std::cmp::Reverse(c.xp), *idx))
        .map(|(_, c)| c)
}
