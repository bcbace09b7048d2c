//! Fuzzy row lookup by display name.
//!
//! A display name is reduced to tokens; a row matches when every token is a
//! substring of the row's leading columns joined together. Partial names,
//! swapped first/last names and extra middle names in the sheet all match.

use questgrid_core::Grid;

use crate::config::NameConfig;

/// Tokens at or below this many characters are dropped as noise.
const MIN_TOKEN_CHARS: usize = 2;

const PREFIX_SEPARATORS: &[char] = &[' ', '-', '_', ':', '|', '/', '.'];

pub struct NameMatcher<'a> {
    config: &'a NameConfig,
}

impl<'a> NameMatcher<'a> {
    pub fn new(config: &'a NameConfig) -> Self {
        Self { config }
    }

    /// Search tokens for a display name. Empty only for a blank name.
    pub fn tokens(&self, display_name: &str) -> Vec<String> {
        let lowered = display_name.trim().to_lowercase();
        if lowered.is_empty() {
            return Vec::new();
        }

        let stripped = self.strip_cohort_prefixes(&lowered);
        let tokens: Vec<String> = stripped
            .split_whitespace()
            .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
            .map(str::to_string)
            .collect();

        if tokens.is_empty() {
            vec![lowered]
        } else {
            tokens
        }
    }

    /// Remove leading class codes such as `fos12b - `. A prefix only counts
    /// when followed by a separator or the end of the name.
    fn strip_cohort_prefixes<'n>(&self, lowered: &'n str) -> &'n str {
        let mut prefixes: Vec<String> = self
            .config
            .cohort_prefixes
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        // Longest first so "fos 12b" wins over "12b".
        prefixes.sort_by_key(|p| std::cmp::Reverse(p.len()));

        let mut rest = lowered;
        'strip: loop {
            for prefix in &prefixes {
                if let Some(after) = rest.strip_prefix(prefix.as_str()) {
                    if after.is_empty() || after.starts_with(PREFIX_SEPARATORS) {
                        rest = after.trim_start_matches(PREFIX_SEPARATORS);
                        continue 'strip;
                    }
                }
            }
            break;
        }
        rest
    }

    /// Lower-cased leading window of a row, cells joined by a space.
    pub fn row_text(&self, grid: &Grid, row: usize) -> String {
        (0..self.config.window)
            .map(|c| grid.text(row, c))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// First row at or after `start_row` containing every token.
    pub fn find_row(&self, grid: &Grid, display_name: &str, start_row: usize) -> Option<usize> {
        let tokens = self.tokens(display_name);
        if tokens.is_empty() {
            return None;
        }

        let found = (start_row..grid.height()).find(|&row| {
            let haystack = self.row_text(grid, row);
            tokens.iter().all(|t| haystack.contains(t.as_str()))
        });

        match found {
            Some(row) => log::debug!("name '{display_name}' matched row {row} via {tokens:?}"),
            None => log::debug!("name '{display_name}' has no row in '{}'", grid.name()),
        }
        found
    }
}
