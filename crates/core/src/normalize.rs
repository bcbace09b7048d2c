//! Cell content to non-negative integer.
//!
//! [`normalize`] is total: malformed input is recovered here by returning 0
//! and never surfaces as an error anywhere else in the workspace.
//!
//! Rules, first applicable wins:
//! 1. numeric and boolean cells are truncated toward zero directly (checked
//!    first so an exact value is never reinterpreted as locale text);
//! 2. text is trimmed, blank or null-like text yields 0;
//! 3. a trailing literal `.0` is stripped (floats serialized as text);
//! 4. German-style parse: every `.` is a thousands separator, `,` is the
//!    decimal separator;
//! 5. fallback: plain real-number parse of the trimmed text;
//! 6. anything else is 0.

use crate::cell::Cell;

const NULL_LIKE: &[&str] = &["none", "null", "nan", "n/a"];

pub fn normalize(cell: &Cell) -> u64 {
    match cell {
        Cell::Empty => 0,
        Cell::Number(n) => clamp_truncate(*n),
        Cell::Bool(b) => u64::from(*b),
        Cell::Text(s) => normalize_text(s),
    }
}

/// Text path of [`normalize`], also used for values that arrive as bare strings.
pub fn normalize_text(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NULL_LIKE.contains(&trimmed.to_lowercase().as_str()) {
        return 0;
    }

    let stripped = trimmed.strip_suffix(".0").unwrap_or(trimmed);

    let localized = stripped.replace('.', "").replace(',', ".");
    if let Some(n) = parse_real(&localized) {
        return clamp_truncate(n);
    }

    parse_real(trimmed).map(clamp_truncate).unwrap_or(0)
}

fn parse_real(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Truncate toward zero and clamp to the non-negative range.
/// Non-finite input is 0; `as` saturates above `u64::MAX`.
fn clamp_truncate(n: f64) -> u64 {
    if !n.is_finite() || n <= 0.0 {
        return 0;
    }
    n.trunc() as u64
}
