use serde::{Deserialize, Serialize};

/// A single cell value as delivered by a grid source.
///
/// Sources decide the variant once, at grid construction time. Text-based
/// sources (CSV, HTTP export) only ever produce `Empty` and `Text`; workbook
/// sources also deliver `Number` and `Bool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Build a text cell, collapsing blank input to `Empty`.
    ///
    /// No numeric guessing happens here: `"1.234"` stays text so the
    /// normalizer can apply its locale rules later.
    pub fn from_text(input: &str) -> Self {
        if input.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(input.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display text, trimmed. Integral numbers render without a fraction.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
        }
    }

    /// Lower-cased, trimmed display text used by every vocabulary match.
    pub fn folded(&self) -> String {
        self.display().to_lowercase()
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}
