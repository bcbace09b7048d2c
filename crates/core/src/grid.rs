use crate::cell::Cell;

static EMPTY: Cell = Cell::Empty;

/// Immutable 2-D table of cells, addressed by zero-based (row, col).
///
/// Rows may be ragged. Any address outside the stored data reads as
/// [`Cell::Empty`]; nothing ever panics on an out-of-range coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build a grid from raw strings. Blank strings become `Empty`, the rest `Text`.
    pub fn from_text_rows<R, S>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|s| Cell::from_text(s.as_ref())).collect())
            .collect();
        Self::new(name, rows)
    }

    /// Sheet name this grid was fetched as.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Cell at a signed column offset from `col`. Negative results read as empty.
    pub fn cell_offset(&self, row: usize, col: usize, offset: i64) -> &Cell {
        match offset_col(col, offset) {
            Some(c) => self.cell(row, c),
            None => &EMPTY,
        }
    }

    /// Trimmed display text of a cell.
    pub fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).display()
    }

    /// A whole row. Out of range yields an empty slice.
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Apply a signed offset to a column index.
pub fn offset_col(col: usize, offset: i64) -> Option<usize> {
    if offset >= 0 {
        col.checked_add(offset as usize)
    } else {
        col.checked_sub(offset.unsigned_abs() as usize)
    }
}

/// Cell at `col` in a row slice, empty when out of range.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY)
}
