// Workbook sheets (xlsx, xls, xlsb, ods)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{open_workbook_auto, Data, Range, Reader};
use questgrid_core::{Cell, Grid, GridSource, SourceError};

/// Reads one sheet per fetch from a workbook file on disk.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
}

impl WorkbookSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GridSource for WorkbookSource {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
        if !self.path.is_file() {
            return Err(SourceError::Io {
                sheet: sheet.to_string(),
                message: format!("workbook not found: {}", self.path.display()),
            });
        }

        let mut workbook = open_workbook_auto(&self.path).map_err(|e| SourceError::Parse {
            sheet: sheet.to_string(),
            message: format!("failed to open {}: {e}", self.path.display()),
        })?;

        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(SourceError::SheetNotFound {
                sheet: sheet.to_string(),
            });
        }

        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| SourceError::Parse {
                sheet: sheet.to_string(),
                message: e.to_string(),
            })?;

        let grid = grid_from_range(sheet, &range);
        log::debug!(
            "read '{}' from {} ({} rows)",
            sheet,
            self.path.display(),
            grid.height()
        );
        Ok(Arc::new(grid))
    }
}

/// Lay a calamine range out on an A1-anchored grid.
pub fn grid_from_range(sheet: &str, range: &Range<Data>) -> Grid {
    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(cell_from_data));
        rows.push(cells);
    }

    Grid::new(sheet, rows)
}

pub fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Date serials stay numeric; nothing downstream reads dates.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
    }
}
