// CSV sheet exports

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use questgrid_core::{Cell, Grid, GridSource, SourceError};

use crate::OpenError;

/// One CSV file per sheet: sheet `S` lives at `<dir>/S.csv`.
///
/// Files are read on every fetch; wrap in [`crate::CachedSource`] to keep
/// a snapshot.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, OpenError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(OpenError::NotADirectory(dir));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `sheet`, or `None` for names that would leave the directory.
    pub fn sheet_path(&self, sheet: &str) -> Option<PathBuf> {
        if sheet.is_empty() || sheet.contains(['/', '\\']) || sheet.starts_with('.') {
            return None;
        }
        Some(self.dir.join(format!("{sheet}.csv")))
    }
}

impl GridSource for CsvDirSource {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
        let not_found = || SourceError::SheetNotFound {
            sheet: sheet.to_string(),
        };
        let path = self.sheet_path(sheet).ok_or_else(not_found)?;
        if !path.is_file() {
            return Err(not_found());
        }

        let content = read_file_as_utf8(&path).map_err(|e| SourceError::Io {
            sheet: sheet.to_string(),
            message: format!("{}: {e}", path.display()),
        })?;
        let grid = grid_from_csv_str(sheet, &content)?;
        log::debug!(
            "read '{}' from {} ({} rows)",
            sheet,
            path.display(),
            grid.height()
        );
        Ok(Arc::new(grid))
    }
}

/// Parse CSV text into a grid named `sheet`, sniffing the delimiter.
///
/// Fields stay text; blank fields become [`Cell::Empty`]. Rows may differ in
/// width.
pub fn grid_from_csv_str(sheet: &str, content: &str) -> Result<Grid, SourceError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = sniff_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| SourceError::Parse {
            sheet: sheet.to_string(),
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(Grid::new(sheet, rows))
}

/// Candidates in preference order. Semicolon leads because German exports
/// write decimals with a comma.
const DELIMITERS: [u8; 4] = [b';', b'\t', b',', b'|'];

const SAMPLE_LINES: usize = 20;

/// Pick the field delimiter from the first non-blank lines.
///
/// Class exports often open with a title row ("Klasse 7b, Stand 03.10.") above
/// the table, so line 1 is not trusted: each candidate is scored on the most
/// common multi-field row width it produces. Ties keep the earlier candidate;
/// nothing splitting into several fields means `,`.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect();

    let mut best = b',';
    let mut best_score = 0;
    for delim in DELIMITERS {
        let score = table_score(&sample, delim);
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }
    best
}

/// Rows sharing one multi-field width, times that width; best width wins.
fn table_score(sample: &[&str], delim: u8) -> usize {
    let mut rows_by_width: HashMap<usize, usize> = HashMap::new();
    for line in sample {
        let width = field_count(line, delim);
        if width > 1 {
            *rows_by_width.entry(width).or_default() += 1;
        }
    }
    rows_by_width
        .into_iter()
        .map(|(width, rows)| width * rows)
        .max()
        .unwrap_or(0)
}

fn field_count(line: &str, delim: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Read a file, decoding it as Windows-1252 when it is not valid UTF-8.
pub fn read_file_as_utf8(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_text(bytes))
}

/// UTF-8 when valid, otherwise Windows-1252 (spreadsheet exports on Windows).
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}
