use std::collections::HashMap;
use std::sync::Arc;

use crate::grid::Grid;

/// Failure to obtain a grid. This is the only failure the resolver treats as
/// fatal for a lookup; it is surfaced to the caller as-is and never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("sheet '{sheet}' not found")]
    SheetNotFound { sheet: String },
    #[error("sheet '{sheet}': IO error: {message}")]
    Io { sheet: String, message: String },
    #[error("sheet '{sheet}': cannot parse: {message}")]
    Parse { sheet: String, message: String },
    #[error("sheet '{sheet}': transport error: {message}")]
    Transport { sheet: String, message: String },
}

impl SourceError {
    pub fn sheet(&self) -> &str {
        match self {
            Self::SheetNotFound { sheet }
            | Self::Io { sheet, .. }
            | Self::Parse { sheet, .. }
            | Self::Transport { sheet, .. } => sheet,
        }
    }
}

/// Anything that can hand out a fully materialized, read-only grid per sheet name.
pub trait GridSource {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError>;
}

impl<S: GridSource + ?Sized> GridSource for &S {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
        (**self).fetch(sheet)
    }
}

impl<S: GridSource + ?Sized> GridSource for Arc<S> {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
        (**self).fetch(sheet)
    }
}

impl<S: GridSource + ?Sized> GridSource for Box<S> {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
        (**self).fetch(sheet)
    }
}

/// In-memory source over pre-built grids, keyed by sheet name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: HashMap<String, Arc<Grid>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grid under its own name.
    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.insert(grid);
        self
    }

    pub fn insert(&mut self, grid: Grid) {
        self.sheets.insert(grid.name().to_string(), Arc::new(grid));
    }
}

impl GridSource for MemorySource {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| SourceError::SheetNotFound {
                sheet: sheet.to_string(),
            })
    }
}
