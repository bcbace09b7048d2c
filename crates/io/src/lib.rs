// Grid sources

pub mod cache;
pub mod csv;
pub mod http;
pub mod workbook;

pub use crate::cache::CachedSource;
pub use crate::csv::CsvDirSource;
pub use crate::http::HttpCsvSource;
pub use crate::workbook::WorkbookSource;

use std::path::PathBuf;

/// A source that cannot be constructed from its settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpenError {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("invalid URL template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
    #[error("cannot build HTTP client: {0}")]
    Client(String),
}
