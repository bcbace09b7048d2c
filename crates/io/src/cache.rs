// Snapshot cache over any grid source

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use questgrid_core::{Grid, GridSource, SourceError};

/// Memoizes one grid per sheet until invalidated.
///
/// Failed fetches are not remembered; the next lookup retries the inner
/// source. Concurrent misses on the same sheet may both fetch; the first
/// stored grid wins so every caller sees one snapshot.
pub struct CachedSource<S> {
    inner: S,
    grids: RwLock<HashMap<String, Arc<Grid>>>,
}

impl<S: GridSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            grids: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached grid.
    pub fn invalidate(&self) {
        let dropped = {
            let mut grids = self.grids.write();
            let n = grids.len();
            grids.clear();
            n
        };
        log::info!("cache cleared ({dropped} sheets)");
    }

    /// Drop one sheet; returns whether it was cached.
    pub fn invalidate_sheet(&self, sheet: &str) -> bool {
        self.grids.write().remove(sheet).is_some()
    }

    pub fn is_cached(&self, sheet: &str) -> bool {
        self.grids.read().contains_key(sheet)
    }
}

impl<S: GridSource> GridSource for CachedSource<S> {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
        if let Some(grid) = self.grids.read().get(sheet) {
            return Ok(Arc::clone(grid));
        }

        // Fetch outside the lock so a slow source does not block readers.
        let fresh = self.inner.fetch(sheet)?;

        let mut grids = self.grids.write();
        let grid = grids
            .entry(sheet.to_string())
            .or_insert_with(|| {
                log::info!("cached '{}' ({} rows)", sheet, fresh.height());
                Arc::clone(&fresh)
            });
        Ok(Arc::clone(grid))
    }
}
