use std::time::{Duration, Instant};

use questgrid_core::{Grid, GridSource, SourceError};

use crate::config::ResolverConfig;
use crate::identity::IdentityResolver;
use crate::level::LevelCalculator;
use crate::model::{
    Candidate, CanonicalIdentity, PlayerHandle, ProgressSnapshot, Resolution, ResolvedPlayer,
    Stage,
};
use crate::names::NameMatcher;
use crate::quests::QuestScanner;

#[derive(Debug, Clone, Copy, Default)]
pub struct LookupOptions {
    /// Give up with [`Resolution::TimedOut`] once this much time has passed.
    pub timeout: Option<Duration>,
}

impl LookupOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

struct Deadline(Option<Instant>);

impl Deadline {
    fn start(timeout: Option<Duration>) -> Self {
        Self(timeout.and_then(|t| Instant::now().checked_add(t)))
    }

    fn expired(&self) -> bool {
        self.0.is_some_and(|end| Instant::now() >= end)
    }
}

/// Handle → identity → progress → quest partition, against grids from a source.
///
/// Holds no state between lookups; share one pipeline across threads as long
/// as the source allows it.
pub struct ResolutionPipeline<S> {
    source: S,
    config: ResolverConfig,
}

impl<S: GridSource> ResolutionPipeline<S> {
    pub fn new(source: S, config: ResolverConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn resolve(&self, handle: &str) -> Result<Resolution, SourceError> {
        self.resolve_with(handle, &LookupOptions::default())
    }

    /// Only a failed fetch is an `Err`; not-found and timeout are resolutions.
    /// The quest sheet is not fetched when the handle is unknown.
    pub fn resolve_with(
        &self,
        handle: &str,
        options: &LookupOptions,
    ) -> Result<Resolution, SourceError> {
        let deadline = Deadline::start(options.timeout);
        let handle = PlayerHandle::new(handle);

        let identity_grid = self.source.fetch(&self.config.identity.sheet)?;
        if deadline.expired() {
            return Ok(Resolution::TimedOut {
                stage: Stage::FetchIdentity,
            });
        }

        let Some(found) = identify(&self.config, &identity_grid, &handle) else {
            return Ok(Resolution::HandleNotFound {
                handle: handle.to_string(),
            });
        };

        let quest_grid = self.source.fetch(&self.config.quests.sheet)?;
        if deadline.expired() {
            return Ok(Resolution::TimedOut {
                stage: Stage::FetchQuests,
            });
        }

        let Some(quest_row) = match_row(&self.config, &quest_grid, &found.identity) else {
            return Ok(found.into_name_row_not_found());
        };
        if deadline.expired() {
            return Ok(Resolution::TimedOut {
                stage: Stage::MatchName,
            });
        }

        Ok(scan_into_resolution(&self.config, &quest_grid, quest_row, found))
    }

    /// Every listing of `handle` in the identity sheet, in scan order.
    pub fn candidates(&self, handle: &str) -> Result<Vec<Candidate>, SourceError> {
        let grid = self.source.fetch(&self.config.identity.sheet)?;
        Ok(IdentityResolver::new(&self.config.identity).candidates(&grid, &handle.into()))
    }
}

/// Resolve against grids the caller already holds. Grids are only read, so
/// one snapshot can serve any number of concurrent lookups.
pub fn resolve_grids(
    config: &ResolverConfig,
    identity_grid: &Grid,
    quest_grid: &Grid,
    handle: &str,
) -> Resolution {
    let handle = PlayerHandle::new(handle);
    let Some(found) = identify(config, identity_grid, &handle) else {
        return Resolution::HandleNotFound {
            handle: handle.to_string(),
        };
    };
    match match_row(config, quest_grid, &found.identity) {
        Some(row) => scan_into_resolution(config, quest_grid, row, found),
        None => found.into_name_row_not_found(),
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

struct Identified {
    identity: CanonicalIdentity,
    progress: ProgressSnapshot,
    candidate: Candidate,
    candidate_count: usize,
}

impl Identified {
    fn into_name_row_not_found(self) -> Resolution {
        Resolution::NameRowNotFound {
            identity: self.identity,
            progress: self.progress,
        }
    }
}

fn identify(config: &ResolverConfig, grid: &Grid, handle: &PlayerHandle) -> Option<Identified> {
    let resolver = IdentityResolver::new(&config.identity);
    let (candidate, candidate_count) = resolver.disambiguate(grid, handle)?;

    let info = LevelCalculator::new(&config.levels.thresholds).level_info(candidate.xp);
    let progress = ProgressSnapshot {
        xp: candidate.xp,
        level: info.level,
        progress: info.progress,
        label: info.label,
        is_terminal: candidate.is_terminal,
    };

    Some(Identified {
        identity: resolver.identity(grid, &candidate),
        progress,
        candidate,
        candidate_count,
    })
}

fn match_row(config: &ResolverConfig, grid: &Grid, identity: &CanonicalIdentity) -> Option<usize> {
    NameMatcher::new(&config.names).find_row(
        grid,
        &identity.display_name,
        config.quests.data_start_row,
    )
}

fn scan_into_resolution(
    config: &ResolverConfig,
    grid: &Grid,
    quest_row: usize,
    found: Identified,
) -> Resolution {
    let q = &config.quests;
    let partition = QuestScanner::new(q).scan(
        grid.row(q.header_row),
        grid.row(q.master_row),
        grid.row(quest_row),
        q.start_column,
    );

    log::debug!(
        "'{}': {} completed, {} open quests",
        found.identity.handle,
        partition.completed.len(),
        partition.open.len()
    );

    Resolution::Resolved(ResolvedPlayer {
        identity: found.identity,
        progress: found.progress,
        quests_completed: partition.completed,
        quests_open: partition.open,
        quest_row,
        candidate: found.candidate,
        candidate_count: found.candidate_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as Counter;
    use std::sync::Arc;

    use questgrid_core::MemorySource;

    fn identity_grid() -> Grid {
        Grid::from_text_rows(
            "Gamertags",
            vec![
                vec!["Name", "Gamertag", "XP", "Level", "Status"],
                vec!["Ada Lovelace", "ElArg", "500", "4", ""],
            ],
        )
    }

    fn quest_grid() -> Grid {
        Grid::from_text_rows(
            "Quests",
            vec![
                vec!["Nachname", "Vorname", "Klasse", "Bohrung", "", "Lochblech", ""],
                vec!["", "", "", "50", "", "80", ""],
                vec!["Lovelace", "Ada", "FOS12B", "ABGESCHLOSSEN", "", "", ""],
            ],
        )
    }

    /// Counts fetches per call so tests can check which sheets were touched.
    struct CountingSource {
        inner: MemorySource,
        fetches: Counter<usize>,
        delay: Duration,
    }

    impl GridSource for CountingSource {
        fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
            self.fetches.set(self.fetches.get() + 1);
            std::thread::sleep(self.delay);
            self.inner.fetch(sheet)
        }
    }

    fn counting(delay: Duration) -> CountingSource {
        CountingSource {
            inner: MemorySource::new()
                .with_grid(identity_grid())
                .with_grid(quest_grid()),
            fetches: Counter::new(0),
            delay,
        }
    }

    #[test]
    fn unknown_handle_skips_quest_fetch() {
        let pipeline = ResolutionPipeline::new(counting(Duration::ZERO), ResolverConfig::default());
        let r = pipeline.resolve("ghost").unwrap();
        assert_eq!(r, Resolution::HandleNotFound { handle: "ghost".into() });
        assert_eq!(pipeline.source().fetches.get(), 1);
    }

    #[test]
    fn zero_timeout_times_out_after_first_fetch() {
        let pipeline = ResolutionPipeline::new(counting(Duration::from_millis(5)), ResolverConfig::default());
        let r = pipeline
            .resolve_with("ElArg", &LookupOptions::with_timeout(Duration::ZERO))
            .unwrap();
        assert_eq!(r, Resolution::TimedOut { stage: Stage::FetchIdentity });
        assert_eq!(pipeline.source().fetches.get(), 1);
    }

    #[test]
    fn generous_timeout_resolves() {
        let pipeline = ResolutionPipeline::new(counting(Duration::ZERO), ResolverConfig::default());
        let r = pipeline
            .resolve_with("ElArg", &LookupOptions::with_timeout(Duration::from_secs(30)))
            .unwrap();
        assert!(r.player().is_some());
    }

    #[test]
    fn missing_sheet_is_an_error() {
        let source = MemorySource::new().with_grid(identity_grid());
        let pipeline = ResolutionPipeline::new(source, ResolverConfig::default());
        let err = pipeline.resolve("ElArg").unwrap_err();
        assert_eq!(err, SourceError::SheetNotFound { sheet: "Quests".into() });
    }

    #[test]
    fn resolve_grids_matches_pipeline() {
        let config = ResolverConfig::default();
        let direct = resolve_grids(&config, &identity_grid(), &quest_grid(), "elarg");
        let pipeline = ResolutionPipeline::new(counting(Duration::ZERO), config);
        assert_eq!(direct, pipeline.resolve("elarg").unwrap());

        let player = direct.player().unwrap();
        assert_eq!(player.progress.level, 4);
        assert_eq!(player.quest_row, 2);
        assert_eq!(player.quests_completed.len(), 1);
        assert_eq!(player.quests_completed[0].definition.label, "Bohrung");
        assert_eq!(player.quests_open[0].definition.label, "Lochblech");
    }
}
