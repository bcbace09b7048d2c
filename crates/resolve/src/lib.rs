//! `questgrid-resolve`: locate a player in loosely structured sheets.
//!
//! Pure engine crate: receives grids (directly or through a
//! [`GridSource`](questgrid_core::GridSource)), returns typed resolutions.
//! No CLI or IO dependencies.

pub mod config;
pub mod error;
pub mod identity;
pub mod level;
pub mod model;
pub mod names;
pub mod pipeline;
pub mod quests;
mod vocab;

pub use config::ResolverConfig;
pub use error::ResolveError;
pub use identity::IdentityResolver;
pub use level::{LevelCalculator, LevelInfo};
pub use model::{
    Candidate, CanonicalIdentity, CompletionSignal, PlayerHandle, ProgressSnapshot,
    QuestDefinition, QuestPartition, QuestRecord, Resolution, ResolvedPlayer, Stage,
};
pub use names::NameMatcher;
pub use pipeline::{resolve_grids, LookupOptions, ResolutionPipeline};
pub use quests::QuestScanner;

/// Transport failure while fetching a grid; the one fatal lookup outcome.
pub type GridUnavailable = questgrid_core::SourceError;
