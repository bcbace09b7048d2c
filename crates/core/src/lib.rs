//! `questgrid-core`: read-only grid model shared by the resolver and the sources.
//!
//! A [`Grid`] is an immutable snapshot of one sheet. Nothing in the workspace
//! mutates a grid after construction, so a snapshot can be shared across
//! threads behind an `Arc` without locking.

pub mod cell;
pub mod grid;
pub mod normalize;
pub mod source;

pub use cell::Cell;
pub use grid::Grid;
pub use normalize::normalize;
pub use source::{GridSource, MemorySource, SourceError};
