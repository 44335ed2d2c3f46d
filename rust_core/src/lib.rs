//! CourtEdge Core - Lineup reconstruction and per-stint efficiency aggregation.
//!
//! This module provides:
//! - Event normalization for the live and legacy play-by-play schemas
//! - Player identity resolution with versioned name corrections
//! - On-court lineup tracking with forward-scan inference and repair
//! - Elapsed-time attribution and possession estimates
//! - Per-(team, period, lineup) stint aggregation with average heights
//! - Pluggable game sources with retry, and a parallel batch runner
//! - Per-team CSV tables with dense game numbering

pub mod batch;
pub mod elapsed;
pub mod error;
pub mod lineup;
pub mod models;
pub mod normalize;
pub mod possessions;
pub mod replay;
pub mod retry;
pub mod roster;
pub mod sources;
pub mod stints;
pub mod store;

pub use batch::{run_batch, AggregationContext, BatchOptions, BatchSummary};
pub use error::{FetchError, GameError, StoreError};
pub use models::{GameEvent, Lineup, TeamGameRecord, TeamSide};
pub use replay::{replay_game, GameInput, GameReplay, ReferenceTables, ReplayOptions};
pub use sources::{GameSource, JsonDirSource, MemorySource};
pub use store::TeamTableStore;
