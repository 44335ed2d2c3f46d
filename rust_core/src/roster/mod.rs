//! Roster and player reference data consulted during ingestion.

pub mod boxscore;
pub mod corrections;
pub mod directory;
pub mod heights;

pub use boxscore::{BoxPlayer, BoxScore, TeamBox, TeamResolver};
pub use corrections::NameCorrections;
pub use directory::{NameSource, PlayerDirectory, UNKNOWN_PLAYER};
pub use heights::{HeightIndex, PlayerReferenceRow};
