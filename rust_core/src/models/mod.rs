// Shared models for the lineup replay pipeline
pub mod event;
pub mod lineup;
pub mod record;

pub use event::{
    Action, BoundaryKind, GameEvent, PlayerId, PlayerRef, Qualifier, QualifierSet,
    ReboundKind, ShotResult, ShotValue, SubstitutionKind, TeamSide,
};
pub use lineup::{Lineup, LINEUP_SIZE};
pub use record::TeamGameRecord;
