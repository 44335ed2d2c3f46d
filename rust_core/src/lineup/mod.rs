//! Lineup Tracker: who is on court for each side, event by event.

pub mod corrections;
pub mod state;
pub mod tracker;

pub use corrections::{KnownCorrections, LineupCorrection};
pub use state::LineupState;
pub use tracker::{
    scan_on_court, InferenceContext, LineupDiagnostics, LineupTracker, TrackerPhase,
    DEFAULT_SCAN_WINDOW,
};
