//! Error taxonomy for game fetching, replay and table storage.
//!
//! Lineup-inference and identity-resolution problems are deliberately absent:
//! they never abort anything and are reported through
//! [`crate::replay::ReplayDiagnostics`] instead.

use thiserror::Error;

/// Failures raised by a [`crate::sources::GameSource`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network/provider hiccup; worth retrying.
    #[error("transient fetch failure for game {game_id}: {message}")]
    Transient { game_id: String, message: String },

    /// The provider has no data for this game yet.
    #[error("game {game_id} has not been played yet")]
    NotYetPlayed { game_id: String },

    /// The game is underway; its log is incomplete.
    #[error("game {game_id} is still in progress")]
    InProgress { game_id: String },

    /// The payload does not look like any known schema.
    #[error("unexpected payload shape for game {game_id}: {message}")]
    SchemaMismatch { game_id: String, message: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }

    /// Whether this game, and every later game in the schedule, cannot be
    /// replayed yet. Stops the batch without being an error.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FetchError::NotYetPlayed { .. } | FetchError::InProgress { .. }
        )
    }
}

/// Failures that abandon a single game. The batch always continues.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("schema mismatch in game {game_id}: {message}")]
    SchemaMismatch { game_id: String, message: String },

    #[error("could not resolve home/away teams for game {game_id}")]
    UnresolvedTeams { game_id: String },
}

impl GameError {
    pub fn schema(game_id: &str, message: impl Into<String>) -> Self {
        GameError::SchemaMismatch {
            game_id: game_id.to_string(),
            message: message.into(),
        }
    }
}

/// Failures reading or writing the per-team tables.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_classification() {
        let transient = FetchError::Transient {
            game_id: "1".into(),
            message: "timeout".into(),
        };
        assert!(transient.is_transient());
        assert!(!transient.is_terminal());

        let pending = FetchError::NotYetPlayed { game_id: "2".into() };
        assert!(pending.is_terminal());
        assert!(!pending.is_transient());

        let live = FetchError::InProgress { game_id: "3".into() };
        assert!(live.is_terminal());

        let bad = FetchError::SchemaMismatch {
            game_id: "4".into(),
            message: "no actions".into(),
        };
        assert!(!bad.is_transient());
        assert!(!bad.is_terminal());
    }

    #[test]
    fn test_game_error_wraps_fetch() {
        let err: GameError = FetchError::NotYetPlayed { game_id: "9".into() }.into();
        assert_eq!(err.to_string(), "game 9 has not been played yet");
    }
}
