//! Mutable on-court set for one side.

use crate::models::{Lineup, PlayerId, PlayerRef, TeamSide, LINEUP_SIZE};
use tracing::warn;

/// Players one side currently has on court, in order of arrival.
///
/// Membership is by [`PlayerId`]. The set may transiently hold 4 or 6
/// players while a two-event substitution is half applied; callers check
/// [`LineupState::is_complete`] before trusting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupState {
    side: TeamSide,
    players: Vec<PlayerRef>,
}

impl LineupState {
    pub fn new(side: TeamSide) -> Self {
        Self {
            side,
            players: Vec::with_capacity(LINEUP_SIZE + 1),
        }
    }

    /// Build from a player list, ignoring repeated ids.
    pub fn with_players<I>(side: TeamSide, players: I) -> Self
    where
        I: IntoIterator<Item = PlayerRef>,
    {
        let mut state = Self::new(side);
        for player in players {
            if !state.contains(player.id) {
                state.players.push(player);
            }
        }
        state
    }

    pub fn side(&self) -> TeamSide {
        self.side
    }

    pub fn players(&self) -> &[PlayerRef] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.players.len() == LINEUP_SIZE
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    /// Put a player on court. Returns `false` (set unchanged) if already there.
    pub fn add(&mut self, player: PlayerRef) -> bool {
        if self.contains(player.id) {
            warn!(
                side = %self.side,
                player_id = player.id.0,
                player = player.name.as_str(),
                "Player already on court, ignoring substitution in"
            );
            return false;
        }
        self.players.push(player);
        true
    }

    /// Take a player off court. Returns `false` (set unchanged) if absent.
    pub fn remove(&mut self, id: PlayerId) -> bool {
        match self.players.iter().position(|p| p.id == id) {
            Some(idx) => {
                self.players.remove(idx);
                true
            }
            None => {
                warn!(
                    side = %self.side,
                    player_id = id.0,
                    "Player not on court, ignoring substitution out"
                );
                false
            }
        }
    }

    /// Swap `out` for `incoming`. Fails without touching the set when `out`
    /// is not on court.
    pub fn apply_substitution(&mut self, out: PlayerId, incoming: PlayerRef) -> bool {
        if !self.remove(out) {
            return false;
        }
        if !self.add(incoming) {
            // Incoming was already listed: the set shrank by one, which the
            // completeness guard will catch.
            return false;
        }
        true
    }

    /// Replace the whole set (period starts, re-inference).
    pub fn reset<I>(&mut self, players: I)
    where
        I: IntoIterator<Item = PlayerRef>,
    {
        *self = Self::with_players(self.side, players);
    }

    /// Sorted name key for stint grouping.
    pub fn lineup(&self) -> Lineup {
        Lineup::from_names(self.players.iter().map(|p| p.name.clone()))
    }
}
