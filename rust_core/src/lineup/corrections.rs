//! Known lineup corrections for games where inference cannot recover.
//!
//! Some feeds are missing substitution events outright. Rather than branch on
//! game ids in code, the supplementary players live in a JSON table:
//!
//! ```json
//! [{ "game_id": "0022500123", "side": "home", "period": 3,
//!    "players": ["Jalen Green"] }]
//! ```
//!
//! `period` is optional; an entry without one applies to every period.

use crate::models::TeamSide;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupCorrection {
    pub game_id: String,
    pub side: TeamSide,
    #[serde(default)]
    pub period: Option<u8>,
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct KnownCorrections {
    entries: FxHashMap<(String, TeamSide), Vec<LineupCorrection>>,
}

impl KnownCorrections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = LineupCorrection>,
    {
        let mut table = Self::new();
        for entry in entries {
            table
                .entries
                .entry((entry.game_id.clone(), entry.side))
                .or_default()
                .push(entry);
        }
        table
    }

    /// Load from a JSON file. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Lineup correction table not found, using empty table");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lineup corrections: {}", path.display()))?;
        let entries: Vec<LineupCorrection> = serde_json::from_str(&content)
            .with_context(|| format!("Malformed lineup corrections: {}", path.display()))?;

        let table = Self::from_entries(entries);
        info!(path = %path.display(), games = table.entries.len(), "Loaded lineup corrections");
        Ok(table)
    }

    /// Supplementary player names for a side in a period, most specific
    /// entries (matching `period`) first.
    pub fn players_for(&self, game_id: &str, side: TeamSide, period: u8) -> Vec<&str> {
        let Some(entries) = self.entries.get(&(game_id.to_string(), side)) else {
            return Vec::new();
        };
        let exact = entries.iter().filter(|e| e.period == Some(period));
        let general = entries.iter().filter(|e| e.period.is_none());
        exact
            .chain(general)
            .flat_map(|e| e.players.iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
