//! Player id → display name lookup with tiered fallback.

use super::corrections::NameCorrections;
use crate::models::PlayerId;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Sentinel name for a player no table knows.
pub const UNKNOWN_PLAYER: &str = "unknown";

/// Which tier answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    ActiveRoster,
    StaticTable,
    BoxScore,
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ActiveRosterRow {
    player_id: Option<String>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

#[derive(Debug, Deserialize)]
struct StaticPlayerRow {
    id: Option<String>,
    #[serde(default)]
    full_name: String,
}

/// Two-tier player directory: the season's active roster first, then a
/// static all-time table. Every stored name is already corrected.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    active: FxHashMap<PlayerId, String>,
    fallback: FxHashMap<PlayerId, String>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both tiers from CSV. Either path may be absent.
    pub fn load(
        active_roster: Option<&Path>,
        static_table: Option<&Path>,
        corrections: &NameCorrections,
    ) -> Result<Self> {
        let mut directory = Self::new();

        if let Some(path) = active_roster {
            let mut reader = csv::Reader::from_path(path)
                .with_context(|| format!("Failed to open active roster: {}", path.display()))?;
            for row in reader.deserialize::<ActiveRosterRow>() {
                let row = row
                    .with_context(|| format!("Malformed active roster row in {}", path.display()))?;
                if let Some(id) = row.player_id.as_deref().and_then(parse_player_id) {
                    let name = format!("{} {}", row.first_name.trim(), row.last_name.trim());
                    directory.insert_active(id, &corrections.apply(&name));
                }
            }
        }

        if let Some(path) = static_table {
            let mut reader = csv::Reader::from_path(path)
                .with_context(|| format!("Failed to open player table: {}", path.display()))?;
            for row in reader.deserialize::<StaticPlayerRow>() {
                let row = row
                    .with_context(|| format!("Malformed player table row in {}", path.display()))?;
                if let Some(id) = row.id.as_deref().and_then(parse_player_id) {
                    directory.insert_fallback(id, &corrections.apply(&row.full_name));
                }
            }
        }

        info!(
            active = directory.active.len(),
            fallback = directory.fallback.len(),
            "Loaded player directory"
        );
        Ok(directory)
    }

    pub fn insert_active(&mut self, id: PlayerId, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.active.insert(id, name.to_string());
        }
    }

    pub fn insert_fallback(&mut self, id: PlayerId, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.fallback.insert(id, name.to_string());
        }
    }

    /// Resolve a name: active roster, static table, the game's box score,
    /// else [`UNKNOWN_PLAYER`].
    pub fn resolve(&self, id: PlayerId, box_name: Option<&str>) -> (String, NameSource) {
        if let Some(name) = self.active.get(&id) {
            return (name.clone(), NameSource::ActiveRoster);
        }
        if let Some(name) = self.fallback.get(&id) {
            return (name.clone(), NameSource::StaticTable);
        }
        match box_name {
            Some(name) if !name.trim().is_empty() => (name.to_string(), NameSource::BoxScore),
            _ => (UNKNOWN_PLAYER.to_string(), NameSource::Unknown),
        }
    }
}

/// Ids exported through spreadsheets sometimes come back as `1630173.0`.
fn parse_player_id(raw: &str) -> Option<PlayerId> {
    let raw = raw.trim();
    let digits = raw.strip_suffix(".0").unwrap_or(raw);
    digits.parse::<u64>().ok().map(PlayerId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolution_tiers() {
        let mut directory = PlayerDirectory::new();
        directory.insert_active(PlayerId(1), "Active Name");
        directory.insert_fallback(PlayerId(1), "Static Name");
        directory.insert_fallback(PlayerId(2), "Only Static");

        assert_eq!(
            directory.resolve(PlayerId(1), Some("Box")),
            ("Active Name".to_string(), NameSource::ActiveRoster)
        );
        assert_eq!(
            directory.resolve(PlayerId(2), None),
            ("Only Static".to_string(), NameSource::StaticTable)
        );
        assert_eq!(
            directory.resolve(PlayerId(3), Some("Box Name")),
            ("Box Name".to_string(), NameSource::BoxScore)
        );
        assert_eq!(
            directory.resolve(PlayerId(4), None),
            (UNKNOWN_PLAYER.to_string(), NameSource::Unknown)
        );
    }

    #[test]
    fn test_parse_player_id() {
        assert_eq!(parse_player_id("1630173"), Some(PlayerId(1630173)));
        assert_eq!(parse_player_id("1630173.0"), Some(PlayerId(1630173)));
        assert_eq!(parse_player_id(""), None);
        assert_eq!(parse_player_id("abc"), None);
    }

    #[test]
    fn test_load_from_csv_applies_corrections() {
        let dir = tempfile::tempdir().unwrap();
        let active = dir.path().join("active.csv");
        let table = dir.path().join("players.csv");
        fs::write(
            &active,
            "player_id,first_name,last_name,position,team_abbreviation\n\
             1630173.0,Hansen,Yang,C,POR\n\
             ,Missing,Id,G,BOS\n",
        )
        .unwrap();
        fs::write(&table, "id,full_name,is_active\n2544,LeBron James,True\n").unwrap();

        let mut corrections = NameCorrections::new();
        corrections.insert("Hansen Yang", "Yang Hansen");

        let directory =
            PlayerDirectory::load(Some(&active), Some(&table), &corrections).unwrap();
        assert_eq!(directory.resolve(PlayerId(1630173), None).0, "Yang Hansen");
        assert_eq!(
            directory.resolve(PlayerId(2544), None),
            ("LeBron James".to_string(), NameSource::StaticTable)
        );
    }
}
