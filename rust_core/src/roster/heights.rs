//! Player physical reference data and average lineup height.
//!
//! This module provides:
//! - Height (inches) and team abbreviation by corrected full name
//! - Fuzzy Jaro-Winkler fallback for spellings the correction table misses
//! - A shared per-lineup average cache, safe across replay workers

use super::corrections::NameCorrections;
use crate::models::Lineup;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use strsim::jaro_winkler;
use tracing::{debug, info, warn};

/// Minimum Jaro-Winkler similarity for a fuzzy name join.
pub const FUZZY_NAME_THRESHOLD: f64 = 0.97;

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerReferenceRow {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Feet-inches, e.g. `6-8`.
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub team_abbreviation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct PlayerPhysical {
    height_inches: Option<f64>,
    team: Option<String>,
}

#[derive(Debug, Default)]
pub struct HeightIndex {
    players: FxHashMap<String, PlayerPhysical>,
    lineup_cache: RwLock<FxHashMap<Lineup, Option<f64>>>,
}

impl HeightIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the reference CSV (`first_name,last_name,height,team_abbreviation`).
    pub fn load(path: &Path, corrections: &NameCorrections) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open player reference: {}", path.display()))?;
        let rows = reader
            .deserialize::<PlayerReferenceRow>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Malformed player reference: {}", path.display()))?;
        let index = Self::from_rows(rows, corrections);
        info!(players = index.players.len(), "Loaded player reference table");
        Ok(index)
    }

    pub fn from_rows<I>(rows: I, corrections: &NameCorrections) -> Self
    where
        I: IntoIterator<Item = PlayerReferenceRow>,
    {
        let mut index = Self::new();
        for row in rows {
            let name = corrections.apply(&format!(
                "{} {}",
                row.first_name.trim(),
                row.last_name.trim()
            ));
            let physical = PlayerPhysical {
                height_inches: row.height.as_deref().and_then(parse_height),
                team: row
                    .team_abbreviation
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            };
            // Keep the first row that actually carries a height.
            match index.players.get(&name) {
                Some(existing) if existing.height_inches.is_some() => {}
                _ => {
                    index.players.insert(name, physical);
                }
            }
        }
        index
    }

    /// Join a name against the table. `team` is the box-score team: an
    /// exact join on another team is only logged (trades), while fuzzy
    /// candidates on the same team win over equally close ones elsewhere.
    fn lookup(&self, name: &str, team: Option<&str>) -> Option<&PlayerPhysical> {
        if let Some(found) = self.players.get(name) {
            if let (Some(team), Some(listed)) = (team, found.team.as_deref()) {
                if listed != team {
                    debug!(player = name, team, listed, "Reference team differs from box score");
                }
            }
            return Some(found);
        }

        let (best_name, best_score, _) = self
            .players
            .iter()
            .map(|(candidate, physical)| {
                let same_team = team.is_some() && physical.team.as_deref() == team;
                (candidate, jaro_winkler(name, candidate), same_team)
            })
            .filter(|(_, score, _)| *score >= FUZZY_NAME_THRESHOLD)
            .max_by(|a, b| a.2.cmp(&b.2).then(a.1.total_cmp(&b.1)))?;

        warn!(
            player = name,
            matched = best_name.as_str(),
            score = best_score,
            "Fuzzy-matched player reference name"
        );
        self.players.get(best_name)
    }

    /// Height in inches, if the player resolves and has one.
    pub fn player_height(&self, name: &str) -> Option<f64> {
        self.lookup(name, None).and_then(|p| p.height_inches)
    }

    /// Mean height of the lineup's resolvable players.
    ///
    /// Unresolved players are logged and left out of the mean; a lineup with
    /// no resolvable player has no height. Results are cached per lineup,
    /// whose names already pin down `team`.
    pub fn lineup_average(&self, game_id: &str, team: &str, lineup: &Lineup) -> Option<f64> {
        if self.players.is_empty() {
            return None;
        }
        if let Some(cached) = self.lineup_cache.read().get(lineup) {
            return *cached;
        }

        let mut total = 0.0;
        let mut resolved = 0usize;
        for name in lineup.names() {
            match self.lookup(name, Some(team)).and_then(|p| p.height_inches) {
                Some(h) => {
                    total += h;
                    resolved += 1;
                }
                None => warn!(game_id, player = name.as_str(), "Could not resolve player height"),
            }
        }
        let average = (resolved > 0).then(|| total / resolved as f64);

        self.lineup_cache.write().insert(lineup.clone(), average);
        average
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Parse `F-I` feet-inches into total inches.
pub fn parse_height(raw: &str) -> Option<f64> {
    let (feet, inches) = raw.trim().split_once('-')?;
    let feet = feet.trim().parse::<u32>().ok()?;
    let inches = inches.trim().parse::<u32>().ok()?;
    Some((feet * 12 + inches) as f64)
}
