//! Per-team persistent stint tables.
//!
//! One CSV file per team abbreviation, named
//! `{prefix}_{TEAM}_{season}.csv`. Rows are appended as games are replayed;
//! `game_number` is derived afterward by renumbering the whole table.

use crate::error::StoreError;
use crate::models::TeamGameRecord;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TeamTableStore {
    dir: PathBuf,
    prefix: String,
    season: String,
}

impl TeamTableStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str, season: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
            season: season.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, team: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}_{}.csv", self.prefix, team, self.season))
    }

    /// Append rows to a team's table, writing the header if the table is new.
    pub fn append(&self, team: &str, records: &[TeamGameRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        let path = self.table_path(team);
        fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;

        let is_new = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| io_error(&path, source))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        for record in records {
            writer
                .serialize(record)
                .map_err(|source| csv_error(&path, source))?;
        }
        writer.flush().map_err(|source| io_error(&path, source))?;

        debug!(team, rows = records.len(), path = %path.display(), "Appended stint rows");
        Ok(records.len())
    }

    /// Read a team's table. A missing table reads as empty.
    pub fn read(&self, team: &str) -> Result<Vec<TeamGameRecord>, StoreError> {
        let path = self.table_path(team);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path).map_err(|source| csv_error(&path, source))?;
        reader
            .deserialize()
            .collect::<Result<Vec<TeamGameRecord>, _>>()
            .map_err(|source| csv_error(&path, source))
    }

    /// Replace a team's table with `records`.
    pub fn write(&self, team: &str, records: &[TeamGameRecord]) -> Result<(), StoreError> {
        let path = self.table_path(team);
        fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        let mut writer = csv::Writer::from_path(&path).map_err(|source| csv_error(&path, source))?;
        for record in records {
            writer
                .serialize(record)
                .map_err(|source| csv_error(&path, source))?;
        }
        writer.flush().map_err(|source| io_error(&path, source))
    }

    /// Rewrite a team's table sorted by game id with dense game numbers.
    /// Returns the number of distinct games.
    pub fn assign_game_numbers(&self, team: &str) -> Result<u32, StoreError> {
        let mut records = self.read(team)?;
        let games = assign_game_numbers(&mut records);
        self.write(team, &records)?;
        info!(team, games, rows = records.len(), "Renumbered team table");
        Ok(games)
    }

    /// Team abbreviations with a table in the store directory.
    pub fn teams(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_error(&self.dir, source)),
        };
        let head = format!("{}_", self.prefix);
        let tail = format!("_{}.csv", self.season);

        let mut teams: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| {
                name.strip_prefix(&head)
                    .and_then(|rest| rest.strip_suffix(&tail))
                    .filter(|team| !team.is_empty())
                    .map(str::to_string)
            })
            .collect();
        teams.sort();
        Ok(teams)
    }
}

/// Sort rows by game id (stable) and set `game_number` to the 1-based dense
/// rank of each row's game id. Returns the number of distinct games.
pub fn assign_game_numbers(records: &mut [TeamGameRecord]) -> u32 {
    records.sort_by(|a, b| a.game_id.cmp(&b.game_id));

    let mut ranks: BTreeMap<String, u32> = BTreeMap::new();
    for record in records.iter() {
        let next = ranks.len() as u32 + 1;
        ranks.entry(record.game_id.clone()).or_insert(next);
    }
    for record in records.iter_mut() {
        record.game_number = ranks.get(&record.game_id).copied();
    }
    ranks.len() as u32
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Lineup, TeamGameRecord};

    pub fn record(game_id: &str, team: &str, period: u8) -> TeamGameRecord {
        TeamGameRecord {
            game_id: game_id.to_string(),
            team: team.to_string(),
            opponent: "LAL".to_string(),
            team_avg_height: Some(78.5),
            opp_avg_height: None,
            lineup: Lineup::from_names(["E", "D", "C", "B", "A"]),
            minutes_played: 2.5,
            period,
            points: 7,
            opp_points: 4,
            rebounds: 3,
            opp_rebounds: 2,
            assists: 1,
            opp_assists: 0,
            turnovers: 1,
            opp_turnovers: 2,
            fouls_committed: 1,
            fouls_drawn: 2,
            possessions: 5.44,
            opp_possessions: 4.0,
            fastbreak: 2,
            from_turnover: 0,
            second_chance: 2,
            points_in_paint: 4,
            opp_from_turnover: 2,
            opp_fastbreak: 0,
            opp_second_chance: 0,
            opp_points_in_paint: 2,
            unscaled_pace: 9.44,
            game_number: None,
        }
    }
}
