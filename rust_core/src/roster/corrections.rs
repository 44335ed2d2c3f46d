//! Name-correction table for cross-provider player joins.
//!
//! This module provides:
//! - A versioned, data-driven mapping of provider spellings to canonical names
//!   (diacritics, suffixes, nicknames, reversed family names)
//! - JSON persistence, so the table grows without code changes

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Full-name corrections applied at ingestion, before any join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameCorrections {
    /// Bumped whenever entries are added or changed.
    #[serde(default)]
    pub version: u32,
    /// "provider spelling" -> "canonical spelling"
    #[serde(default)]
    corrections: BTreeMap<String, String>,
}

impl NameCorrections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Name correction table not found, using empty table");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read name corrections: {}", path.display()))?;
        let table: Self = serde_json::from_str(&content)
            .with_context(|| format!("Malformed name corrections: {}", path.display()))?;

        info!(
            path = %path.display(),
            version = table.version,
            entries = table.len(),
            "Loaded name correction table"
        );
        Ok(table)
    }

    /// Save to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write name corrections: {}", path.display()))
    }

    /// Insert or replace a correction.
    pub fn insert(&mut self, from: &str, to: &str) {
        self.corrections
            .insert(from.trim().to_string(), to.trim().to_string());
    }

    /// Canonical spelling for `name` (trimmed; unchanged when no entry exists).
    pub fn apply(&self, name: &str) -> String {
        let name = name.trim();
        self.corrections
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_and_unknown() {
        let mut table = NameCorrections::new();
        table.insert("Hansen Yang", "Yang Hansen");
        table.insert("Nikola Jokic", "Nikola Jokić");

        assert_eq!(table.apply("Hansen Yang"), "Yang Hansen");
        assert_eq!(table.apply(" Nikola Jokic "), "Nikola Jokić");
        assert_eq!(table.apply("Jalen Brunson"), "Jalen Brunson");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");

        let mut table = NameCorrections::new();
        table.version = 4;
        table.insert("Zach Lavine", "Zach LaVine");
        table.save(&path).unwrap();

        let loaded = NameCorrections::load(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.version, 4);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = NameCorrections::load(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(NameCorrections::load(&path).is_err());
    }
}
