use crate::normalize::literal::{parse_sequence_literal, render_tuple_literal};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Players a team has on court at once.
pub const LINEUP_SIZE: usize = 5;

/// Sorted tuple of on-court player names; the grouping key for stints.
///
/// Serialized as a tuple literal (`('A', 'B', 'C', 'D', 'E')`) so rows stay
/// readable by existing table consumers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lineup(Vec<String>);

impl Lineup {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        Self(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == LINEUP_SIZE
    }

    pub fn to_tuple_literal(&self) -> String {
        render_tuple_literal(&self.0)
    }
}

impl fmt::Display for Lineup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tuple_literal())
    }
}

impl Serialize for Lineup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_tuple_literal())
    }
}

impl<'de> Deserialize<'de> for Lineup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_sequence_literal(&raw)
            .map(Lineup::from_names)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid lineup literal: {raw}")))
    }
}
