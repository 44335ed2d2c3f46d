//! Defensive parsing of shot qualifier fields and free-text markers.

use super::literal::parse_sequence_literal;
use crate::models::{Qualifier, QualifierSet};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Build a qualifier set from a raw field: a JSON array of tags, or a string
/// holding a serialized list literal. Anything unparseable is empty.
pub fn parse_qualifiers(raw: &Value) -> QualifierSet {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Qualifier::from_tag)
            .collect(),
        Value::String(s) if s.trim().is_empty() => QualifierSet::empty(),
        Value::String(s) => match parse_sequence_literal(s) {
            Some(tags) => tags.iter().filter_map(|t| Qualifier::from_tag(t)).collect(),
            None => {
                debug!(raw = s.as_str(), "Unparseable qualifier literal, treating as empty");
                QualifierSet::empty()
            }
        },
        _ => QualifierSet::empty(),
    }
}

fn matches_token(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(text))
}

static ASSIST_RE: OnceLock<Option<Regex>> = OnceLock::new();
static MISS_RE: OnceLock<Option<Regex>> = OnceLock::new();
static THREE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static TECHNICAL_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Description credits an assist (`(Smith 3 AST)`).
pub fn mentions_assist(description: &str) -> bool {
    matches_token(&ASSIST_RE, r"\bAST\b", description)
}

/// Description marks a miss (`MISS Smith Free Throw 1 of 2`).
pub fn mentions_miss(description: &str) -> bool {
    matches_token(&MISS_RE, r"\bMISS\b", description)
}

/// Description marks a three-point attempt.
pub fn mentions_three(description: &str) -> bool {
    matches_token(&THREE_RE, r"\b3PT\b", description)
}

/// Description marks a technical foul (`T.FOUL`, `Technical`).
pub fn mentions_technical(description: &str) -> bool {
    matches_token(&TECHNICAL_RE, r"(?i)\bT\.FOUL\b|\btechnical\b", description)
}
