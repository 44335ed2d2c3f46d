//! Canonical play-by-play event representation.
//!
//! Both raw provider schemas are normalized into [`GameEvent`] once, so the
//! lineup tracker and the stint aggregator only ever match on enums and tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-assigned player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved player: identifier plus the display name used in lineup keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
}

impl PlayerRef {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotValue {
    FreeThrow,
    Two,
    Three,
}

impl ShotValue {
    pub fn points(self) -> u32 {
        match self {
            ShotValue::FreeThrow => 1,
            ShotValue::Two => 2,
            ShotValue::Three => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotResult {
    Made,
    Missed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReboundKind {
    Offensive,
    Defensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Start,
    End,
}

/// How a substitution event changes the on-court set.
///
/// The live schema emits discrete `In`/`Out` events (the acting player is the
/// one moving); the legacy schema emits one `Swap` where the acting player
/// leaves and `incoming` enters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionKind {
    In,
    Out,
    Swap { incoming: PlayerRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Shot {
        value: ShotValue,
        result: ShotResult,
        assisted: bool,
    },
    Rebound(ReboundKind),
    Turnover,
    Foul,
    Substitution(SubstitutionKind),
    PeriodBoundary(BoundaryKind),
    Other,
}

/// Shot-context tag attached by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Fastbreak,
    FromTurnover,
    SecondChance,
    PointsInPaint,
}

impl Qualifier {
    pub const ALL: [Qualifier; 4] = [
        Qualifier::Fastbreak,
        Qualifier::FromTurnover,
        Qualifier::SecondChance,
        Qualifier::PointsInPaint,
    ];

    /// Map a provider tag (`fastbreak`, `fromturnover`, `2ndchance`,
    /// `pointsinthepaint`) to a qualifier. Unknown tags are ignored.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "fastbreak" => Some(Qualifier::Fastbreak),
            "fromturnover" => Some(Qualifier::FromTurnover),
            "2ndchance" | "secondchance" => Some(Qualifier::SecondChance),
            "pointsinthepaint" => Some(Qualifier::PointsInPaint),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Qualifier::Fastbreak => 1,
            Qualifier::FromTurnover => 1 << 1,
            Qualifier::SecondChance => 1 << 2,
            Qualifier::PointsInPaint => 1 << 3,
        }
    }
}

/// Compact set of [`Qualifier`] tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifierSet(u8);

impl QualifierSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, q: Qualifier) {
        self.0 |= q.bit();
    }

    pub fn contains(&self, q: Qualifier) -> bool {
        self.0 & q.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Qualifier> + '_ {
        Qualifier::ALL.into_iter().filter(move |q| self.contains(*q))
    }
}

impl FromIterator<Qualifier> for QualifierSet {
    fn from_iter<I: IntoIterator<Item = Qualifier>>(iter: I) -> Self {
        let mut set = QualifierSet::empty();
        for q in iter {
            set.insert(q);
        }
        set
    }
}

/// One action in a game's play-by-play log, after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Source order; authoritative for replay.
    pub sequence_index: u32,
    pub period: u8,
    /// Seconds remaining in the period.
    pub clock_remaining: f64,
    pub action: Action,
    pub player: Option<PlayerRef>,
    pub side: Option<TeamSide>,
    pub qualifiers: QualifierSet,
    pub description: String,
}

impl GameEvent {
    pub fn is_substitution(&self) -> bool {
        matches!(self.action, Action::Substitution(_))
    }

    pub fn is_period_start(&self) -> bool {
        matches!(self.action, Action::PeriodBoundary(BoundaryKind::Start))
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player.as_ref().map(|p| p.id)
    }
}
