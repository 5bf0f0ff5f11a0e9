//! Shared primitive IDs and report-related enums.

use serde::{Deserialize, Deserializer, Serialize};

/// Monotonic report identifier.
pub type ReportId = u64;
/// Monotonic ledger mutation counter.
pub type Revision = u64;
/// Place identifier as used by the place catalogue.
pub type PlaceId = String;

/// Crowd-level classification attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusynessLevel {
    /// No waiting, plenty of space.
    Quiet,
    /// Some waiting, filling up.
    Moderate,
    /// Long wait, crowded.
    Busy,
    /// No information.
    #[default]
    Unknown,
}

impl BusynessLevel {
    /// Levels a user can pick when submitting a report.
    pub const SELECTABLE: [BusynessLevel; 3] = [Self::Quiet, Self::Moderate, Self::Busy];

    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Quiet => "Quiet",
            Self::Moderate => "Moderate",
            Self::Busy => "Busy",
            Self::Unknown => "Unknown",
        }
    }

    /// One-line description shown next to the label.
    pub fn description(self) -> &'static str {
        match self {
            Self::Quiet => "No waiting, plenty of space",
            Self::Moderate => "Some waiting, filling up",
            Self::Busy => "Long wait, crowded",
            Self::Unknown => "No recent reports",
        }
    }
}

/// Direction of a vote action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    /// Upvote.
    Up,
    /// Downvote.
    Down,
}

/// The current viewer's vote on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    /// No vote registered.
    #[default]
    None,
    /// Viewer upvoted.
    Up,
    /// Viewer downvoted.
    Down,
}

impl VoteState {
    /// Returns the state after pressing `direction`.
    ///
    /// Pressing the active direction clears the vote; anything else selects it.
    pub fn toggled(self, direction: VoteDirection) -> Self {
        match (self, direction) {
            (Self::Up, VoteDirection::Up) | (Self::Down, VoteDirection::Down) => Self::None,
            (_, VoteDirection::Up) => Self::Up,
            (_, VoteDirection::Down) => Self::Down,
        }
    }

    /// Lenient decoder: anything other than `"up"`/`"down"` becomes [`VoteState::None`].
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw.as_ref().and_then(|v| v.as_str()) {
            Some("up") => Self::Up,
            Some("down") => Self::Down,
            _ => Self::None,
        })
    }
}

/// Place category bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Restaurant.
    Restaurant,
    /// Cafe or coffee shop.
    Cafe,
    /// Bar.
    Bar,
    /// Grocery store.
    Grocery,
    /// Retail shop.
    Retail,
    /// Gym.
    Gym,
    /// Park.
    Park,
    /// Library.
    Library,
    /// Anything else.
    Other,
}

/// Selectable wait-time presets in minutes; the last one means "1 hour+".
pub const WAIT_TIME_PRESETS: [u32; 7] = [0, 5, 10, 15, 30, 45, 60];
