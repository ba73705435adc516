// Positions, roster slots and individual pick records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions and the two meta-slots (FLEX, BENCH) used for roster
/// slot assignment.
///
/// Variant order is the display order of the roster sidebar and is the key
/// order of every `BTreeMap<Position, _>` in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "FLEX")]
    Flex,
    #[serde(rename = "DST")]
    Defense,
    #[serde(rename = "K")]
    Kicker,
    #[serde(rename = "BENCH")]
    Bench,
}

/// The closed set of positions a player can actually hold.
pub const DRAFTABLE_POSITIONS: [Position; 6] = [
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
    Position::Kicker,
    Position::Defense,
];

impl Position {
    /// Parse a position or slot string into a Position.
    ///
    /// Accepts the usual platform spellings:
    /// - "DEF", "D/ST" -> Defense
    /// - "PK" -> Kicker
    /// - "W/R/T" -> Flex
    /// - "BE", "BN" -> Bench
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" | "PK" => Some(Position::Kicker),
            "DST" | "DEF" | "D/ST" => Some(Position::Defense),
            "FLEX" | "W/R/T" => Some(Position::Flex),
            "BENCH" | "BE" | "BN" => Some(Position::Bench),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Flex => "FLEX",
            Position::Defense => "DST",
            Position::Kicker => "K",
            Position::Bench => "BENCH",
        }
    }

    /// Whether a player at this position may fill the FLEX slot.
    pub fn is_flex_eligible(&self) -> bool {
        matches!(
            self,
            Position::RunningBack | Position::WideReceiver | Position::TightEnd
        )
    }

    /// Whether this is a meta-slot (not a concrete playing position).
    pub fn is_meta_slot(&self) -> bool {
        matches!(self, Position::Flex | Position::Bench)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Who ended up with a taken player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    /// Drafted by the local drafter.
    Mine,
    /// Drafted by anyone else.
    Gone,
}

/// A single taken-player record, in draft order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub player_name: String,
    pub ownership: Ownership,
    /// Catalog position the player was taken at. `None` only for picks
    /// restored from snapshots that predate the `positions` map.
    pub position: Option<Position>,
}

impl Pick {
    pub fn is_mine(&self) -> bool {
        self.ownership == Ownership::Mine
    }
}
