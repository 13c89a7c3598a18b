//! Broadcast time slots.
//!
//! A season week is divided into an ordered list of slots. The first slot
//! in the list is the chronologically-first one and hosts the opening game.

use serde::{Deserialize, Serialize};

/// How many games a slot holds per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlotCapacity {
    /// No limit; absorbs whatever the capped slots leave over.
    #[default]
    Unbounded,
    /// Exactly `n` games every week.
    Exactly(u32),
    /// At most `n` games every week.
    AtMost(u32),
}

impl SlotCapacity {
    /// The finite cap, if any.
    pub fn limit(&self) -> Option<u32> {
        match self {
            Self::Unbounded => None,
            Self::Exactly(n) | Self::AtMost(n) => Some(*n),
        }
    }

    /// Whether a weekly game count satisfies this capacity.
    pub fn admits(&self, games: u32) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Exactly(n) => games == *n,
            Self::AtMost(n) => games <= *n,
        }
    }
}

/// A weekly broadcast slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Display name (e.g., "Sunday Night").
    pub name: String,
    /// Weekly game capacity.
    #[serde(default)]
    pub capacity: SlotCapacity,
    /// Counts toward the per-team primetime cap.
    #[serde(default)]
    pub primetime: bool,
}

impl TimeSlot {
    /// Creates an unbounded, non-primetime slot.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: SlotCapacity::Unbounded,
            primetime: false,
        }
    }

    /// Requires exactly `games` games per week.
    pub fn exactly(mut self, games: u32) -> Self {
        self.capacity = SlotCapacity::Exactly(games);
        self
    }

    /// Allows at most `games` games per week.
    pub fn at_most(mut self, games: u32) -> Self {
        self.capacity = SlotCapacity::AtMost(games);
        self
    }

    /// Flags the slot as primetime.
    pub fn primetime(mut self) -> Self {
        self.primetime = true;
        self
    }
}
