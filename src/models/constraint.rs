//! Scheduling rule catalog.
//!
//! Every linear row the model emits belongs to exactly one rule group.
//! Groups are generated independently and can be left out of a build
//! to diagnose infeasibility.
//!
//! # Tiers
//! A team's 31 possible opponents fall into five tiers; the tier decides
//! how often and where the two teams meet:
//!
//! | Tier | Opponents | Games | Home/Away |
//! |------|-----------|-------|-----------|
//! | Division | 3 | 6 | each opponent home and away |
//! | Conference rotation | 4 | 4 | 2 / 2 |
//! | Interconference rotation | 4 | 4 | 2 / 2 |
//! | Conference remainder | 8 | 2 | 1 / 1 |
//! | Interconference extra | 12 | 1 | free |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A group of linear constraints sharing one scheduling rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScheduleRule {
    /// A team never plays itself.
    NoSelfPlay,
    /// Each division opponent is hosted once and visited once.
    Divisional,
    /// Rotating same-conference division: one meeting each, half at home.
    ConferenceRotation,
    /// Rotating other-conference division: one meeting each, half at home.
    InterconferenceRotation,
    /// Remaining same-conference divisions: one meeting per division, one home, one away.
    ConferenceRemainder,
    /// Exactly one game against the remaining other-conference teams.
    InterconferenceExtra,
    /// No meetings between the same pair in consecutive weeks.
    NoImmediateRematch,
    /// Per-team cap on primetime games.
    PrimetimeCap,
    /// Per-week game count of capped slots.
    SlotCapacity,
    /// Designated host opens the season in the first slot.
    OpeningGame,
    /// Bye count per team, and byes only inside the bye window.
    ByeCount,
    /// Even spread of byes across the bye window.
    ByeDistribution,
    /// Every week a team has exactly one of: a home game, an away game, a bye.
    Occupancy,
    /// Strength-of-schedule definitions and deviation bounds.
    Balance,
}

impl ScheduleRule {
    /// All rule groups, in generation order.
    pub const ALL: [ScheduleRule; 14] = [
        ScheduleRule::NoSelfPlay,
        ScheduleRule::Divisional,
        ScheduleRule::ConferenceRotation,
        ScheduleRule::InterconferenceRotation,
        ScheduleRule::ConferenceRemainder,
        ScheduleRule::InterconferenceExtra,
        ScheduleRule::NoImmediateRematch,
        ScheduleRule::PrimetimeCap,
        ScheduleRule::SlotCapacity,
        ScheduleRule::OpeningGame,
        ScheduleRule::ByeCount,
        ScheduleRule::ByeDistribution,
        ScheduleRule::Occupancy,
        ScheduleRule::Balance,
    ];

    /// Short identifier used in constraint names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoSelfPlay => "no_self_play",
            Self::Divisional => "divisional",
            Self::ConferenceRotation => "conference_rotation",
            Self::InterconferenceRotation => "interconference_rotation",
            Self::ConferenceRemainder => "conference_remainder",
            Self::InterconferenceExtra => "interconference_extra",
            Self::NoImmediateRematch => "no_immediate_rematch",
            Self::PrimetimeCap => "primetime_cap",
            Self::SlotCapacity => "slot_capacity",
            Self::OpeningGame => "opening_game",
            Self::ByeCount => "bye_count",
            Self::ByeDistribution => "bye_distribution",
            Self::Occupancy => "occupancy",
            Self::Balance => "balance",
        }
    }

    /// Whether the group is structural and must never be dropped.
    ///
    /// The balance rows define the objective's auxiliary variables.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Balance)
    }
}

impl fmt::Display for ScheduleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
