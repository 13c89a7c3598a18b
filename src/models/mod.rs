//! League scheduling domain models.
//!
//! Provides the raw league description (conferences, divisions, regions,
//! slots, season rules), the rule catalog the model is organized by, and
//! the team × week schedule the solver's answer is decoded into.
//!
//! # Domain Mappings
//!
//! | u-league | Meaning |
//! |----------|---------|
//! | LeagueConfig | Declared league structure and season rules |
//! | TimeSlot | Weekly broadcast window with a game capacity |
//! | ScheduleRule | One group of linear constraints |
//! | SeasonSchedule | Team × week table of games and byes |

mod constraint;
mod league;
mod schedule;
mod slot;

pub use constraint::ScheduleRule;
pub use league::{
    ConferenceConfig, DivisionConfig, LeagueConfig, RegionConfig, SeasonRules, TeamConfig,
};
pub use schedule::{
    Game, ScheduleCell, SeasonSchedule, TeamSchedule, Venue, Violation, ViolationType, BYE_MARKER,
};
pub use slot::{SlotCapacity, TimeSlot};
