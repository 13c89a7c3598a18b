//! Season schedule (solution) model.
//!
//! A season schedule is a team × week table. Every cell is either a bye
//! or a game placed in a slot, at home or away, against one opponent.
//! Audits report rule breaches as [`Violation`]s.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker rendered for bye weeks.
pub const BYE_MARKER: &str = "BYE";

/// Home or away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    /// Separator used when rendering a game cell.
    pub fn indicator(&self) -> &'static str {
        match self {
            Venue::Home => "vs",
            Venue::Away => "@",
        }
    }

    /// The other side's venue for the same game.
    pub fn flipped(&self) -> Venue {
        match self {
            Venue::Home => Venue::Away,
            Venue::Away => Venue::Home,
        }
    }
}

/// A scheduled game seen from one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Slot name.
    pub slot: String,
    /// Where this team plays.
    pub venue: Venue,
    /// Opponent team name.
    pub opponent: String,
}

/// One team's entry for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleCell {
    Bye,
    Game(Game),
}

impl ScheduleCell {
    /// Creates a game cell.
    pub fn game(slot: impl Into<String>, venue: Venue, opponent: impl Into<String>) -> Self {
        Self::Game(Game {
            slot: slot.into(),
            venue,
            opponent: opponent.into(),
        })
    }

    #[inline]
    pub fn is_bye(&self) -> bool {
        matches!(self, Self::Bye)
    }

    /// The game, if this cell is not a bye.
    pub fn as_game(&self) -> Option<&Game> {
        match self {
            Self::Game(game) => Some(game),
            Self::Bye => None,
        }
    }
}

impl fmt::Display for ScheduleCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bye => f.write_str(BYE_MARKER),
            Self::Game(game) => write!(f, "{} {} {}", game.slot, game.venue.indicator(), game.opponent),
        }
    }
}

/// One row of the schedule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSchedule {
    /// Team name.
    pub team: String,
    /// Cells for weeks 1..=num_weeks (index 0 = week 1).
    pub weeks: Vec<ScheduleCell>,
}

impl TeamSchedule {
    /// Cell for a 1-based week.
    pub fn week(&self, week: u32) -> Option<&ScheduleCell> {
        (week as usize).checked_sub(1).and_then(|i| self.weeks.get(i))
    }

    /// Number of home games.
    pub fn home_games(&self) -> usize {
        self.count_venue(Venue::Home)
    }

    /// Number of away games.
    pub fn away_games(&self) -> usize {
        self.count_venue(Venue::Away)
    }

    /// 1-based weeks this team is on bye.
    pub fn bye_weeks(&self) -> Vec<u32> {
        self.weeks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_bye())
            .map(|(i, _)| i as u32 + 1)
            .collect()
    }

    fn count_venue(&self, venue: Venue) -> usize {
        self.weeks
            .iter()
            .filter_map(ScheduleCell::as_game)
            .filter(|g| g.venue == venue)
            .count()
    }
}

/// A complete season schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSchedule {
    /// Number of weeks.
    pub num_weeks: u32,
    /// Rows in team input order.
    pub teams: Vec<TeamSchedule>,
}

impl SeasonSchedule {
    /// Creates an empty schedule for `num_weeks` weeks.
    pub fn new(num_weeks: u32) -> Self {
        Self {
            num_weeks,
            teams: Vec::new(),
        }
    }

    /// Appends a team row.
    pub fn add_team(&mut self, row: TeamSchedule) {
        self.teams.push(row);
    }

    /// Finds a team's row.
    pub fn team(&self, name: &str) -> Option<&TeamSchedule> {
        self.teams.iter().find(|t| t.team == name)
    }

    /// Cell for a team and 1-based week.
    pub fn cell(&self, team: &str, week: u32) -> Option<&ScheduleCell> {
        self.team(team).and_then(|t| t.week(week))
    }

    /// Number of teams.
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Renders the table: a header row (`Team`, `1`..`W`) and one row per team.
    pub fn to_table(&self) -> Vec<Vec<String>> {
        let mut table = Vec::with_capacity(self.teams.len() + 1);
        let mut header = vec!["Team".to_string()];
        header.extend((1..=self.num_weeks).map(|w| w.to_string()));
        table.push(header);

        for row in &self.teams {
            let mut line = Vec::with_capacity(row.weeks.len() + 1);
            line.push(row.team.clone());
            line.extend(row.weeks.iter().map(ToString::to_string));
            table.push(line);
        }
        table
    }
}

/// A rule breach found in a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related team (or slot) name.
    pub entity_id: String,
    /// Week involved, if the breach is week-specific.
    pub week: Option<u32>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// Row length differs from the number of weeks.
    WeekCount,
    /// Wrong number of byes.
    ByeCount,
    /// Bye outside the allowed window.
    ByeOutsideWindow,
    /// Teams on bye in a week outside [floor(k), ceil(k)].
    ByeDistribution,
    /// Opponent met a different number of times than its tier requires.
    MeetingCount,
    /// Home/away split of a tier does not match.
    HomeAwayBalance,
    /// Same pair met in consecutive weeks.
    ImmediateRematch,
    /// Capped slot holds the wrong number of games.
    SlotCapacity,
    /// Too many primetime games.
    PrimetimeCap,
    /// Opening game misplaced.
    OpeningGame,
    /// The two sides of a game disagree (slot, venue, or opponent).
    AsymmetricGame,
    /// Cell names an unknown team or slot.
    UnknownEntity,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        week: Option<u32>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            week,
            message: message.into(),
        }
    }
}
