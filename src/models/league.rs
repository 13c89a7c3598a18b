//! Raw league configuration.
//!
//! Describes the league as declared by its operator: conferences holding
//! divisions holding rated teams, geographic regions grouping divisions,
//! the region pairs that drive the rotating cross-division games, the
//! weekly slot list, and the season rules. Nothing here is derived;
//! [`LeagueTopology`](crate::topology::LeagueTopology) does the deriving.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::TimeSlot;
use crate::error::Result;

/// A team and its rating (used only by the balance objective).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Unique team name.
    pub name: String,
    /// Strength rating (e.g., Elo).
    pub rating: f64,
}

impl TeamConfig {
    pub fn new(name: impl Into<String>, rating: f64) -> Self {
        Self {
            name: name.into(),
            rating,
        }
    }
}

/// A division and its teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionConfig {
    /// Unique division name.
    pub name: String,
    /// Member teams.
    pub teams: Vec<TeamConfig>,
}

impl DivisionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            teams: Vec::new(),
        }
    }

    /// Adds a rated team.
    pub fn with_team(mut self, name: impl Into<String>, rating: f64) -> Self {
        self.teams.push(TeamConfig::new(name, rating));
        self
    }
}

/// A conference and its divisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceConfig {
    /// Unique conference name.
    pub name: String,
    /// Member divisions.
    pub divisions: Vec<DivisionConfig>,
}

impl ConferenceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            divisions: Vec::new(),
        }
    }

    /// Adds a division.
    pub fn with_division(mut self, division: DivisionConfig) -> Self {
        self.divisions.push(division);
        self
    }
}

/// A geographic region: a label over divisions, usually one per conference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Unique region name.
    pub name: String,
    /// Names of the divisions in this region.
    pub divisions: Vec<String>,
}

impl RegionConfig {
    pub fn new(name: impl Into<String>, divisions: &[&str]) -> Self {
        Self {
            name: name.into(),
            divisions: divisions.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Season-level rules handed to the model builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRules {
    /// Number of weeks, byes included.
    pub num_weeks: u32,
    /// Bye weeks per team.
    pub byes_per_team: u32,
    /// Earliest week a bye may fall in (1-based, inclusive).
    pub min_bye: u32,
    /// Latest week a bye may fall in (inclusive).
    pub max_bye: u32,
    /// Maximum games per team in primetime slots.
    pub max_primetime_slots: u32,
    /// Team hosting the opening game (week 1, first slot). `None` = no opening rule.
    pub opening_host: Option<String>,
}

impl SeasonRules {
    /// Inclusive range of weeks eligible for byes.
    pub fn bye_weeks(&self) -> std::ops::RangeInclusive<u32> {
        self.min_bye..=self.max_bye
    }

    /// Number of weeks eligible for byes.
    pub fn bye_window_len(&self) -> u32 {
        (self.max_bye + 1).saturating_sub(self.min_bye)
    }

    /// Games each team plays.
    pub fn games_per_team(&self) -> u32 {
        self.num_weeks.saturating_sub(self.byes_per_team)
    }

    /// Floor and ceiling of the per-week bye count over the bye window.
    ///
    /// `k = teams * byes_per_team / window`; returns `(floor(k), ceil(k))`,
    /// or `None` when the window is empty.
    pub fn bye_distribution_bounds(&self, team_count: usize) -> Option<(u32, u32)> {
        let window = self.bye_window_len();
        if window == 0 {
            return None;
        }
        let total = team_count as u32 * self.byes_per_team;
        Some((total / window, total.div_ceil(window)))
    }
}

/// Complete league description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Conferences (team order follows declaration order).
    pub conferences: Vec<ConferenceConfig>,
    /// Geographic regions. Empty = no rotation tiers.
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
    /// Symmetric region pairing; each region appears in exactly one pair.
    #[serde(default)]
    pub region_pairs: Vec<(String, String)>,
    /// Ordered weekly slots; the first is chronologically first.
    pub time_slots: Vec<TimeSlot>,
    /// Season rules.
    pub rules: SeasonRules,
}

impl LeagueConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes this configuration as pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of teams declared.
    pub fn team_count(&self) -> usize {
        self.conferences
            .iter()
            .flat_map(|c| &c.divisions)
            .map(|d| d.teams.len())
            .sum()
    }

    /// Iterates every declared team in declaration order.
    pub fn teams(&self) -> impl Iterator<Item = &TeamConfig> {
        self.conferences
            .iter()
            .flat_map(|c| &c.divisions)
            .flat_map(|d| &d.teams)
    }

    /// The standard 32-team league: two conferences of four divisions,
    /// North/South and East/West region pairs, 18 weeks with one bye.
    pub fn standard() -> Self {
        let nfc = ConferenceConfig::new("NFC")
            .with_division(
                DivisionConfig::new("NFC North")
                    .with_team("Packers", 1594.0)
                    .with_team("Lions", 1592.0)
                    .with_team("Vikings", 1531.0)
                    .with_team("Bears", 1480.0),
            )
            .with_division(
                DivisionConfig::new("NFC East")
                    .with_team("Giants", 1374.0)
                    .with_team("Cowboys", 1486.0)
                    .with_team("Eagles", 1629.0)
                    .with_team("Commanders", 1563.0),
            )
            .with_division(
                DivisionConfig::new("NFC South")
                    .with_team("Panthers", 1353.0)
                    .with_team("Saints", 1346.0)
                    .with_team("Falcons", 1480.0)
                    .with_team("Buccaneers", 1525.0),
            )
            .with_division(
                DivisionConfig::new("NFC West")
                    .with_team("Seahawks", 1489.0)
                    .with_team("49ers", 1480.0)
                    .with_team("Rams", 1539.0)
                    .with_team("Cardinals", 1524.0),
            );

        let afc = ConferenceConfig::new("AFC")
            .with_division(
                DivisionConfig::new("AFC North")
                    .with_team("Bengals", 1536.0)
                    .with_team("Browns", 1346.0)
                    .with_team("Ravens", 1678.0)
                    .with_team("Steelers", 1515.0),
            )
            .with_division(
                DivisionConfig::new("AFC East")
                    .with_team("Patriots", 1416.0)
                    .with_team("Bills", 1632.0)
                    .with_team("Dolphins", 1454.0)
                    .with_team("Jets", 1439.0),
            )
            .with_division(
                DivisionConfig::new("AFC South")
                    .with_team("Texans", 1496.0)
                    .with_team("Titans", 1375.0)
                    .with_team("Jaguars", 1466.0)
                    .with_team("Colts", 1479.0),
            )
            .with_division(
                DivisionConfig::new("AFC West")
                    .with_team("Chiefs", 1587.0)
                    .with_team("Chargers", 1545.0)
                    .with_team("Broncos", 1537.0)
                    .with_team("Raiders", 1460.0),
            );

        Self {
            conferences: vec![nfc, afc],
            regions: vec![
                RegionConfig::new("North", &["NFC North", "AFC North"]),
                RegionConfig::new("South", &["NFC South", "AFC South"]),
                RegionConfig::new("East", &["NFC East", "AFC East"]),
                RegionConfig::new("West", &["NFC West", "AFC West"]),
            ],
            region_pairs: vec![
                ("North".into(), "South".into()),
                ("East".into(), "West".into()),
            ],
            time_slots: vec![
                TimeSlot::new("Thursday Night").exactly(1).primetime(),
                TimeSlot::new("Sunday Morning"),
                TimeSlot::new("Sunday Afternoon").exactly(4),
                TimeSlot::new("Sunday Night").exactly(1).primetime(),
                TimeSlot::new("Monday Night").exactly(1).primetime(),
            ],
            rules: SeasonRules {
                num_weeks: 18,
                byes_per_team: 1,
                min_bye: 5,
                // An even per-week bye count with 32 teams needs an 8-week window.
                max_bye: 12,
                max_primetime_slots: 6,
                opening_host: Some("Eagles".into()),
            },
        }
    }
}
