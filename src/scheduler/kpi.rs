//! Season quality metrics (KPIs).
//!
//! Computes balance indicators from a finished schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Strength of schedule | Sum of opponents' ratings, once per meeting |
//! | Mean SOS | League average of the above |
//! | Max deviation | Largest \|SOS − mean\|; equals the model objective |
//! | Home / Away / Byes | Per-team counts |
//! | Primetime games | Games in primetime slots |

use crate::models::SeasonSchedule;
use crate::topology::LeagueTopology;

/// Per-team indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamKpi {
    pub team: String,
    /// Sum of opponent ratings over all games.
    pub strength_of_schedule: f64,
    /// `strength_of_schedule - mean`.
    pub deviation: f64,
    pub home_games: usize,
    pub away_games: usize,
    pub byes: usize,
    pub primetime_games: usize,
}

/// Season performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonKpi {
    /// Rows in schedule order.
    pub teams: Vec<TeamKpi>,
    /// League mean strength of schedule.
    pub mean_strength: f64,
    /// Largest absolute deviation from the mean.
    pub max_deviation: f64,
    /// Largest home-minus-away difference of any team.
    pub max_home_away_gap: usize,
}

impl SeasonKpi {
    /// Computes KPIs from a schedule.
    ///
    /// Opponents or slots the topology does not know contribute nothing.
    pub fn calculate(schedule: &SeasonSchedule, topology: &LeagueTopology) -> Self {
        let mut teams: Vec<TeamKpi> = schedule
            .teams
            .iter()
            .map(|row| {
                let mut strength = 0.0;
                let mut primetime = 0;
                for game in row.weeks.iter().filter_map(|c| c.as_game()) {
                    if let Some(opp) = topology.team_id(&game.opponent) {
                        strength += topology.team(opp).rating;
                    }
                    if topology
                        .slots()
                        .iter()
                        .any(|s| s.name == game.slot && s.primetime)
                    {
                        primetime += 1;
                    }
                }
                TeamKpi {
                    team: row.team.clone(),
                    strength_of_schedule: strength,
                    deviation: 0.0,
                    home_games: row.home_games(),
                    away_games: row.away_games(),
                    byes: row.bye_weeks().len(),
                    primetime_games: primetime,
                }
            })
            .collect();

        let mean_strength = if teams.is_empty() {
            0.0
        } else {
            teams.iter().map(|t| t.strength_of_schedule).sum::<f64>() / teams.len() as f64
        };

        let mut max_deviation: f64 = 0.0;
        for team in &mut teams {
            team.deviation = team.strength_of_schedule - mean_strength;
            max_deviation = max_deviation.max(team.deviation.abs());
        }

        let max_home_away_gap = teams
            .iter()
            .map(|t| t.home_games.abs_diff(t.away_games))
            .max()
            .unwrap_or(0);

        Self {
            teams,
            mean_strength,
            max_deviation,
            max_home_away_gap,
        }
    }

    /// Indicators of one team.
    pub fn team(&self, name: &str) -> Option<&TeamKpi> {
        self.teams.iter().find(|t| t.team == name)
    }

    /// Whether the schedule is balanced within `max_deviation` rating points.
    pub fn meets_threshold(&self, max_deviation: f64) -> bool {
        self.max_deviation <= max_deviation
    }

    /// Number of games the schedule lists from the home side.
    pub fn total_games(&self) -> usize {
        self.teams.iter().map(|t| t.home_games).sum()
    }
}
