//! Solution decoding.
//!
//! Reads binary game and bye values back into a [`SeasonSchedule`]:
//! one row per team (input order), one cell per week. A cell must come
//! from exactly one set variable; anything else means the model let an
//! inconsistent assignment through and is reported as
//! [`ScheduleError::Consistency`].

use crate::error::{Result, ScheduleError};
use crate::lp::VariableValues;
use crate::mip::{ScheduleConstraintModel, VariableLayout};
use crate::models::{ScheduleCell, SeasonSchedule, TeamSchedule, Venue};
use crate::topology::{LeagueTopology, TeamId};

/// Decodes solved values into a schedule table.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleExtractor<'a> {
    topology: &'a LeagueTopology,
    layout: &'a VariableLayout,
    num_weeks: u32,
}

impl<'a> ScheduleExtractor<'a> {
    pub fn new(topology: &'a LeagueTopology, layout: &'a VariableLayout) -> Self {
        Self {
            topology,
            layout,
            num_weeks: layout.num_weeks(),
        }
    }

    /// An extractor for the variables of `model`.
    pub fn for_model(model: &'a ScheduleConstraintModel<'_>) -> Self {
        Self::new(model.topology(), model.layout())
    }

    /// Builds the schedule table.
    ///
    /// Pure: the same values always give the same table.
    ///
    /// # Errors
    /// `Consistency` if a team has no entry, or several, in some week.
    pub fn extract(&self, values: &VariableValues) -> Result<SeasonSchedule> {
        let mut schedule = SeasonSchedule::new(self.num_weeks);
        for team in self.topology.team_ids() {
            let weeks = (1..=self.num_weeks)
                .map(|week| self.cell(values, team, week))
                .collect::<Result<Vec<_>>>()?;
            schedule.add_team(TeamSchedule {
                team: self.topology.team(team).name.clone(),
                weeks,
            });
        }
        Ok(schedule)
    }

    fn cell(&self, values: &VariableValues, team: TeamId, week: u32) -> Result<ScheduleCell> {
        let mut entries = Vec::new();
        if values.is_set(self.layout.bye(team, week)) {
            entries.push(ScheduleCell::Bye);
        }
        for other in self.topology.team_ids() {
            for slot in self.topology.slot_ids() {
                let slot_name = &self.topology.slot(slot).name;
                let opponent = &self.topology.team(other).name;
                if values.is_set(self.layout.game(team, other, week, slot)) {
                    entries.push(ScheduleCell::game(slot_name.clone(), Venue::Home, opponent.clone()));
                }
                if other != team && values.is_set(self.layout.game(other, team, week, slot)) {
                    entries.push(ScheduleCell::game(slot_name.clone(), Venue::Away, opponent.clone()));
                }
            }
        }

        if entries.len() != 1 {
            return Err(ScheduleError::Consistency {
                team: self.topology.team(team).name.clone(),
                week,
                found: entries.len(),
            });
        }
        Ok(entries.remove(0))
    }
}
