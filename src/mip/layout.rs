//! Dense variable layout.
//!
//! Variables are declared in one contiguous block per family, so every
//! lookup is index arithmetic:
//!
//! | Family | Count | Name |
//! |--------|-------|------|
//! | game `x[h][a][w][s]` | T·T·W·S | `x[Home,Away,w3,Sunday]` |
//! | bye `b[t][w]` | T·W | `b[Team,w3]` |
//! | strength of schedule | T | `sos[Team]` |
//! | league mean | 1 | `sos_mean` |
//! | max deviation | 1 | `max_deviation` |

use crate::lp::{LinearProgram, VarId, VarKind};
use crate::topology::{LeagueTopology, SlotId, TeamId};

/// Maps (team, week, slot) keys to variable ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLayout {
    teams: usize,
    weeks: usize,
    slots: usize,
    bye_base: usize,
    sos_base: usize,
    sos_mean: VarId,
    max_deviation: VarId,
}

impl VariableLayout {
    /// Declares every variable in `program` and returns the layout.
    ///
    /// `program` must be empty; ids are assigned from zero.
    pub fn declare(topology: &LeagueTopology, num_weeks: u32, program: &mut LinearProgram) -> Self {
        let teams = topology.team_count();
        let weeks = num_weeks as usize;
        let slots = topology.slot_count();

        for home in topology.teams() {
            for away in topology.teams() {
                for week in 1..=num_weeks {
                    for slot in topology.slots() {
                        program.add_variable(
                            format!("x[{},{},w{},{}]", home.name, away.name, week, slot.name),
                            VarKind::Binary,
                        );
                    }
                }
            }
        }

        let bye_base = program.variable_count();
        for team in topology.teams() {
            for week in 1..=num_weeks {
                program.add_variable(format!("b[{},w{}]", team.name, week), VarKind::Binary);
            }
        }

        let sos_base = program.variable_count();
        for team in topology.teams() {
            program.add_variable(format!("sos[{}]", team.name), VarKind::FREE);
        }
        let sos_mean = program.add_variable("sos_mean", VarKind::FREE);
        let max_deviation = program.add_variable("max_deviation", VarKind::NON_NEGATIVE);

        Self {
            teams,
            weeks,
            slots,
            bye_base,
            sos_base,
            sos_mean,
            max_deviation,
        }
    }

    /// `x[home][away][week][slot]`; `week` is 1-based.
    #[inline]
    pub fn game(&self, home: TeamId, away: TeamId, week: u32, slot: SlotId) -> VarId {
        let w = week as usize - 1;
        VarId(((home.index() * self.teams + away.index()) * self.weeks + w) * self.slots + slot.index())
    }

    /// `b[team][week]`; `week` is 1-based.
    #[inline]
    pub fn bye(&self, team: TeamId, week: u32) -> VarId {
        VarId(self.bye_base + team.index() * self.weeks + week as usize - 1)
    }

    #[inline]
    pub fn sos(&self, team: TeamId) -> VarId {
        VarId(self.sos_base + team.index())
    }

    pub fn sos_mean(&self) -> VarId {
        self.sos_mean
    }

    pub fn max_deviation(&self) -> VarId {
        self.max_deviation
    }

    /// Number of weeks covered.
    pub fn num_weeks(&self) -> u32 {
        self.weeks as u32
    }

    /// Every slot of `home` hosting `away` in `week`.
    pub fn hosting(&self, home: TeamId, away: TeamId, week: u32) -> impl Iterator<Item = VarId> + '_ {
        (0..self.slots).map(move |s| self.game(home, away, week, SlotId(s)))
    }

    /// Every slot of either team hosting the other in `week`.
    pub fn meetings_in_week(&self, a: TeamId, b: TeamId, week: u32) -> impl Iterator<Item = VarId> + '_ {
        self.hosting(a, b, week).chain(self.hosting(b, a, week))
    }

    /// All weeks and slots of `home` hosting `away`.
    pub fn hosting_all_season(&self, home: TeamId, away: TeamId) -> impl Iterator<Item = VarId> + '_ {
        (1..=self.weeks as u32).flat_map(move |w| self.hosting(home, away, w))
    }

    /// All meetings between two teams over the season, either venue.
    pub fn meetings_all_season(&self, a: TeamId, b: TeamId) -> impl Iterator<Item = VarId> + '_ {
        self.hosting_all_season(a, b).chain(self.hosting_all_season(b, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn test_layout_matches_declared_names() {
        let topology = LeagueTopology::build(&fixtures::single_division()).unwrap();
        let mut program = LinearProgram::new();
        let layout = VariableLayout::declare(&topology, 7, &mut program);

        // 4·4·7·2 games + 4·7 byes + 4 sos + mean + max deviation
        assert_eq!(program.variable_count(), 224 + 28 + 4 + 2);
        assert_eq!(program.binary_count(), 252);

        let packers = topology.team_id("Packers").unwrap();
        let lions = topology.team_id("Lions").unwrap();
        let sunday = SlotId(1);
        assert_eq!(
            program.variable(layout.game(packers, lions, 3, sunday)).name,
            "x[Packers,Lions,w3,Sunday]"
        );
        assert_eq!(program.variable(layout.bye(lions, 7)).name, "b[Lions,w7]");
        assert_eq!(program.variable(layout.sos(lions)).name, "sos[Lions]");
        assert_eq!(program.variable(layout.sos_mean()).name, "sos_mean");
        assert_eq!(program.variable(layout.max_deviation()).name, "max_deviation");
    }

    #[test]
    fn test_meeting_iterators() {
        let topology = LeagueTopology::build(&fixtures::single_division()).unwrap();
        let mut program = LinearProgram::new();
        let layout = VariableLayout::declare(&topology, 7, &mut program);
        let a = TeamId(0);
        let b = TeamId(1);

        assert_eq!(layout.hosting(a, b, 1).count(), 2);
        assert_eq!(layout.meetings_in_week(a, b, 1).count(), 4);
        assert_eq!(layout.meetings_all_season(a, b).count(), 28);
        assert!(layout
            .meetings_in_week(a, b, 2)
            .all(|v| program.variable(v).name.contains(",w2,")));
    }
}
