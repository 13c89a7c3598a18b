//! Season MIP formulation.
//!
//! Translates a [`LeagueTopology`] and [`SeasonRules`] into a
//! [`LinearProgram`]: binary game and bye variables, one block of rows per
//! [`ScheduleRule`], and a min-max strength-of-schedule objective.
//!
//! # Formulation
//!
//! | Variable | Domain | Meaning |
//! |----------|--------|---------|
//! | `x[h][a][w][s]` | {0,1} | `h` hosts `a` in week `w`, slot `s` |
//! | `b[t][w]` | {0,1} | `t` is on bye in week `w` |
//! | `sos[t]` | ℝ | strength of schedule of `t` |
//! | `sos_mean` | ℝ | league mean strength of schedule |
//! | `max_deviation` | ℝ≥0 | objective |
//!
//! The builder never checks feasibility: parameters that cannot be met
//! (e.g. bye bounds no integer count satisfies) surface as an infeasible
//! solver status.
//!
//! # Reference
//! Nemhauser & Trick (1998), "Scheduling a Major College Basketball Conference"

mod layout;
mod objective;
pub mod rules;

pub use layout::VariableLayout;
pub use rules::RuleContext;

use log::{debug, info, warn};
use std::collections::BTreeSet;

use crate::error::{Result, ScheduleError};
use crate::lp::{LinearProgram, MipSolver, SolveOptions, SolveStatus, SolverOutcome, VariableValues};
use crate::models::{ScheduleRule, SeasonRules};
use crate::topology::LeagueTopology;
use crate::validation::validate_rules;

/// Configures which rule groups a model includes.
///
/// # Example
/// ```no_run
/// use u_league::mip::ModelBuilder;
/// use u_league::models::{LeagueConfig, ScheduleRule};
/// use u_league::topology::LeagueTopology;
///
/// let config = LeagueConfig::standard();
/// let topology = LeagueTopology::build(&config).unwrap();
/// let model = ModelBuilder::new(&topology, &config.rules)
///     .without_rule(ScheduleRule::PrimetimeCap)
///     .build()
///     .unwrap();
/// println!("{} rows", model.program().constraint_count());
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    topology: &'a LeagueTopology,
    rules: SeasonRules,
    disabled: BTreeSet<ScheduleRule>,
}

impl<'a> ModelBuilder<'a> {
    /// A builder emitting every rule group.
    pub fn new(topology: &'a LeagueTopology, rules: &SeasonRules) -> Self {
        Self {
            topology,
            rules: rules.clone(),
            disabled: BTreeSet::new(),
        }
    }

    /// Leaves a rule group out. Mandatory groups are kept regardless.
    pub fn without_rule(mut self, rule: ScheduleRule) -> Self {
        if rule.is_mandatory() {
            warn!("Rule group '{rule}' is mandatory and stays in the model");
        } else {
            self.disabled.insert(rule);
        }
        self
    }

    /// Declares variables and emits the enabled rule groups.
    ///
    /// # Errors
    /// `Configuration` if the rules do not fit the topology: a bad bye
    /// window, an unknown opening host, or a week count that differs from
    /// the games the opponent tiers require.
    pub fn build(self) -> Result<ScheduleConstraintModel<'a>> {
        let topology = self.topology;
        let season = self.rules;

        validate_rules(&season, topology).map_err(ScheduleError::Configuration)?;
        let opening_host = season
            .opening_host
            .as_deref()
            .and_then(|name| topology.team_id(name));

        let mut program = LinearProgram::new();
        let layout = VariableLayout::declare(topology, season.num_weeks, &mut program);

        let enabled: Vec<ScheduleRule> = ScheduleRule::ALL
            .into_iter()
            .filter(|r| !self.disabled.contains(r))
            .collect();
        {
            let ctx = RuleContext {
                topology,
                rules: &season,
                layout: &layout,
                opening_host,
            };
            for &rule in &enabled {
                let before = program.constraint_count();
                rules::generator(rule)(&ctx, &mut program);
                debug!(
                    "Rule '{}': {} constraints",
                    rule,
                    program.constraint_count() - before
                );
            }
        }

        info!(
            "Model built: {} variables ({} binary), {} constraints, {} rule groups",
            program.variable_count(),
            program.binary_count(),
            program.constraint_count(),
            enabled.len()
        );

        Ok(ScheduleConstraintModel {
            topology,
            rules: season,
            layout,
            program,
            enabled,
        })
    }
}

/// A built season model, ready for one solve.
#[derive(Debug, Clone)]
pub struct ScheduleConstraintModel<'a> {
    topology: &'a LeagueTopology,
    rules: SeasonRules,
    layout: VariableLayout,
    program: LinearProgram,
    enabled: Vec<ScheduleRule>,
}

impl<'a> ScheduleConstraintModel<'a> {
    /// Builds a model with every rule group.
    pub fn build(topology: &'a LeagueTopology, rules: &SeasonRules) -> Result<Self> {
        ModelBuilder::new(topology, rules).build()
    }

    pub fn topology(&self) -> &'a LeagueTopology {
        self.topology
    }

    pub fn rules(&self) -> &SeasonRules {
        &self.rules
    }

    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    /// Rule groups present in the program.
    pub fn enabled_rules(&self) -> &[ScheduleRule] {
        &self.enabled
    }

    /// Hands the program to `solver`. The model is consumed: one build, one solve.
    ///
    /// # Errors
    /// `Solver` when the engine reports [`SolveStatus::Error`]. Every other
    /// status, infeasible included, is returned in the [`SolvedModel`].
    pub fn solve<S: MipSolver + ?Sized>(
        self,
        solver: &S,
        options: &SolveOptions,
    ) -> Result<SolvedModel<'a>> {
        info!(
            "Solving with {} (time limit: {:?})",
            solver.name(),
            options.time_limit
        );
        let outcome = solver.solve(&self.program, options);
        info!(
            "Solver {} finished: {} (objective {:?}) in {:.2?}",
            solver.name(),
            outcome.status,
            outcome.objective,
            outcome.elapsed
        );

        if outcome.status == SolveStatus::Error {
            return Err(ScheduleError::Solver {
                solver: solver.name().to_string(),
                message: outcome
                    .message
                    .clone()
                    .unwrap_or_else(|| "unknown failure".to_string()),
            });
        }

        Ok(SolvedModel {
            model: self,
            outcome,
        })
    }
}

/// A model together with its solver outcome.
#[derive(Debug, Clone)]
pub struct SolvedModel<'a> {
    pub model: ScheduleConstraintModel<'a>,
    pub outcome: SolverOutcome,
}

impl SolvedModel<'_> {
    pub fn status(&self) -> SolveStatus {
        self.outcome.status
    }

    pub fn objective(&self) -> Option<f64> {
        self.outcome.objective
    }

    /// Variable values, when the status carries a solution.
    pub fn values(&self) -> Option<&VariableValues> {
        self.outcome.values.as_ref()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Hand-built assignment for the single-division fixture league.

    use super::*;
    use crate::topology::{SlotId, TeamId};

    /// `(home, away, week, slot)`; slot 0 = Thursday Night, 1 = Sunday.
    pub const HAND_GAMES: [(&str, &str, u32, usize); 12] = [
        ("Packers", "Lions", 1, 0),
        ("Bears", "Vikings", 1, 1),
        ("Bears", "Lions", 2, 0),
        ("Packers", "Vikings", 2, 1),
        ("Lions", "Vikings", 3, 0),
        ("Packers", "Bears", 4, 0),
        ("Vikings", "Bears", 5, 0),
        ("Lions", "Packers", 5, 1),
        ("Vikings", "Packers", 6, 0),
        ("Lions", "Bears", 6, 1),
        ("Vikings", "Lions", 7, 0),
        ("Bears", "Packers", 7, 1),
    ];

    pub const HAND_BYES: [(&str, u32); 4] =
        [("Packers", 3), ("Bears", 3), ("Lions", 4), ("Vikings", 4)];

    fn team(model: &ScheduleConstraintModel<'_>, name: &str) -> TeamId {
        model.topology().team_id(name).unwrap()
    }

    /// Values for `games` and `byes`, with the balance variables filled in.
    pub fn assignment(
        model: &ScheduleConstraintModel<'_>,
        games: &[(&str, &str, u32, usize)],
        byes: &[(&str, u32)],
    ) -> VariableValues {
        let layout = model.layout();
        let topology = model.topology();
        let mut values = VariableValues::zeros(model.program().variable_count());

        for &(home, away, week, slot) in games {
            let var = layout.game(team(model, home), team(model, away), week, SlotId(slot));
            values.set(var, 1.0);
        }
        for &(name, week) in byes {
            values.set(layout.bye(team(model, name), week), 1.0);
        }

        let mut total = 0.0;
        for t in topology.team_ids() {
            let sos: f64 = topology
                .team_ids()
                .filter(|&o| o != t)
                .map(|o| {
                    let meetings = layout
                        .meetings_all_season(t, o)
                        .filter(|&v| values.is_set(v))
                        .count();
                    meetings as f64 * topology.team(o).rating
                })
                .sum();
            values.set(layout.sos(t), sos);
            total += sos;
        }
        let mean = total / topology.team_count() as f64;
        values.set(layout.sos_mean(), mean);
        let deviation = topology
            .team_ids()
            .map(|t| (values.value(layout.sos(t)) - mean).abs())
            .fold(0.0, f64::max);
        values.set(layout.max_deviation(), deviation);
        values
    }

    /// The hand schedule as values.
    pub fn hand_assignment(model: &ScheduleConstraintModel<'_>) -> VariableValues {
        assignment(model, &HAND_GAMES, &HAND_BYES)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::lp::{GoodLpSolver, LinearConstraint, Sense, SolverOutcome};
    use crate::models::{LeagueConfig, TimeSlot};
    use crate::topology::fixtures;
    use crate::validation::ConfigurationErrorKind;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::BTreeSet;
    use std::time::Duration;

    const TOL: f64 = 1e-6;

    fn broken_rules(model: &ScheduleConstraintModel<'_>, values: &VariableValues) -> BTreeSet<ScheduleRule> {
        model
            .program()
            .violations(values, TOL)
            .into_iter()
            .map(|c| c.rule)
            .collect()
    }

    #[test]
    fn test_hand_schedule_satisfies_every_row() {
        let topology = LeagueTopology::build(&fixtures::single_division()).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &fixtures::single_division().rules).unwrap();
        let values = hand_assignment(&model);

        let broken: Vec<&str> = model
            .program()
            .violations(&values, TOL)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert!(broken.is_empty(), "broken rows: {broken:?}");
        assert!(model.program().domain_violations(&values, TOL).is_empty());

        // Packers 9000, Bears 9200, Lions 9100, Vikings 9300; mean 9150.
        assert!((model.program().objective_value(&values) - 150.0).abs() < TOL);
    }

    #[test]
    fn test_every_rule_group_emits_rows() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();
        let program = model.program();

        assert_eq!(model.enabled_rules(), &ScheduleRule::ALL);
        assert_eq!(program.constraints_for(ScheduleRule::NoSelfPlay).count(), 4);
        assert_eq!(program.constraints_for(ScheduleRule::Divisional).count(), 12);
        // No rotation tiers in a one-division league.
        assert_eq!(program.constraints_for(ScheduleRule::ConferenceRotation).count(), 0);
        assert_eq!(program.constraints_for(ScheduleRule::InterconferenceExtra).count(), 0);
        // 6 pairs × 6 adjacent week pairs, the last pair (6, 7) included.
        assert_eq!(program.constraints_for(ScheduleRule::NoImmediateRematch).count(), 36);
        assert!(program.constraint("no_immediate_rematch[Bears,Packers,w6]").is_some());
        assert_eq!(program.constraints_for(ScheduleRule::SlotCapacity).count(), 7);
        assert_eq!(program.constraints_for(ScheduleRule::OpeningGame).count(), 2);
        // 4 team rows + 5 closed weeks.
        assert_eq!(program.constraints_for(ScheduleRule::ByeCount).count(), 9);
        assert_eq!(program.constraints_for(ScheduleRule::ByeDistribution).count(), 2);
        assert_eq!(program.constraints_for(ScheduleRule::Occupancy).count(), 28);
        assert_eq!(program.constraints_for(ScheduleRule::Balance).count(), 4 + 1 + 8);
    }

    #[test]
    fn test_double_home_game_breaks_divisional() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();

        let mut games = HAND_GAMES.to_vec();
        // Packers host the week-7 game too.
        games[11] = ("Packers", "Bears", 7, 1);
        let values = assignment(&model, &games, &HAND_BYES);

        let broken = broken_rules(&model, &values);
        assert!(broken.contains(&ScheduleRule::Divisional));
        assert!(!broken.contains(&ScheduleRule::Occupancy));
    }

    #[test]
    fn test_back_to_back_meeting_breaks_rematch() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();

        // Trade the week-2 and week-5 games: Packers-Lions and Bears-Vikings
        // now meet in weeks 1 and 2.
        let mut games = HAND_GAMES.to_vec();
        games[2] = ("Vikings", "Bears", 2, 0);
        games[3] = ("Lions", "Packers", 2, 1);
        games[6] = ("Bears", "Lions", 5, 0);
        games[7] = ("Packers", "Vikings", 5, 1);
        let values = assignment(&model, &games, &HAND_BYES);

        let broken = broken_rules(&model, &values);
        assert!(broken.contains(&ScheduleRule::NoImmediateRematch));
        let rows: Vec<&LinearConstraint> = model.program().violations(&values, TOL);
        assert!(rows.iter().any(|c| c.name == "no_immediate_rematch[Lions,Packers,w1]"));
    }

    #[test]
    fn test_misplaced_opener_breaks_opening_rule() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();

        // Lions host the Thursday opener; Packers take the week-5 home game
        // instead, so venues and slots stay balanced.
        let mut games = HAND_GAMES.to_vec();
        games[0] = ("Lions", "Packers", 1, 0);
        games[7] = ("Packers", "Lions", 5, 1);
        let values = assignment(&model, &games, &HAND_BYES);

        let broken = broken_rules(&model, &values);
        assert_eq!(broken, BTreeSet::from([ScheduleRule::OpeningGame]));
    }

    /// Names of the violated rows tagged with `rule`.
    fn broken_rows(
        model: &ScheduleConstraintModel<'_>,
        values: &VariableValues,
        rule: ScheduleRule,
    ) -> BTreeSet<String> {
        model
            .program()
            .violations(values, TOL)
            .into_iter()
            .filter(|c| c.rule == rule)
            .map(|c| c.name.clone())
            .collect()
    }

    #[test]
    fn test_primetime_cap() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let mut rules = config.rules.clone();
        // Lions and Vikings play four Thursday nights in the hand schedule.
        rules.max_primetime_slots = 3;
        let model = ScheduleConstraintModel::build(&topology, &rules).unwrap();
        let values = hand_assignment(&model);

        assert_eq!(broken_rules(&model, &values), BTreeSet::from([ScheduleRule::PrimetimeCap]));
        assert_eq!(
            broken_rows(&model, &values, ScheduleRule::PrimetimeCap),
            BTreeSet::from(["primetime_cap[Lions]".to_string(), "primetime_cap[Vikings]".to_string()])
        );
    }

    #[test]
    fn test_at_most_slot_capacity() {
        let mut config = fixtures::single_division();
        config.time_slots[1] = TimeSlot::new("Sunday").at_most(1);
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();

        let capped: Vec<&LinearConstraint> = model
            .program()
            .constraints_for(ScheduleRule::SlotCapacity)
            .filter(|c| c.name.starts_with("slot_capacity[Sunday,"))
            .collect();
        assert_eq!(capped.len(), 7);
        assert!(capped.iter().all(|c| c.sense == Sense::Le && c.rhs == 1.0));
        assert!(broken_rules(&model, &hand_assignment(&model)).is_empty());

        // No Sunday games allowed: every week with a Sunday game breaks its row.
        config.time_slots[1] = TimeSlot::new("Sunday").at_most(0);
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();
        let values = hand_assignment(&model);

        assert_eq!(broken_rules(&model, &values), BTreeSet::from([ScheduleRule::SlotCapacity]));
        let rows = broken_rows(&model, &values, ScheduleRule::SlotCapacity);
        assert_eq!(rows.len(), 5);
        assert!(rows.contains("slot_capacity[Sunday,w1]"));
        assert!(!rows.contains("slot_capacity[Sunday,w3]"));
    }

    #[test]
    fn test_rotation_venue_quota() {
        let config = fixtures::paired_divisions();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();

        // E1 splits its four West games two home, two away.
        let split = [
            ("E1", "W1", 1, 0),
            ("W2", "E1", 2, 1),
            ("E1", "W3", 3, 1),
            ("W4", "E1", 5, 1),
        ];
        let values = assignment(&model, &split, &[]);
        let rows = broken_rows(&model, &values, ScheduleRule::ConferenceRotation);
        assert!(!rows.contains("conference_rotation_home[E1]"));
        assert!(!rows.contains("conference_rotation_away[E1]"));
        assert!(!rows.contains("conference_rotation_meeting[E1,W1]"));

        // E1 hosts all four.
        let hosted = [
            ("E1", "W1", 1, 0),
            ("E1", "W2", 2, 1),
            ("E1", "W3", 3, 1),
            ("E1", "W4", 5, 1),
        ];
        let values = assignment(&model, &hosted, &[]);
        let rows = broken_rows(&model, &values, ScheduleRule::ConferenceRotation);
        assert!(rows.contains("conference_rotation_home[E1]"));
        assert!(rows.contains("conference_rotation_away[E1]"));
        // W2 hosted nobody from the East but still met E1 once.
        assert!(rows.contains("conference_rotation_home[W2]"));
        assert!(!rows.contains("conference_rotation_meeting[E1,W2]"));
    }

    #[test]
    fn test_interconference_tiers() {
        let config = fixtures::two_conferences();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();
        let program = model.program();

        assert_eq!(program.constraints_for(ScheduleRule::ConferenceRotation).count(), 8 + 16);
        assert_eq!(program.constraints_for(ScheduleRule::InterconferenceRotation).count(), 8 + 16);
        assert_eq!(program.constraints_for(ScheduleRule::InterconferenceExtra).count(), 8);
        assert_eq!(program.constraints_for(ScheduleRule::ConferenceRemainder).count(), 0);

        // A1 hosts both Beta South teams and meets both Beta North teams.
        let games = [
            ("A1", "B3", 1, 0),
            ("A1", "B4", 3, 1),
            ("A1", "B1", 5, 1),
            ("B2", "A1", 7, 1),
        ];
        let values = assignment(&model, &games, &[]);

        let rotation = broken_rows(&model, &values, ScheduleRule::InterconferenceRotation);
        assert!(rotation.contains("interconference_rotation_home[A1]"));
        assert!(rotation.contains("interconference_rotation_away[A1]"));
        assert!(!rotation.contains("interconference_rotation_meeting[A1,B3]"));

        let extra = broken_rows(&model, &values, ScheduleRule::InterconferenceExtra);
        assert!(extra.contains("interconference_extra[A1]"));
        assert!(!extra.contains("interconference_extra[B1]"));
        assert!(!extra.contains("interconference_extra[B2]"));
        // A2 never met Beta North.
        assert!(extra.contains("interconference_extra[A2]"));
    }

    #[test]
    fn test_conference_remainder() {
        let config = LeagueConfig::standard();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();
        let rule = ScheduleRule::ConferenceRemainder;

        // One game each against NFC East and NFC West, one home, one away.
        let spread = [("Packers", "Eagles", 1, 1), ("49ers", "Packers", 3, 1)];
        let values = assignment(&model, &spread, &[]);
        let rows = broken_rows(&model, &values, rule);
        assert!(!rows.contains("conference_remainder_division[Packers,NFC East]"));
        assert!(!rows.contains("conference_remainder_division[Packers,NFC West]"));
        assert!(!rows.contains("conference_remainder_home[Packers]"));
        assert!(!rows.contains("conference_remainder_away[Packers]"));

        // Both games against NFC East.
        let doubled = [("Packers", "Eagles", 1, 1), ("Cowboys", "Packers", 3, 1)];
        let values = assignment(&model, &doubled, &[]);
        let rows = broken_rows(&model, &values, rule);
        assert!(rows.contains("conference_remainder_division[Packers,NFC East]"));
        assert!(!rows.contains("conference_remainder_home[Packers]"));
        assert!(!rows.contains("conference_remainder_meeting[Eagles,Packers]"));

        // The same opponent twice, both at home.
        let repeated = [("Packers", "Eagles", 1, 1), ("Packers", "Eagles", 3, 1)];
        let values = assignment(&model, &repeated, &[]);
        let rows = broken_rows(&model, &values, rule);
        assert!(rows.contains("conference_remainder_meeting[Eagles,Packers]"));
        assert!(rows.contains("conference_remainder_home[Packers]"));
    }

    #[test]
    fn test_bye_outside_window() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();

        let mut byes = HAND_BYES.to_vec();
        byes[0] = ("Packers", 6);
        let values = assignment(&model, &HAND_GAMES, &byes);

        let broken = broken_rules(&model, &values);
        assert!(broken.contains(&ScheduleRule::ByeCount));
        assert!(broken.contains(&ScheduleRule::ByeDistribution));
        assert!(broken.contains(&ScheduleRule::Occupancy));
    }

    #[test]
    fn test_without_rule() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ModelBuilder::new(&topology, &config.rules)
            .without_rule(ScheduleRule::NoImmediateRematch)
            .without_rule(ScheduleRule::Balance)
            .build()
            .unwrap();

        assert!(!model.enabled_rules().contains(&ScheduleRule::NoImmediateRematch));
        assert!(model.enabled_rules().contains(&ScheduleRule::Balance));
        assert_eq!(
            model
                .program()
                .constraints_for(ScheduleRule::NoImmediateRematch)
                .count(),
            0
        );
    }

    #[test]
    fn test_unknown_opening_host() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let mut rules = config.rules.clone();
        rules.opening_host = Some("Oilers".into());

        let err = ScheduleConstraintModel::build(&topology, &rules).unwrap_err();
        assert!(err
            .configuration_issues()
            .iter()
            .any(|e| e.kind == ConfigurationErrorKind::UnknownTeam));
    }

    #[test]
    fn test_rules_must_fit_topology() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();

        // Eight weeks leave seven game weeks for six division games.
        let mut rules = config.rules.clone();
        rules.num_weeks = 8;
        let err = ScheduleConstraintModel::build(&topology, &rules).unwrap_err();
        assert!(err
            .configuration_issues()
            .iter()
            .any(|e| e.kind == ConfigurationErrorKind::TierMismatch));

        let mut rules = config.rules.clone();
        rules.num_weeks = 0;
        assert!(ScheduleConstraintModel::build(&topology, &rules).is_err());

        let mut rules = config.rules;
        rules.max_bye = 9;
        let err = ScheduleConstraintModel::build(&topology, &rules).unwrap_err();
        assert!(err
            .configuration_issues()
            .iter()
            .any(|e| e.kind == ConfigurationErrorKind::InvalidSeasonRules));
    }

    #[test]
    fn test_no_opening_host_disables_rule() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let mut rules = config.rules.clone();
        rules.opening_host = None;

        let model = ScheduleConstraintModel::build(&topology, &rules).unwrap();
        assert_eq!(model.program().constraints_for(ScheduleRule::OpeningGame).count(), 0);
    }

    /// Rows reduced to names, so two builds can be compared regardless of ids.
    fn canonical_rows(model: &ScheduleConstraintModel<'_>) -> BTreeSet<String> {
        let program = model.program();
        program
            .constraints()
            .iter()
            .map(|c| {
                let mut terms: Vec<String> = c
                    .expr
                    .terms()
                    .iter()
                    .map(|&(v, coef)| format!("{:.6}*{}", coef, program.variable(v).name))
                    .collect();
                terms.sort();
                format!("{} | {} {} {:.6}", c.name, terms.join(" + "), c.sense, c.rhs)
            })
            .collect()
    }

    #[test]
    fn test_constraint_set_independent_of_declaration_order() {
        let config = fixtures::paired_divisions();
        let topology = LeagueTopology::build(&config).unwrap();
        let reference = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();
        let expected = canonical_rows(&reference);
        assert_eq!(expected.len(), reference.program().constraint_count());

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..3 {
            let mut shuffled = config.clone();
            shuffled.conferences[0].divisions.shuffle(&mut rng);
            for division in &mut shuffled.conferences[0].divisions {
                division.teams.shuffle(&mut rng);
            }
            shuffled.regions.shuffle(&mut rng);

            let topology = LeagueTopology::build(&shuffled).unwrap();
            let model = ScheduleConstraintModel::build(&topology, &shuffled.rules).unwrap();
            assert_eq!(canonical_rows(&model), expected);
        }
    }

    #[test]
    fn test_standard_league_model_shape() {
        let config = LeagueConfig::standard();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();
        let program = model.program();

        assert_eq!(program.variable_count(), 32 * 32 * 18 * 5 + 32 * 18 + 32 + 2);
        assert_eq!(program.constraints_for(ScheduleRule::Divisional).count(), 96);
        assert_eq!(program.constraints_for(ScheduleRule::ConferenceRotation).count(), 128);
        assert_eq!(program.constraints_for(ScheduleRule::InterconferenceRotation).count(), 128);
        assert_eq!(program.constraints_for(ScheduleRule::ConferenceRemainder).count(), 256);
        assert_eq!(program.constraints_for(ScheduleRule::InterconferenceExtra).count(), 32);
        assert_eq!(program.constraints_for(ScheduleRule::NoImmediateRematch).count(), 496 * 17);
        assert_eq!(program.constraints_for(ScheduleRule::SlotCapacity).count(), 4 * 18);
        assert_eq!(program.constraints_for(ScheduleRule::ByeDistribution).count(), 8);
        assert_eq!(program.constraints_for(ScheduleRule::Occupancy).count(), 32 * 18);

        let quota = program.constraint("conference_remainder_home[Packers]").unwrap();
        assert_eq!(quota.rhs, 1.0);
        let rotation = program.constraint("conference_rotation_away[Packers]").unwrap();
        assert_eq!(rotation.rhs, 2.0);
        assert!(program
            .constraint("primetime_cap[Eagles]")
            .is_some_and(|c| c.rhs == 6.0));
    }

    struct FailingSolver;

    impl MipSolver for FailingSolver {
        fn name(&self) -> &str {
            "failing"
        }

        fn solve(&self, _program: &LinearProgram, _options: &SolveOptions) -> SolverOutcome {
            SolverOutcome::unsolved(SolveStatus::Error, "license expired", Duration::ZERO)
        }
    }

    #[test]
    fn test_solver_error_is_fatal() {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();

        let err = model.solve(&FailingSolver, &SolveOptions::default()).unwrap_err();
        match err {
            ScheduleError::Solver { solver, message } => {
                assert_eq!(solver, "failing");
                assert_eq!(message, "license expired");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_infeasible_is_data() {
        let mut config = fixtures::single_division();
        // Thursday Night needs a game every week, but nobody may play in primetime.
        config.rules.max_primetime_slots = 0;
        let topology = LeagueTopology::build(&config).unwrap();
        let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();

        let solved = model
            .solve(&GoodLpSolver::microlp(), &SolveOptions::default())
            .unwrap();
        assert_eq!(solved.status(), SolveStatus::Infeasible);
        assert!(solved.values().is_none());
    }
}
