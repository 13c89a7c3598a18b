//! Schedule audit.
//!
//! Re-checks a finished [`SeasonSchedule`] against the league rules
//! without looking at the model. Useful after extraction, and for
//! schedules edited by hand or loaded from elsewhere.
//!
//! Checked properties:
//! - one cell per team and week
//! - both sides of every game agree on week, slot, venue, and opponent
//! - bye count and bye window
//! - teams on bye per open week within `[floor(k), ceil(k)]`
//! - meetings and home/away split per opponent tier
//! - no pair meets in consecutive weeks
//! - capped slots hold their game count
//! - per-team primetime cap
//! - opening game placement

use log::warn;
use std::collections::HashMap;

use crate::models::{
    Game, ScheduleCell, SeasonRules, SeasonSchedule, TeamSchedule, Venue, Violation, ViolationType,
};
use crate::topology::{LeagueTopology, OpponentTier, TeamId};

/// Audits `schedule`; an empty result means every rule holds.
pub fn audit_schedule(
    schedule: &SeasonSchedule,
    topology: &LeagueTopology,
    rules: &SeasonRules,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if schedule.num_weeks != rules.num_weeks {
        violations.push(Violation::new(
            ViolationType::WeekCount,
            "season",
            None,
            format!(
                "Schedule covers {} weeks, season has {}",
                schedule.num_weeks, rules.num_weeks
            ),
        ));
    }

    let rows = index_rows(schedule, topology, rules, &mut violations);
    let slot_names: HashMap<&str, usize> = topology
        .slots()
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.as_str(), i))
        .collect();

    check_cells(&rows, topology, &slot_names, &mut violations);
    check_byes(&rows, topology, rules, &mut violations);
    check_meetings(&rows, topology, &mut violations);
    check_rematches(&rows, topology, rules, &mut violations);
    check_slots(&rows, topology, rules, &slot_names, &mut violations);
    check_opening(&rows, topology, rules, &mut violations);

    if !violations.is_empty() {
        warn!("Schedule audit found {} violations", violations.len());
    }
    violations
}

/// Rows by team id; teams without a usable row are reported and left out.
fn index_rows<'s>(
    schedule: &'s SeasonSchedule,
    topology: &LeagueTopology,
    rules: &SeasonRules,
    violations: &mut Vec<Violation>,
) -> Vec<Option<&'s TeamSchedule>> {
    let mut rows = vec![None; topology.team_count()];
    for row in &schedule.teams {
        match topology.team_id(&row.team) {
            Some(id) => rows[id.index()] = Some(row),
            None => violations.push(Violation::new(
                ViolationType::UnknownEntity,
                &row.team,
                None,
                format!("Schedule row for unknown team '{}'", row.team),
            )),
        }
    }
    for team in topology.team_ids() {
        let name = &topology.team(team).name;
        let row = rows[team.index()];
        match row {
            None => violations.push(Violation::new(
                ViolationType::WeekCount,
                name,
                None,
                format!("Team '{name}' has no schedule row"),
            )),
            Some(row) if row.weeks.len() != rules.num_weeks as usize => {
                violations.push(Violation::new(
                    ViolationType::WeekCount,
                    name,
                    None,
                    format!(
                        "Team '{}' has {} weeks, expected {}",
                        name,
                        row.weeks.len(),
                        rules.num_weeks
                    ),
                ));
                rows[team.index()] = None;
            }
            Some(_) => {}
        }
    }
    rows
}

/// Games of a team with resolved opponent ids: `(week, game, opponent)`.
fn games<'s>(
    row: &'s TeamSchedule,
    topology: &'s LeagueTopology,
) -> impl Iterator<Item = (u32, &'s Game, TeamId)> + 's {
    row.weeks.iter().enumerate().filter_map(move |(i, cell)| {
        let game = cell.as_game()?;
        let opponent = topology.team_id(&game.opponent)?;
        Some((i as u32 + 1, game, opponent))
    })
}

fn check_cells(
    rows: &[Option<&TeamSchedule>],
    topology: &LeagueTopology,
    slot_names: &HashMap<&str, usize>,
    violations: &mut Vec<Violation>,
) {
    for team in topology.team_ids() {
        let Some(row) = rows[team.index()] else {
            continue;
        };
        for (i, cell) in row.weeks.iter().enumerate() {
            let week = i as u32 + 1;
            let Some(game) = cell.as_game() else {
                continue;
            };
            if !slot_names.contains_key(game.slot.as_str()) {
                violations.push(Violation::new(
                    ViolationType::UnknownEntity,
                    &row.team,
                    Some(week),
                    format!("Unknown slot '{}'", game.slot),
                ));
            }
            let Some(opponent) = topology.team_id(&game.opponent) else {
                violations.push(Violation::new(
                    ViolationType::UnknownEntity,
                    &row.team,
                    Some(week),
                    format!("Unknown opponent '{}'", game.opponent),
                ));
                continue;
            };
            if opponent == team {
                violations.push(Violation::new(
                    ViolationType::AsymmetricGame,
                    &row.team,
                    Some(week),
                    "Team plays itself",
                ));
                continue;
            }

            let mirrored = ScheduleCell::game(game.slot.clone(), game.venue.flipped(), row.team.clone());
            let other = rows[opponent.index()].and_then(|r| r.week(week));
            if other != Some(&mirrored) {
                violations.push(Violation::new(
                    ViolationType::AsymmetricGame,
                    &row.team,
                    Some(week),
                    format!(
                        "'{}' has '{}' but '{}' has '{}'",
                        row.team,
                        cell,
                        game.opponent,
                        other.map(ToString::to_string).unwrap_or_default()
                    ),
                ));
            }
        }
    }
}

fn check_byes(
    rows: &[Option<&TeamSchedule>],
    topology: &LeagueTopology,
    rules: &SeasonRules,
    violations: &mut Vec<Violation>,
) {
    let open = |week: u32| rules.byes_per_team > 0 && rules.bye_weeks().contains(&week);
    let mut per_week = vec![0u32; rules.num_weeks as usize + 1];

    for row in rows.iter().flatten() {
        let byes = row.bye_weeks();
        if byes.len() != rules.byes_per_team as usize {
            violations.push(Violation::new(
                ViolationType::ByeCount,
                &row.team,
                None,
                format!("{} byes, expected {}", byes.len(), rules.byes_per_team),
            ));
        }
        for week in byes {
            per_week[week as usize] += 1;
            if !open(week) {
                violations.push(Violation::new(
                    ViolationType::ByeOutsideWindow,
                    &row.team,
                    Some(week),
                    format!(
                        "Bye in week {} outside [{}, {}]",
                        week, rules.min_bye, rules.max_bye
                    ),
                ));
            }
        }
    }

    if rules.byes_per_team == 0 {
        return;
    }
    if let Some((low, high)) = rules.bye_distribution_bounds(topology.team_count()) {
        for week in rules.bye_weeks().filter(|&w| w <= rules.num_weeks) {
            let count = per_week[week as usize];
            if count < low || count > high {
                violations.push(Violation::new(
                    ViolationType::ByeDistribution,
                    "league",
                    Some(week),
                    format!("{count} teams on bye, expected {low} to {high}"),
                ));
            }
        }
    }
}

fn check_meetings(
    rows: &[Option<&TeamSchedule>],
    topology: &LeagueTopology,
    violations: &mut Vec<Violation>,
) {
    let quotas = topology.tier_games();

    for team in topology.team_ids() {
        let Some(row) = rows[team.index()] else {
            continue;
        };
        let buckets = topology.buckets(team);

        // (home, away) per opponent
        let mut met = vec![(0u32, 0u32); topology.team_count()];
        for (_, game, opponent) in games(row, topology) {
            match game.venue {
                Venue::Home => met[opponent.index()].0 += 1,
                Venue::Away => met[opponent.index()].1 += 1,
            }
        }

        for opponent in topology.team_ids().filter(|&o| o != team) {
            let (home, away) = met[opponent.index()];
            let Some(range) = topology.required_meetings(team, opponent) else {
                continue;
            };
            let opp_name = &topology.team(opponent).name;
            if !range.contains(&(home + away)) {
                violations.push(Violation::new(
                    ViolationType::MeetingCount,
                    &row.team,
                    None,
                    format!(
                        "Met '{}' {} times, expected {}..={}",
                        opp_name,
                        home + away,
                        range.start(),
                        range.end()
                    ),
                ));
            } else if buckets.tier_of(opponent) == Some(OpponentTier::Division) && (home, away) != (1, 1) {
                violations.push(Violation::new(
                    ViolationType::HomeAwayBalance,
                    &row.team,
                    None,
                    format!("Division opponent '{opp_name}': {home} home, {away} away"),
                ));
            }
        }

        for &division in &buckets.conference_remainder {
            let count: u32 = topology
                .division(division)
                .teams
                .iter()
                .map(|t| met[t.index()].0 + met[t.index()].1)
                .sum();
            if count > 1 {
                violations.push(Violation::new(
                    ViolationType::MeetingCount,
                    &row.team,
                    None,
                    format!(
                        "{} games against division '{}', expected at most 1",
                        count,
                        topology.division(division).name
                    ),
                ));
            }
        }

        for tier in [
            OpponentTier::ConferenceRotation,
            OpponentTier::InterconferenceRotation,
            OpponentTier::ConferenceRemainder,
            OpponentTier::InterconferenceExtra,
        ] {
            let opponents = buckets.opponents(tier);
            if opponents.is_empty() {
                continue;
            }
            let home: u32 = opponents.iter().map(|o| met[o.index()].0).sum();
            let away: u32 = opponents.iter().map(|o| met[o.index()].1).sum();
            if home + away != quotas.games(tier) {
                violations.push(Violation::new(
                    ViolationType::MeetingCount,
                    &row.team,
                    None,
                    format!(
                        "{} games in tier {:?}, expected {}",
                        home + away,
                        tier,
                        quotas.games(tier)
                    ),
                ));
            } else if let Some(quota) = quotas.home_quota(tier) {
                if home != quota || away != quota {
                    violations.push(Violation::new(
                        ViolationType::HomeAwayBalance,
                        &row.team,
                        None,
                        format!("Tier {tier:?}: {home} home, {away} away, expected {quota} each"),
                    ));
                }
            }
        }
    }
}

fn check_rematches(
    rows: &[Option<&TeamSchedule>],
    topology: &LeagueTopology,
    rules: &SeasonRules,
    violations: &mut Vec<Violation>,
) {
    for team in topology.team_ids() {
        let Some(row) = rows[team.index()] else {
            continue;
        };
        let mut opponent_by_week: Vec<Option<TeamId>> = vec![None; rules.num_weeks as usize + 2];
        for (week, _, opponent) in games(row, topology) {
            opponent_by_week[week as usize] = Some(opponent);
        }
        for week in 1..rules.num_weeks {
            let (this, next) = (
                opponent_by_week[week as usize],
                opponent_by_week[week as usize + 1],
            );
            if let (Some(a), Some(b)) = (this, next) {
                // Reported once, from the side whose name sorts first.
                if a == b && row.team < topology.team(a).name {
                    violations.push(Violation::new(
                        ViolationType::ImmediateRematch,
                        &row.team,
                        Some(week),
                        format!(
                            "Meets '{}' in weeks {} and {}",
                            topology.team(a).name,
                            week,
                            week + 1
                        ),
                    ));
                }
            }
        }
    }
}

fn check_slots(
    rows: &[Option<&TeamSchedule>],
    topology: &LeagueTopology,
    rules: &SeasonRules,
    slot_names: &HashMap<&str, usize>,
    violations: &mut Vec<Violation>,
) {
    // Games per (week, slot), counted from the home side.
    let mut hosted = vec![vec![0u32; topology.slot_count()]; rules.num_weeks as usize + 1];

    for team in topology.team_ids() {
        let Some(row) = rows[team.index()] else {
            continue;
        };
        let mut primetime = 0u32;
        for (week, game, _) in games(row, topology) {
            let Some(&slot) = slot_names.get(game.slot.as_str()) else {
                continue;
            };
            if topology.slots()[slot].primetime {
                primetime += 1;
            }
            if game.venue == Venue::Home {
                hosted[week as usize][slot] += 1;
            }
        }
        if primetime > rules.max_primetime_slots {
            violations.push(Violation::new(
                ViolationType::PrimetimeCap,
                &row.team,
                None,
                format!(
                    "{} primetime games, cap is {}",
                    primetime, rules.max_primetime_slots
                ),
            ));
        }
    }

    for (slot_index, slot) in topology.slots().iter().enumerate() {
        for week in 1..=rules.num_weeks {
            let count = hosted[week as usize][slot_index];
            if !slot.capacity.admits(count) {
                violations.push(Violation::new(
                    ViolationType::SlotCapacity,
                    &slot.name,
                    Some(week),
                    format!("{} games, capacity {:?}", count, slot.capacity),
                ));
            }
        }
    }
}

fn check_opening(
    rows: &[Option<&TeamSchedule>],
    topology: &LeagueTopology,
    rules: &SeasonRules,
    violations: &mut Vec<Violation>,
) {
    let Some(host_name) = &rules.opening_host else {
        return;
    };
    let first = &topology.slot(topology.first_slot()).name;
    let opens = |cell: Option<&ScheduleCell>| {
        cell.and_then(ScheduleCell::as_game)
            .is_some_and(|g| g.venue == Venue::Home && &g.slot == first)
    };

    for team in topology.team_ids() {
        let Some(row) = rows[team.index()] else {
            continue;
        };
        let is_host = &row.team == host_name;
        let opened = opens(row.week(1));
        if is_host && !opened {
            violations.push(Violation::new(
                ViolationType::OpeningGame,
                &row.team,
                Some(1),
                format!("Opening host is not home in '{first}' in week 1"),
            ));
        } else if !is_host && opened {
            violations.push(Violation::new(
                ViolationType::OpeningGame,
                &row.team,
                Some(1),
                format!("Only '{host_name}' may host in '{first}' in week 1"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ScheduleExtractor;
    use crate::mip::testing::hand_assignment;
    use crate::mip::ScheduleConstraintModel;
    use crate::models::LeagueConfig;
    use crate::topology::fixtures;

    fn hand_schedule() -> (LeagueConfig, LeagueTopology, SeasonSchedule) {
        let config = fixtures::single_division();
        let topology = LeagueTopology::build(&config).unwrap();
        let schedule = {
            let model = ScheduleConstraintModel::build(&topology, &config.rules).unwrap();
            let values = hand_assignment(&model);
            ScheduleExtractor::for_model(&model).extract(&values).unwrap()
        };
        (config, topology, schedule)
    }

    fn set_cell(schedule: &mut SeasonSchedule, team: &str, week: u32, cell: ScheduleCell) {
        let row = schedule.teams.iter_mut().find(|r| r.team == team).unwrap();
        row.weeks[week as usize - 1] = cell;
    }

    fn kinds(violations: &[Violation]) -> Vec<ViolationType> {
        violations.iter().map(|v| v.violation_type.clone()).collect()
    }

    #[test]
    fn test_hand_schedule_is_clean() {
        let (config, topology, schedule) = hand_schedule();
        let violations = audit_schedule(&schedule, &topology, &config.rules);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_asymmetric_game() {
        let (config, topology, mut schedule) = hand_schedule();
        // Packers now claim the Lions game as a Sunday game.
        set_cell(&mut schedule, "Packers", 1, ScheduleCell::game("Sunday", Venue::Home, "Lions"));

        let violations = audit_schedule(&schedule, &topology, &config.rules);
        let asym: Vec<&Violation> = violations
            .iter()
            .filter(|v| v.violation_type == ViolationType::AsymmetricGame)
            .collect();
        assert_eq!(asym.len(), 2);
        assert!(kinds(&violations).contains(&ViolationType::OpeningGame));
    }

    #[test]
    fn test_rematch_detected() {
        let (config, topology, mut schedule) = hand_schedule();
        // Trade the week-2 and week-5 games.
        set_cell(&mut schedule, "Bears", 2, ScheduleCell::game("Thursday Night", Venue::Away, "Vikings"));
        set_cell(&mut schedule, "Vikings", 2, ScheduleCell::game("Thursday Night", Venue::Home, "Bears"));
        set_cell(&mut schedule, "Lions", 2, ScheduleCell::game("Sunday", Venue::Home, "Packers"));
        set_cell(&mut schedule, "Packers", 2, ScheduleCell::game("Sunday", Venue::Away, "Lions"));
        set_cell(&mut schedule, "Bears", 5, ScheduleCell::game("Thursday Night", Venue::Home, "Lions"));
        set_cell(&mut schedule, "Lions", 5, ScheduleCell::game("Thursday Night", Venue::Away, "Bears"));
        set_cell(&mut schedule, "Packers", 5, ScheduleCell::game("Sunday", Venue::Home, "Vikings"));
        set_cell(&mut schedule, "Vikings", 5, ScheduleCell::game("Sunday", Venue::Away, "Packers"));

        let violations = audit_schedule(&schedule, &topology, &config.rules);
        let rematches: Vec<(&str, Option<u32>)> = violations
            .iter()
            .filter(|v| v.violation_type == ViolationType::ImmediateRematch)
            .map(|v| (v.entity_id.as_str(), v.week))
            .collect();
        assert!(rematches.contains(&("Lions", Some(1))));
        assert!(rematches.contains(&("Bears", Some(1))));
        assert!(!kinds(&violations).contains(&ViolationType::AsymmetricGame));
    }

    #[test]
    fn test_bye_violations() {
        let (config, topology, mut schedule) = hand_schedule();
        // Packers and Lions both skip week 1 instead of playing each other.
        set_cell(&mut schedule, "Packers", 1, ScheduleCell::Bye);
        set_cell(&mut schedule, "Lions", 1, ScheduleCell::Bye);

        let found = kinds(&audit_schedule(&schedule, &topology, &config.rules));
        assert!(found.contains(&ViolationType::ByeCount));
        assert!(found.contains(&ViolationType::ByeOutsideWindow));
        assert!(found.contains(&ViolationType::MeetingCount));
        assert!(found.contains(&ViolationType::SlotCapacity));
        assert!(found.contains(&ViolationType::OpeningGame));
    }

    #[test]
    fn test_home_away_balance() {
        let (config, topology, mut schedule) = hand_schedule();
        // Packers host the Bears in week 7 as well.
        set_cell(&mut schedule, "Packers", 7, ScheduleCell::game("Sunday", Venue::Home, "Bears"));
        set_cell(&mut schedule, "Bears", 7, ScheduleCell::game("Sunday", Venue::Away, "Packers"));

        let violations = audit_schedule(&schedule, &topology, &config.rules);
        let balance: Vec<&str> = violations
            .iter()
            .filter(|v| v.violation_type == ViolationType::HomeAwayBalance)
            .map(|v| v.entity_id.as_str())
            .collect();
        assert_eq!(balance, vec!["Packers", "Bears"]);
    }

    #[test]
    fn test_primetime_cap() {
        let (mut config, topology, schedule) = hand_schedule();
        config.rules.max_primetime_slots = 3;

        let violations = audit_schedule(&schedule, &topology, &config.rules);
        let capped: Vec<&str> = violations
            .iter()
            .filter(|v| v.violation_type == ViolationType::PrimetimeCap)
            .map(|v| v.entity_id.as_str())
            .collect();
        assert_eq!(capped, vec!["Lions", "Vikings"]);
    }

    #[test]
    fn test_missing_and_unknown_rows() {
        let (config, topology, mut schedule) = hand_schedule();
        schedule.teams[3].team = "Oilers".into();
        schedule.teams[0].weeks.pop();

        let violations = audit_schedule(&schedule, &topology, &config.rules);
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::UnknownEntity && v.entity_id == "Oilers"));
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::WeekCount && v.entity_id == "Vikings"));
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::WeekCount && v.entity_id == "Packers"));
    }
}
