//! Input validation for league configurations.
//!
//! Checks structural integrity of a [`LeagueConfig`] before any topology
//! is derived. Detects:
//! - Duplicate names (conferences, divisions, teams, regions, slots)
//! - Empty conferences or divisions, and divisions of unequal size
//! - Non-finite ratings
//! - Region declarations naming unknown divisions, or sharing a division
//! - Region pairs naming unknown regions, or not covering each region once
//! - Inconsistent season rules (bye window, opening host)
//!
//! All issues are collected; nothing stops at the first one.
//!
//! [`validate_rules`] re-checks a season's rules against a built
//! [`LeagueTopology`] before a model is generated from them.

use crate::models::{LeagueConfig, SeasonRules};
use crate::topology::LeagueTopology;
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ConfigurationError>>;

/// A configuration error.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationError {
    /// Error category.
    pub kind: ConfigurationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationErrorKind {
    /// Two entities of the same kind share a name.
    DuplicateName,
    /// A conference without divisions or a division without teams.
    EmptyGroup,
    /// Divisions of different sizes, or conferences with different division counts.
    InconsistentShape,
    /// A rating that is NaN or infinite.
    InvalidRating,
    /// A region references a division that doesn't exist.
    UnknownDivision,
    /// A division is listed in more than one region.
    DivisionInMultipleRegions,
    /// A region pair references a region that doesn't exist.
    UnknownRegion,
    /// Region pairs don't cover every region exactly once.
    RegionPairing,
    /// A rule references a team that doesn't exist.
    UnknownTeam,
    /// No time slots declared, or slot names repeat.
    InvalidTimeSlots,
    /// Bye window or week count is inconsistent.
    InvalidSeasonRules,
    /// Derived opponent tiers don't form the expected partition.
    TierMismatch,
}

impl ConfigurationError {
    pub fn new(kind: ConfigurationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a league configuration.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &LeagueConfig) -> ValidationResult {
    let mut errors = Vec::new();

    check_structure(config, &mut errors);
    check_regions(config, &mut errors);
    check_slots(config, &mut errors);
    check_rules(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_structure(config: &LeagueConfig, errors: &mut Vec<ConfigurationError>) {
    let mut conference_names = HashSet::new();
    let mut division_names = HashSet::new();
    let mut team_names = HashSet::new();

    if config.conferences.is_empty() {
        errors.push(ConfigurationError::new(
            ConfigurationErrorKind::EmptyGroup,
            "League has no conferences",
        ));
    }

    for conf in &config.conferences {
        if !conference_names.insert(conf.name.as_str()) {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::DuplicateName,
                format!("Duplicate conference name: {}", conf.name),
            ));
        }
        if conf.divisions.is_empty() {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::EmptyGroup,
                format!("Conference '{}' has no divisions", conf.name),
            ));
        }

        for div in &conf.divisions {
            if !division_names.insert(div.name.as_str()) {
                errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::DuplicateName,
                    format!("Duplicate division name: {}", div.name),
                ));
            }
            if div.teams.is_empty() {
                errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::EmptyGroup,
                    format!("Division '{}' has no teams", div.name),
                ));
            }

            for team in &div.teams {
                if !team_names.insert(team.name.as_str()) {
                    errors.push(ConfigurationError::new(
                        ConfigurationErrorKind::DuplicateName,
                        format!("Duplicate team name: {}", team.name),
                    ));
                }
                if !team.rating.is_finite() {
                    errors.push(ConfigurationError::new(
                        ConfigurationErrorKind::InvalidRating,
                        format!("Team '{}' has a non-finite rating", team.name),
                    ));
                }
            }
        }
    }

    let division_sizes: HashSet<usize> = config
        .conferences
        .iter()
        .flat_map(|c| &c.divisions)
        .map(|d| d.teams.len())
        .collect();
    if division_sizes.len() > 1 {
        errors.push(ConfigurationError::new(
            ConfigurationErrorKind::InconsistentShape,
            format!("Divisions differ in size: {:?}", sorted(division_sizes)),
        ));
    }

    let conference_sizes: HashSet<usize> =
        config.conferences.iter().map(|c| c.divisions.len()).collect();
    if conference_sizes.len() > 1 {
        errors.push(ConfigurationError::new(
            ConfigurationErrorKind::InconsistentShape,
            format!(
                "Conferences differ in division count: {:?}",
                sorted(conference_sizes)
            ),
        ));
    }
}

fn check_regions(config: &LeagueConfig, errors: &mut Vec<ConfigurationError>) {
    let division_names: HashSet<&str> = config
        .conferences
        .iter()
        .flat_map(|c| &c.divisions)
        .map(|d| d.name.as_str())
        .collect();

    let mut region_names = HashSet::new();
    let mut owner: HashMap<&str, &str> = HashMap::new();
    for region in &config.regions {
        if !region_names.insert(region.name.as_str()) {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::DuplicateName,
                format!("Duplicate region name: {}", region.name),
            ));
        }
        for div in &region.divisions {
            if !division_names.contains(div.as_str()) {
                errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::UnknownDivision,
                    format!("Region '{}' references unknown division '{}'", region.name, div),
                ));
                continue;
            }
            if let Some(previous) = owner.insert(div.as_str(), region.name.as_str()) {
                errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::DivisionInMultipleRegions,
                    format!(
                        "Division '{}' appears in regions '{}' and '{}'",
                        div, previous, region.name
                    ),
                ));
            }
        }
    }

    let mut appearances: HashMap<&str, usize> = HashMap::new();
    for (r1, r2) in &config.region_pairs {
        for r in [r1, r2] {
            if !region_names.contains(r.as_str()) {
                errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::UnknownRegion,
                    format!("Region pair ({r1}, {r2}) references unknown region '{r}'"),
                ));
            }
        }
        if r1 == r2 {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::RegionPairing,
                format!("Region '{r1}' is paired with itself"),
            ));
        }
        *appearances.entry(r1.as_str()).or_default() += 1;
        *appearances.entry(r2.as_str()).or_default() += 1;
    }

    if !config.region_pairs.is_empty() {
        for region in &config.regions {
            match appearances.get(region.name.as_str()).copied().unwrap_or(0) {
                1 => {}
                0 => errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::RegionPairing,
                    format!("Region '{}' is not in any region pair", region.name),
                )),
                n => errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::RegionPairing,
                    format!("Region '{}' appears in {} region pairs", region.name, n),
                )),
            }
        }
    }
}

fn check_slots(config: &LeagueConfig, errors: &mut Vec<ConfigurationError>) {
    if config.time_slots.is_empty() {
        errors.push(ConfigurationError::new(
            ConfigurationErrorKind::InvalidTimeSlots,
            "No time slots declared",
        ));
    }
    let mut names = HashSet::new();
    for slot in &config.time_slots {
        if !names.insert(slot.name.as_str()) {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::InvalidTimeSlots,
                format!("Duplicate time slot name: {}", slot.name),
            ));
        }
    }
}

fn check_rules(config: &LeagueConfig, errors: &mut Vec<ConfigurationError>) {
    check_season_rules(
        &config.rules,
        |name| config.teams().any(|t| t.name == name),
        errors,
    );
}

/// Validates season rules against an already derived topology.
///
/// A topology is built from one `LeagueConfig`, but a model may be built
/// with a different `SeasonRules` value. The rules must still fit the
/// league: a valid bye window, a known opening host, and as many game
/// weeks per team as the opponent tiers require.
pub fn validate_rules(rules: &SeasonRules, topology: &LeagueTopology) -> ValidationResult {
    let mut errors = Vec::new();

    check_season_rules(rules, |name| topology.team_id(name).is_some(), &mut errors);

    let required = topology.tier_games().total();
    if errors.is_empty() && required != rules.games_per_team() {
        errors.push(ConfigurationError::new(
            ConfigurationErrorKind::TierMismatch,
            format!(
                "Tiers require {} games per team but the season has {} ({} weeks, {} byes)",
                required,
                rules.games_per_team(),
                rules.num_weeks,
                rules.byes_per_team
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_season_rules(
    rules: &SeasonRules,
    is_team: impl Fn(&str) -> bool,
    errors: &mut Vec<ConfigurationError>,
) {

    if rules.num_weeks == 0 {
        errors.push(ConfigurationError::new(
            ConfigurationErrorKind::InvalidSeasonRules,
            "Season has no weeks",
        ));
    }

    if rules.byes_per_team > 0 {
        if rules.min_bye == 0 || rules.min_bye > rules.max_bye || rules.max_bye > rules.num_weeks
        {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::InvalidSeasonRules,
                format!(
                    "Bye window [{}, {}] must satisfy 1 <= min <= max <= {}",
                    rules.min_bye, rules.max_bye, rules.num_weeks
                ),
            ));
        } else if rules.byes_per_team > rules.bye_window_len() {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::InvalidSeasonRules,
                format!(
                    "{} byes per team do not fit in a {}-week bye window",
                    rules.byes_per_team,
                    rules.bye_window_len()
                ),
            ));
        }
    }

    if let Some(host) = &rules.opening_host {
        if !is_team(host) {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::UnknownTeam,
                format!("Opening host '{host}' is not a team in the league"),
            ));
        }
    }
}

fn sorted(set: HashSet<usize>) -> Vec<usize> {
    let mut v: Vec<usize> = set.into_iter().collect();
    v.sort_unstable();
    v
}
