//! League topology: derived team relationships.
//!
//! Built once from a validated [`LeagueConfig`] and immutable afterwards.
//! Entities are stored in arenas and addressed by dense ids, so the model
//! builder can index variable arrays directly instead of hashing names.
//!
//! # Algorithm
//! 1. Assign ids to conferences, divisions, and teams in declaration order;
//!    record team → division → conference links.
//! 2. For each region pair (r1, r2) and every d1 ∈ r1, d2 ∈ r2: if d1 and d2
//!    share a conference they become each other's *conference rotation*
//!    division, otherwise each other's *interconference rotation* division.
//! 3. Per team, the *conference remainder* is the same-conference divisions
//!    minus its own and its rotation division; the *interconference extra*
//!    pool is every other-conference team outside its rotation division.
//! 4. Check that the tiers partition all other teams, that every team owes
//!    the same number of games per tier, and that the total fills the
//!    season (`num_weeks - byes_per_team`).

use log::info;
use std::collections::HashMap;

use crate::error::{Result, ScheduleError};
use crate::models::{LeagueConfig, TimeSlot};
use crate::validation::{validate_config, ConfigurationError, ConfigurationErrorKind};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position in the owning arena.
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Index of a team.
    TeamId
);
arena_id!(
    /// Index of a division.
    DivisionId
);
arena_id!(
    /// Index of a conference.
    ConferenceId
);
arena_id!(
    /// Index of a region.
    RegionId
);
arena_id!(
    /// Index of a time slot; `SlotId(0)` is the chronologically-first slot.
    SlotId
);

/// A team with its resolved memberships.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub name: String,
    pub division: DivisionId,
    pub conference: ConferenceId,
    pub rating: f64,
}

/// A division with its resolved memberships.
#[derive(Debug, Clone, PartialEq)]
pub struct Division {
    pub name: String,
    pub conference: ConferenceId,
    pub region: Option<RegionId>,
    pub teams: Vec<TeamId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conference {
    pub name: String,
    pub divisions: Vec<DivisionId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub divisions: Vec<DivisionId>,
}

/// Classification of an opponent relative to a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpponentTier {
    /// Same division.
    Division,
    /// The region-paired division of the same conference.
    ConferenceRotation,
    /// The region-paired division of another conference.
    InterconferenceRotation,
    /// Other same-conference divisions.
    ConferenceRemainder,
    /// Other-conference teams outside the rotation division.
    InterconferenceExtra,
}

/// A team's opponents, split into tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct OpponentBuckets {
    /// Division mates.
    pub division: Vec<TeamId>,
    /// Conference rotation division, if the team's region is paired.
    pub conference_rotation: Option<DivisionId>,
    /// Interconference rotation division, if the team's region is paired.
    pub interconference_rotation: Option<DivisionId>,
    /// Remaining same-conference divisions.
    pub conference_remainder: Vec<DivisionId>,
    /// Remaining other-conference teams.
    pub interconference_extra: Vec<TeamId>,
    tiers: Vec<Option<OpponentTier>>,
}

impl OpponentBuckets {
    /// Tier of an opponent; `None` for the team itself.
    pub fn tier_of(&self, opponent: TeamId) -> Option<OpponentTier> {
        self.tiers.get(opponent.index()).copied().flatten()
    }

    /// All opponents in a tier.
    pub fn opponents(&self, tier: OpponentTier) -> Vec<TeamId> {
        self.tiers
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Some(tier))
            .map(|(i, _)| TeamId(i))
            .collect()
    }
}

/// Games each team owes per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierGames {
    pub division: u32,
    pub conference_rotation: u32,
    pub interconference_rotation: u32,
    pub conference_remainder: u32,
    pub interconference_extra: u32,
}

impl TierGames {
    /// Games in a tier.
    pub fn games(&self, tier: OpponentTier) -> u32 {
        match tier {
            OpponentTier::Division => self.division,
            OpponentTier::ConferenceRotation => self.conference_rotation,
            OpponentTier::InterconferenceRotation => self.interconference_rotation,
            OpponentTier::ConferenceRemainder => self.conference_remainder,
            OpponentTier::InterconferenceExtra => self.interconference_extra,
        }
    }

    /// Required home games (and, equally, away games) in a tier.
    ///
    /// `None` for the interconference extra game, whose venue is free.
    pub fn home_quota(&self, tier: OpponentTier) -> Option<u32> {
        match tier {
            OpponentTier::InterconferenceExtra => None,
            _ => Some(self.games(tier) / 2),
        }
    }

    /// Games per team over the season.
    pub fn total(&self) -> u32 {
        self.division
            + self.conference_rotation
            + self.interconference_rotation
            + self.conference_remainder
            + self.interconference_extra
    }
}

/// Validated, immutable league relationships.
#[derive(Debug, Clone)]
pub struct LeagueTopology {
    teams: Vec<Team>,
    divisions: Vec<Division>,
    conferences: Vec<Conference>,
    regions: Vec<Region>,
    slots: Vec<TimeSlot>,
    buckets: Vec<OpponentBuckets>,
    tier_games: TierGames,
    team_index: HashMap<String, TeamId>,
}

impl LeagueTopology {
    /// Derives the topology from raw configuration.
    ///
    /// # Errors
    /// - `Configuration` if the configuration is malformed or the derived
    ///   tiers don't fill the season consistently.
    /// - `ModelConstruction` if an opponent lands in two tiers, or none.
    pub fn build(config: &LeagueConfig) -> Result<Self> {
        validate_config(config).map_err(ScheduleError::Configuration)?;

        // Step 1: arenas and membership maps.
        let mut teams = Vec::new();
        let mut divisions = Vec::new();
        let mut conferences = Vec::new();
        let mut team_index = HashMap::new();
        let mut division_index: HashMap<&str, DivisionId> = HashMap::new();

        for conf_cfg in &config.conferences {
            let conf_id = ConferenceId(conferences.len());
            let mut conf = Conference {
                name: conf_cfg.name.clone(),
                divisions: Vec::new(),
            };
            for div_cfg in &conf_cfg.divisions {
                let div_id = DivisionId(divisions.len());
                let mut div = Division {
                    name: div_cfg.name.clone(),
                    conference: conf_id,
                    region: None,
                    teams: Vec::new(),
                };
                for team_cfg in &div_cfg.teams {
                    let team_id = TeamId(teams.len());
                    team_index.insert(team_cfg.name.clone(), team_id);
                    teams.push(Team {
                        name: team_cfg.name.clone(),
                        division: div_id,
                        conference: conf_id,
                        rating: team_cfg.rating,
                    });
                    div.teams.push(team_id);
                }
                division_index.insert(div_cfg.name.as_str(), div_id);
                conf.divisions.push(div_id);
                divisions.push(div);
            }
            conferences.push(conf);
        }

        let mut regions = Vec::new();
        let mut region_index: HashMap<&str, RegionId> = HashMap::new();
        for region_cfg in &config.regions {
            let region_id = RegionId(regions.len());
            let mut region = Region {
                name: region_cfg.name.clone(),
                divisions: Vec::new(),
            };
            for name in &region_cfg.divisions {
                // Validation guarantees the division exists.
                if let Some(&div_id) = division_index.get(name.as_str()) {
                    divisions[div_id.index()].region = Some(region_id);
                    region.divisions.push(div_id);
                }
            }
            region_index.insert(region_cfg.name.as_str(), region_id);
            regions.push(region);
        }

        // Step 2: rotation divisions from region pairs.
        let mut conference_rotation: Vec<Option<DivisionId>> = vec![None; divisions.len()];
        let mut interconference_rotation: Vec<Option<DivisionId>> = vec![None; divisions.len()];
        for (r1, r2) in &config.region_pairs {
            let (Some(&r1), Some(&r2)) = (region_index.get(r1.as_str()), region_index.get(r2.as_str()))
            else {
                continue;
            };
            for &d1 in &regions[r1.index()].divisions {
                for &d2 in &regions[r2.index()].divisions {
                    let rotation = if divisions[d1.index()].conference == divisions[d2.index()].conference {
                        &mut conference_rotation
                    } else {
                        &mut interconference_rotation
                    };
                    pair_divisions(rotation, &divisions, d1, d2)?;
                    pair_divisions(rotation, &divisions, d2, d1)?;
                }
            }
        }

        // Step 3: per-team tiers.
        let mut buckets = Vec::with_capacity(teams.len());
        for (i, team) in teams.iter().enumerate() {
            let me = TeamId(i);
            let own = team.division;
            let mut tiers: Vec<Option<OpponentTier>> = vec![None; teams.len()];

            let division_mates: Vec<TeamId> = divisions[own.index()]
                .teams
                .iter()
                .copied()
                .filter(|&t| t != me)
                .collect();
            classify(&mut tiers, &teams, team, &division_mates, OpponentTier::Division)?;

            let conf_rot = conference_rotation[own.index()];
            if let Some(d) = conf_rot {
                classify(&mut tiers, &teams, team, &divisions[d.index()].teams, OpponentTier::ConferenceRotation)?;
            }

            let inter_rot = interconference_rotation[own.index()];
            if let Some(d) = inter_rot {
                classify(
                    &mut tiers,
                    &teams,
                    team,
                    &divisions[d.index()].teams,
                    OpponentTier::InterconferenceRotation,
                )?;
            }

            let remainder: Vec<DivisionId> = conferences[team.conference.index()]
                .divisions
                .iter()
                .copied()
                .filter(|&d| d != own && Some(d) != conf_rot)
                .collect();
            for &d in &remainder {
                classify(&mut tiers, &teams, team, &divisions[d.index()].teams, OpponentTier::ConferenceRemainder)?;
            }

            let extra: Vec<TeamId> = (0..teams.len())
                .map(TeamId)
                .filter(|&t| {
                    let other = &teams[t.index()];
                    other.conference != team.conference && Some(other.division) != inter_rot
                })
                .collect();
            classify(&mut tiers, &teams, team, &extra, OpponentTier::InterconferenceExtra)?;

            if let Some((unclassified, _)) = tiers
                .iter()
                .enumerate()
                .find(|(j, t)| *j != i && t.is_none())
            {
                return Err(ScheduleError::ModelConstruction {
                    entity: team.name.clone(),
                    message: format!("opponent '{}' is in no tier", teams[unclassified].name),
                });
            }

            buckets.push(OpponentBuckets {
                division: division_mates,
                conference_rotation: conf_rot,
                interconference_rotation: inter_rot,
                conference_remainder: remainder,
                interconference_extra: extra,
                tiers,
            });
        }

        // Step 4: per-tier game counts.
        let tier_games = derive_tier_games(&teams, &divisions, &buckets, config)?;

        info!(
            "League topology built: {} teams, {} divisions, {} conferences, {} games per team",
            teams.len(),
            divisions.len(),
            conferences.len(),
            tier_games.total()
        );

        Ok(Self {
            teams,
            divisions,
            conferences,
            regions,
            slots: config.time_slots.clone(),
            buckets,
            tier_games,
            team_index,
        })
    }

    #[inline]
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Team ids in input order.
    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + Clone {
        (0..self.teams.len()).map(TeamId)
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.index()]
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Looks up a team by name.
    pub fn team_id(&self, name: &str) -> Option<TeamId> {
        self.team_index.get(name).copied()
    }

    pub fn division(&self, id: DivisionId) -> &Division {
        &self.divisions[id.index()]
    }

    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    pub fn conferences(&self) -> &[Conference] {
        &self.conferences
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot ids in chronological order.
    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> + Clone {
        (0..self.slots.len()).map(SlotId)
    }

    pub fn slot(&self, id: SlotId) -> &TimeSlot {
        &self.slots[id.index()]
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// The chronologically-first slot.
    pub fn first_slot(&self) -> SlotId {
        SlotId(0)
    }

    /// Slots flagged primetime.
    pub fn primetime_slots(&self) -> Vec<SlotId> {
        self.slot_ids().filter(|&s| self.slot(s).primetime).collect()
    }

    /// A team's opponent tiers.
    pub fn buckets(&self, team: TeamId) -> &OpponentBuckets {
        &self.buckets[team.index()]
    }

    /// Tier of `opponent` relative to `team`.
    pub fn tier(&self, team: TeamId, opponent: TeamId) -> Option<OpponentTier> {
        self.buckets(team).tier_of(opponent)
    }

    /// Games every team owes per tier.
    pub fn tier_games(&self) -> TierGames {
        self.tier_games
    }

    /// Meetings a pair must have: 2 within a division, 1 in the rotation
    /// tiers, and at most 1 (0 or 1) otherwise.
    pub fn required_meetings(&self, team: TeamId, opponent: TeamId) -> Option<std::ops::RangeInclusive<u32>> {
        self.tier(team, opponent).map(|tier| match tier {
            OpponentTier::Division => 2..=2,
            OpponentTier::ConferenceRotation | OpponentTier::InterconferenceRotation => 1..=1,
            OpponentTier::ConferenceRemainder | OpponentTier::InterconferenceExtra => 0..=1,
        })
    }
}

fn pair_divisions(
    rotation: &mut [Option<DivisionId>],
    divisions: &[Division],
    division: DivisionId,
    partner: DivisionId,
) -> Result<()> {
    match rotation[division.index()] {
        Some(existing) if existing != partner => Err(ScheduleError::ModelConstruction {
            entity: divisions[division.index()].name.clone(),
            message: format!(
                "paired with both '{}' and '{}'",
                divisions[existing.index()].name,
                divisions[partner.index()].name
            ),
        }),
        _ => {
            rotation[division.index()] = Some(partner);
            Ok(())
        }
    }
}

fn classify(
    tiers: &mut [Option<OpponentTier>],
    teams: &[Team],
    team: &Team,
    opponents: &[TeamId],
    tier: OpponentTier,
) -> Result<()> {
    for &opp in opponents {
        if teams[opp.index()].name == team.name {
            return Err(ScheduleError::ModelConstruction {
                entity: team.name.clone(),
                message: format!("team classified as its own {tier:?} opponent"),
            });
        }
        if let Some(existing) = tiers[opp.index()] {
            return Err(ScheduleError::ModelConstruction {
                entity: team.name.clone(),
                message: format!(
                    "opponent '{}' is in both {:?} and {:?}",
                    teams[opp.index()].name,
                    existing,
                    tier
                ),
            });
        }
        tiers[opp.index()] = Some(tier);
    }
    Ok(())
}

fn derive_tier_games(
    teams: &[Team],
    divisions: &[Division],
    buckets: &[OpponentBuckets],
    config: &LeagueConfig,
) -> Result<TierGames> {
    let mut errors = Vec::new();
    let mut reference: Option<(usize, TierGames)> = None;

    for (i, bucket) in buckets.iter().enumerate() {
        let rotation_size =
            |d: Option<DivisionId>| d.map(|d| divisions[d.index()].teams.len() as u32).unwrap_or(0);
        let games = TierGames {
            division: 2 * bucket.division.len() as u32,
            conference_rotation: rotation_size(bucket.conference_rotation),
            interconference_rotation: rotation_size(bucket.interconference_rotation),
            conference_remainder: bucket.conference_remainder.len() as u32,
            interconference_extra: u32::from(!bucket.interconference_extra.is_empty()),
        };

        match reference {
            None => {
                for (label, count) in [
                    ("conference rotation", games.conference_rotation),
                    ("interconference rotation", games.interconference_rotation),
                    ("conference remainder", games.conference_remainder),
                ] {
                    if count % 2 != 0 {
                        errors.push(ConfigurationError::new(
                            ConfigurationErrorKind::TierMismatch,
                            format!(
                                "Team '{}' owes {} {} games, which cannot split evenly home and away",
                                teams[i].name, count, label
                            ),
                        ));
                    }
                }
                reference = Some((i, games));
            }
            Some((first, expected)) if expected != games => {
                errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::TierMismatch,
                    format!(
                        "Team '{}' owes {:?} but team '{}' owes {:?}",
                        teams[i].name, games, teams[first].name, expected
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    let games = reference.map(|(_, g)| g).unwrap_or_default();
    if errors.is_empty() && games.total() != config.rules.games_per_team() {
        errors.push(ConfigurationError::new(
            ConfigurationErrorKind::TierMismatch,
            format!(
                "Tiers require {} games per team but the season has {} ({} weeks, {} byes)",
                games.total(),
                config.rules.games_per_team(),
                config.rules.num_weeks,
                config.rules.byes_per_team
            ),
        ));
    }

    if errors.is_empty() {
        Ok(games)
    } else {
        Err(ScheduleError::Configuration(errors))
    }
}
