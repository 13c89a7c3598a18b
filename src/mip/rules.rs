//! Constraint generators, one per rule group.
//!
//! Each generator reads the topology and variable layout through a
//! [`RuleContext`] and appends its rows to the program. Generators are
//! independent: any subset can be emitted.
//!
//! Rows over an unordered team pair are emitted once and named by the two
//! team names in sorted order, so the set of rows does not depend on the
//! order teams were declared in.

use crate::lp::{LinearExpr, LinearProgram, Sense};
use crate::models::{ScheduleRule, SeasonRules, SlotCapacity};
use crate::topology::{LeagueTopology, OpponentTier, TeamId};

use super::layout::VariableLayout;
use super::objective;

/// Inputs shared by every generator.
pub struct RuleContext<'a> {
    pub topology: &'a LeagueTopology,
    pub rules: &'a SeasonRules,
    pub layout: &'a VariableLayout,
    pub opening_host: Option<TeamId>,
}

impl RuleContext<'_> {
    fn name(&self, team: TeamId) -> &str {
        &self.topology.team(team).name
    }

    /// `A,B` with the names sorted.
    fn pair_label(&self, a: TeamId, b: TeamId) -> String {
        let (x, y) = (self.name(a), self.name(b));
        if x <= y {
            format!("{x},{y}")
        } else {
            format!("{y},{x}")
        }
    }

    fn weeks(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.rules.num_weeks
    }

    /// Unordered pairs of distinct teams.
    fn pairs(&self) -> impl Iterator<Item = (TeamId, TeamId)> + '_ {
        self.topology.team_ids().flat_map(move |a| {
            self.topology
                .team_ids()
                .filter(move |&b| a < b)
                .map(move |b| (a, b))
        })
    }

    fn tier_pairs(&self, tier: OpponentTier) -> impl Iterator<Item = (TeamId, TeamId)> + '_ {
        self.pairs()
            .filter(move |&(a, b)| self.topology.tier(a, b) == Some(tier))
    }

    /// Every game `team` plays in `week`, either venue, any slot.
    fn games_in_week(&self, team: TeamId, week: u32) -> LinearExpr {
        let mut expr = LinearExpr::new();
        for other in self.topology.team_ids().filter(|&o| o != team) {
            expr.extend(self.layout.meetings_in_week(team, other, week));
        }
        expr
    }

    /// Whether byes are allowed in `week`.
    fn bye_open(&self, week: u32) -> bool {
        self.rules.byes_per_team > 0 && self.rules.bye_weeks().contains(&week)
    }
}

/// Signature shared by all generators.
pub type RuleGenerator = fn(&RuleContext<'_>, &mut LinearProgram);

/// Generator for a rule group.
pub fn generator(rule: ScheduleRule) -> RuleGenerator {
    match rule {
        ScheduleRule::NoSelfPlay => no_self_play,
        ScheduleRule::Divisional => divisional,
        ScheduleRule::ConferenceRotation => conference_rotation,
        ScheduleRule::InterconferenceRotation => interconference_rotation,
        ScheduleRule::ConferenceRemainder => conference_remainder,
        ScheduleRule::InterconferenceExtra => interconference_extra,
        ScheduleRule::NoImmediateRematch => no_immediate_rematch,
        ScheduleRule::PrimetimeCap => primetime_cap,
        ScheduleRule::SlotCapacity => slot_capacity,
        ScheduleRule::OpeningGame => opening_game,
        ScheduleRule::ByeCount => bye_count,
        ScheduleRule::ByeDistribution => bye_distribution,
        ScheduleRule::Occupancy => occupancy,
        ScheduleRule::Balance => objective::balance,
    }
}

/// `Σ x[t][t] == 0` per team.
pub fn no_self_play(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    for team in ctx.topology.team_ids() {
        lp.add_constraint(
            ScheduleRule::NoSelfPlay,
            format!("no_self_play[{}]", ctx.name(team)),
            LinearExpr::sum(ctx.layout.hosting_all_season(team, team)),
            Sense::Eq,
            0.0,
        );
    }
}

/// Each division opponent hosted exactly once, per ordered pair.
pub fn divisional(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    for (a, b) in ctx.tier_pairs(OpponentTier::Division) {
        for (home, away) in [(a, b), (b, a)] {
            lp.add_constraint(
                ScheduleRule::Divisional,
                format!("divisional[{},{}]", ctx.name(home), ctx.name(away)),
                LinearExpr::sum(ctx.layout.hosting_all_season(home, away)),
                Sense::Eq,
                1.0,
            );
        }
    }
}

pub fn conference_rotation(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    rotation(ctx, lp, OpponentTier::ConferenceRotation, ScheduleRule::ConferenceRotation);
}

pub fn interconference_rotation(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    rotation(
        ctx,
        lp,
        OpponentTier::InterconferenceRotation,
        ScheduleRule::InterconferenceRotation,
    );
}

/// One meeting per opponent in the tier, plus per-team home and away quotas.
fn rotation(ctx: &RuleContext<'_>, lp: &mut LinearProgram, tier: OpponentTier, rule: ScheduleRule) {
    for (a, b) in ctx.tier_pairs(tier) {
        lp.add_constraint(
            rule,
            format!("{}_meeting[{}]", rule.name(), ctx.pair_label(a, b)),
            LinearExpr::sum(ctx.layout.meetings_all_season(a, b)),
            Sense::Eq,
            1.0,
        );
    }
    tier_venue_quotas(ctx, lp, tier, rule);
}

/// Per team: `Σ hosted == quota` and `Σ visited == quota` over a tier.
fn tier_venue_quotas(ctx: &RuleContext<'_>, lp: &mut LinearProgram, tier: OpponentTier, rule: ScheduleRule) {
    let Some(quota) = ctx.topology.tier_games().home_quota(tier) else {
        return;
    };
    for team in ctx.topology.team_ids() {
        let opponents = ctx.topology.buckets(team).opponents(tier);
        if opponents.is_empty() {
            continue;
        }
        let mut home = LinearExpr::new();
        let mut away = LinearExpr::new();
        for &opp in &opponents {
            home.extend(ctx.layout.hosting_all_season(team, opp));
            away.extend(ctx.layout.hosting_all_season(opp, team));
        }
        lp.add_constraint(
            rule,
            format!("{}_home[{}]", rule.name(), ctx.name(team)),
            home,
            Sense::Eq,
            f64::from(quota),
        );
        lp.add_constraint(
            rule,
            format!("{}_away[{}]", rule.name(), ctx.name(team)),
            away,
            Sense::Eq,
            f64::from(quota),
        );
    }
}

/// At most one meeting per opponent and per remaining division, with
/// home and away quotas of half the remaining-division count.
pub fn conference_remainder(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    let rule = ScheduleRule::ConferenceRemainder;
    for (a, b) in ctx.tier_pairs(OpponentTier::ConferenceRemainder) {
        lp.add_constraint(
            rule,
            format!("conference_remainder_meeting[{}]", ctx.pair_label(a, b)),
            LinearExpr::sum(ctx.layout.meetings_all_season(a, b)),
            Sense::Le,
            1.0,
        );
    }
    for team in ctx.topology.team_ids() {
        for &division in &ctx.topology.buckets(team).conference_remainder {
            let mut expr = LinearExpr::new();
            for &opp in &ctx.topology.division(division).teams {
                expr.extend(ctx.layout.meetings_all_season(team, opp));
            }
            lp.add_constraint(
                rule,
                format!(
                    "conference_remainder_division[{},{}]",
                    ctx.name(team),
                    ctx.topology.division(division).name
                ),
                expr,
                Sense::Le,
                1.0,
            );
        }
    }
    tier_venue_quotas(ctx, lp, OpponentTier::ConferenceRemainder, rule);
}

/// Exactly one game against the interconference-extra pool, venue free.
pub fn interconference_extra(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    for team in ctx.topology.team_ids() {
        let pool = &ctx.topology.buckets(team).interconference_extra;
        if pool.is_empty() {
            continue;
        }
        let mut expr = LinearExpr::new();
        for &opp in pool {
            expr.extend(ctx.layout.meetings_all_season(team, opp));
        }
        lp.add_constraint(
            ScheduleRule::InterconferenceExtra,
            format!("interconference_extra[{}]", ctx.name(team)),
            expr,
            Sense::Eq,
            1.0,
        );
    }
}

/// Per pair and week `w < W`: games in `w` plus games in `w + 1` ≤ 1.
pub fn no_immediate_rematch(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    for (a, b) in ctx.pairs() {
        let label = ctx.pair_label(a, b);
        for week in 1..ctx.rules.num_weeks {
            let mut expr = LinearExpr::sum(ctx.layout.meetings_in_week(a, b, week));
            expr.extend(ctx.layout.meetings_in_week(a, b, week + 1));
            lp.add_constraint(
                ScheduleRule::NoImmediateRematch,
                format!("no_immediate_rematch[{label},w{week}]"),
                expr,
                Sense::Le,
                1.0,
            );
        }
    }
}

/// Per team: games in primetime slots ≤ `max_primetime_slots`.
pub fn primetime_cap(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    let primetime = ctx.topology.primetime_slots();
    if primetime.is_empty() {
        return;
    }
    for team in ctx.topology.team_ids() {
        let mut expr = LinearExpr::new();
        for other in ctx.topology.team_ids().filter(|&o| o != team) {
            for week in ctx.weeks() {
                for &slot in &primetime {
                    expr.add(ctx.layout.game(team, other, week, slot), 1.0);
                    expr.add(ctx.layout.game(other, team, week, slot), 1.0);
                }
            }
        }
        lp.add_constraint(
            ScheduleRule::PrimetimeCap,
            format!("primetime_cap[{}]", ctx.name(team)),
            expr,
            Sense::Le,
            f64::from(ctx.rules.max_primetime_slots),
        );
    }
}

/// Per week and capped slot: games `== n` or `<= n`.
pub fn slot_capacity(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    for slot in ctx.topology.slot_ids() {
        let info = ctx.topology.slot(slot);
        let (sense, limit) = match info.capacity {
            SlotCapacity::Unbounded => continue,
            SlotCapacity::Exactly(n) => (Sense::Eq, n),
            SlotCapacity::AtMost(n) => (Sense::Le, n),
        };
        for week in ctx.weeks() {
            let mut expr = LinearExpr::new();
            for home in ctx.topology.team_ids() {
                for away in ctx.topology.team_ids().filter(|&a| a != home) {
                    expr.add(ctx.layout.game(home, away, week, slot), 1.0);
                }
            }
            lp.add_constraint(
                ScheduleRule::SlotCapacity,
                format!("slot_capacity[{},w{}]", info.name, week),
                expr,
                sense,
                f64::from(limit),
            );
        }
    }
}

/// The host is home in week 1's first slot exactly once; nobody else hosts there.
pub fn opening_game(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    let Some(host) = ctx.opening_host else {
        return;
    };
    let first = ctx.topology.first_slot();

    let mut hosted = LinearExpr::new();
    let mut others = LinearExpr::new();
    for home in ctx.topology.team_ids() {
        for away in ctx.topology.team_ids().filter(|&a| a != home) {
            let var = ctx.layout.game(home, away, 1, first);
            if home == host {
                hosted.add(var, 1.0);
            } else {
                others.add(var, 1.0);
            }
        }
    }
    lp.add_constraint(
        ScheduleRule::OpeningGame,
        format!("opening_game[{}]", ctx.name(host)),
        hosted,
        Sense::Eq,
        1.0,
    );
    lp.add_constraint(
        ScheduleRule::OpeningGame,
        format!("opening_game_exclusive[{}]", ctx.name(host)),
        others,
        Sense::Eq,
        0.0,
    );
}

/// Per team `Σ b == byes_per_team` over the window; closed weeks have no byes.
pub fn bye_count(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    for team in ctx.topology.team_ids() {
        let expr = LinearExpr::sum(
            ctx.weeks()
                .filter(|&w| ctx.bye_open(w))
                .map(|w| ctx.layout.bye(team, w)),
        );
        lp.add_constraint(
            ScheduleRule::ByeCount,
            format!("bye_count[{}]", ctx.name(team)),
            expr,
            Sense::Eq,
            f64::from(ctx.rules.byes_per_team),
        );
    }
    for week in ctx.weeks().filter(|&w| !ctx.bye_open(w)) {
        lp.add_constraint(
            ScheduleRule::ByeCount,
            format!("bye_closed[w{week}]"),
            LinearExpr::sum(ctx.topology.team_ids().map(|t| ctx.layout.bye(t, week))),
            Sense::Eq,
            0.0,
        );
    }
}

/// Per open week: byes within `[floor(k), ceil(k)]`.
pub fn bye_distribution(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    if ctx.rules.byes_per_team == 0 {
        return;
    }
    let Some((low, high)) = ctx.rules.bye_distribution_bounds(ctx.topology.team_count()) else {
        return;
    };
    for week in ctx.weeks().filter(|&w| ctx.bye_open(w)) {
        let byes = || LinearExpr::sum(ctx.topology.team_ids().map(|t| ctx.layout.bye(t, week)));
        if low == high {
            lp.add_constraint(
                ScheduleRule::ByeDistribution,
                format!("bye_distribution[w{week}]"),
                byes(),
                Sense::Eq,
                f64::from(low),
            );
        } else {
            lp.add_constraint(
                ScheduleRule::ByeDistribution,
                format!("bye_distribution_min[w{week}]"),
                byes(),
                Sense::Ge,
                f64::from(low),
            );
            lp.add_constraint(
                ScheduleRule::ByeDistribution,
                format!("bye_distribution_max[w{week}]"),
                byes(),
                Sense::Le,
                f64::from(high),
            );
        }
    }
}

/// Per team and week: home games + away games + bye == 1.
pub fn occupancy(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    for team in ctx.topology.team_ids() {
        for week in ctx.weeks() {
            let mut expr = ctx.games_in_week(team, week);
            expr.add(ctx.layout.bye(team, week), 1.0);
            lp.add_constraint(
                ScheduleRule::Occupancy,
                format!("occupancy[{},w{}]", ctx.name(team), week),
                expr,
                Sense::Eq,
                1.0,
            );
        }
    }
}
