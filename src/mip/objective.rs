//! Strength-of-schedule balance.
//!
//! Minimizes the largest absolute deviation of any team's strength of
//! schedule from the league mean:
//!
//! ```text
//! sos[t]  = Σ_o rating[o] · meetings(t, o)
//! mean    = (1/T) Σ_t sos[t]
//! d      >= sos[t] - mean
//! d      >= mean - sos[t]
//! minimize d
//! ```

use crate::lp::{LinearExpr, LinearProgram, Sense};
use crate::models::ScheduleRule;

use super::rules::RuleContext;

/// Emits the balance rows and sets the objective to `max_deviation`.
pub fn balance(ctx: &RuleContext<'_>, lp: &mut LinearProgram) {
    let layout = ctx.layout;
    let topology = ctx.topology;

    for team in topology.team_ids() {
        let mut expr = LinearExpr::new().with(layout.sos(team), 1.0);
        for opp in topology.team_ids().filter(|&o| o != team) {
            let rating = topology.team(opp).rating;
            for var in layout.meetings_all_season(team, opp) {
                expr.add(var, -rating);
            }
        }
        lp.add_constraint(
            ScheduleRule::Balance,
            format!("sos_definition[{}]", topology.team(team).name),
            expr,
            Sense::Eq,
            0.0,
        );
    }

    let share = 1.0 / topology.team_count() as f64;
    let mut mean = LinearExpr::new().with(layout.sos_mean(), 1.0);
    for team in topology.team_ids() {
        mean.add(layout.sos(team), -share);
    }
    lp.add_constraint(ScheduleRule::Balance, "sos_mean_definition", mean, Sense::Eq, 0.0);

    for team in topology.team_ids() {
        let name = &topology.team(team).name;
        lp.add_constraint(
            ScheduleRule::Balance,
            format!("deviation_upper[{name}]"),
            LinearExpr::new()
                .with(layout.max_deviation(), 1.0)
                .with(layout.sos(team), -1.0)
                .with(layout.sos_mean(), 1.0),
            Sense::Ge,
            0.0,
        );
        lp.add_constraint(
            ScheduleRule::Balance,
            format!("deviation_lower[{name}]"),
            LinearExpr::new()
                .with(layout.max_deviation(), 1.0)
                .with(layout.sos(team), 1.0)
                .with(layout.sos_mean(), -1.0),
            Sense::Ge,
            0.0,
        );
    }

    lp.set_objective(LinearExpr::sum([layout.max_deviation()]));
}
