//! End-to-end season scheduling.
//!
//! # Pipeline
//! 1. Validate the configuration and derive the [`LeagueTopology`]
//! 2. Build the MIP ([`ModelBuilder`])
//! 3. Solve with a [`MipSolver`] under the configured time budget
//! 4. Decode the assignment ([`ScheduleExtractor`])
//! 5. Audit the schedule and compute [`SeasonKpi`]

use log::{info, warn};
use std::time::Duration;

use super::kpi::SeasonKpi;
use crate::audit::audit_schedule;
use crate::error::Result;
use crate::extract::ScheduleExtractor;
use crate::lp::{GoodLpSolver, MipSolver, SolveOptions, SolveStatus};
use crate::mip::ModelBuilder;
use crate::models::{LeagueConfig, ScheduleRule, SeasonSchedule, Violation};
use crate::topology::LeagueTopology;

/// Result of one scheduling run.
#[derive(Debug, Clone)]
pub struct SeasonOutcome {
    /// Solver status, reported as-is.
    pub status: SolveStatus,
    /// Max strength-of-schedule deviation, when solved.
    pub objective: Option<f64>,
    /// The decoded schedule, when solved.
    pub schedule: Option<SeasonSchedule>,
    /// Balance indicators of `schedule`.
    pub kpi: Option<SeasonKpi>,
    /// Audit findings; empty for a correct schedule.
    pub violations: Vec<Violation>,
    /// Time spent in the solver.
    pub elapsed: Duration,
}

impl SeasonOutcome {
    /// Whether a schedule was produced.
    pub fn is_solved(&self) -> bool {
        self.schedule.is_some()
    }

    /// The schedule as a table (header row plus one row per team).
    pub fn table(&self) -> Option<Vec<Vec<String>>> {
        self.schedule.as_ref().map(SeasonSchedule::to_table)
    }
}

/// Runs the full pipeline against one solver.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use u_league::models::LeagueConfig;
/// use u_league::scheduler::SeasonScheduler;
///
/// let outcome = SeasonScheduler::new()
///     .with_time_limit(Duration::from_secs(600))
///     .run(&LeagueConfig::standard())
///     .unwrap();
/// if let Some(table) = outcome.table() {
///     for row in table {
///         println!("{}", row.join(" | "));
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SeasonScheduler<S = GoodLpSolver> {
    solver: S,
    options: SolveOptions,
    disabled: Vec<ScheduleRule>,
}

impl SeasonScheduler<GoodLpSolver> {
    /// A scheduler using the default `good_lp` engine.
    pub fn new() -> Self {
        Self::with_solver(GoodLpSolver::default())
    }
}

impl Default for SeasonScheduler<GoodLpSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MipSolver> SeasonScheduler<S> {
    /// A scheduler using `solver`.
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            options: SolveOptions::default(),
            disabled: Vec::new(),
        }
    }

    /// Sets the wall-clock budget of the solve.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.options.time_limit = Some(limit);
        self
    }

    /// Replaces the solve options.
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Leaves a rule group out of the model.
    pub fn without_rule(mut self, rule: ScheduleRule) -> Self {
        self.disabled.push(rule);
        self
    }

    /// Schedules a season.
    ///
    /// # Errors
    /// - `Configuration` / `ModelConstruction` before any solve
    /// - `Solver` if the engine fails
    /// - `Consistency` if the solved assignment cannot be decoded
    ///
    /// Infeasible and unbounded statuses are not errors: the outcome
    /// carries the status and no schedule.
    pub fn run(&self, config: &LeagueConfig) -> Result<SeasonOutcome> {
        let topology = LeagueTopology::build(config)?;

        let mut builder = ModelBuilder::new(&topology, &config.rules);
        for &rule in &self.disabled {
            builder = builder.without_rule(rule);
        }
        let model = builder.build()?;
        let solved = model.solve(&self.solver, &self.options)?;

        let status = solved.status();
        let elapsed = solved.outcome.elapsed;
        let Some(values) = solved.values() else {
            warn!("No schedule produced: solver status {status}");
            return Ok(SeasonOutcome {
                status,
                objective: None,
                schedule: None,
                kpi: None,
                violations: Vec::new(),
                elapsed,
            });
        };

        let schedule = ScheduleExtractor::for_model(&solved.model).extract(values)?;
        let kpi = SeasonKpi::calculate(&schedule, &topology);
        let violations = audit_schedule(&schedule, &topology, &config.rules);

        info!(
            "Season scheduled: {} ({} teams, max SOS deviation {:.1}, {} violations)",
            status,
            schedule.team_count(),
            kpi.max_deviation,
            violations.len()
        );

        Ok(SeasonOutcome {
            status,
            objective: solved.objective(),
            schedule: Some(schedule),
            kpi: Some(kpi),
            violations,
            elapsed,
        })
    }
}
