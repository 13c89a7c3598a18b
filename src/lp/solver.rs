//! Solver interface.

use std::fmt;
use std::time::Duration;

use super::{LinearProgram, VariableValues};

/// Outcome class reported by a MIP engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible, but the time budget ran out before optimality was proven.
    FeasibleTimedOut,
    /// The time budget ran out before any feasible assignment was found.
    TimedOut,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective has no lower bound.
    Unbounded,
    /// The engine failed.
    Error,
}

impl SolveStatus {
    /// Whether the outcome carries a usable assignment.
    pub fn has_solution(&self) -> bool {
        matches!(self, Self::Optimal | Self::FeasibleTimedOut)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Optimal => "optimal",
            Self::FeasibleTimedOut => "feasible (time limit)",
            Self::TimedOut => "time limit (no solution)",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Options passed to a solve call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveOptions {
    /// Wall-clock budget; `None` = run to optimality.
    pub time_limit: Option<Duration>,
    /// Let the engine print its own progress.
    pub verbose: bool,
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Enables engine output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Result of one solve call.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    /// One value per variable, present when `status.has_solution()`.
    pub values: Option<VariableValues>,
    /// Objective at `values`.
    pub objective: Option<f64>,
    /// Engine message for non-solution statuses.
    pub message: Option<String>,
    /// Wall-clock time spent in the engine.
    pub elapsed: Duration,
}

impl SolverOutcome {
    /// A solved outcome; the objective is evaluated from `values`.
    pub fn solved(
        program: &LinearProgram,
        status: SolveStatus,
        values: VariableValues,
        elapsed: Duration,
    ) -> Self {
        let objective = program.objective_value(&values);
        Self {
            status,
            values: Some(values),
            objective: Some(objective),
            message: None,
            elapsed,
        }
    }

    /// An outcome without an assignment.
    pub fn unsolved(status: SolveStatus, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status,
            values: None,
            objective: None,
            message: Some(message.into()),
            elapsed,
        }
    }
}

/// A mixed-integer engine able to minimize a [`LinearProgram`].
///
/// Implementations block until the engine returns. Statuses other than
/// `Error` are normal outcomes and must not be turned into panics.
pub trait MipSolver {
    /// Engine name, used in logs and errors.
    fn name(&self) -> &str;

    /// Minimizes the program's objective.
    fn solve(&self, program: &LinearProgram, options: &SolveOptions) -> SolverOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::{LinearExpr, VarKind};

    #[test]
    fn test_status_has_solution() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::FeasibleTimedOut.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::TimedOut.has_solution());
        assert!(!SolveStatus::Error.has_solution());
        assert_eq!(SolveStatus::FeasibleTimedOut.to_string(), "feasible (time limit)");
    }

    #[test]
    fn test_solved_outcome_evaluates_objective() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", VarKind::NON_NEGATIVE);
        lp.set_objective(LinearExpr::new().with(x, 3.0));

        let outcome = SolverOutcome::solved(
            &lp,
            SolveStatus::Optimal,
            VariableValues::from_vec(vec![2.0]),
            Duration::from_millis(5),
        );
        assert_eq!(outcome.objective, Some(6.0));
        assert!(outcome.message.is_none());
    }

    #[test]
    fn test_options_builder() {
        let options = SolveOptions::new()
            .with_time_limit(Duration::from_secs(30))
            .with_verbose(true);
        assert_eq!(options.time_limit, Some(Duration::from_secs(30)));
        assert!(options.verbose);
    }
}
