//! `good_lp` backend.
//!
//! Translates a [`LinearProgram`] into `good_lp` variables and constraints
//! and hands it to one of the engines compiled into `good_lp`:
//!
//! | Engine | Cargo feature |
//! |--------|---------------|
//! | microlp (pure Rust) | always |
//! | HiGHS | `highs` |
//!
//! Both engines stop at `SolveOptions::time_limit`. Whether the returned
//! assignment is proven optimal is read from the engine's solution status.

use std::time::{Duration, Instant};

use good_lp::solvers::{SolutionStatus, WithTimeLimit};
use good_lp::{
    constraint, variable, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use log::debug;

use super::{
    LinearConstraint, LinearExpr, LinearProgram, MipSolver, Sense, SolveOptions, SolveStatus,
    SolverOutcome, VarKind, VariableValues,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
    Microlp,
    #[cfg(feature = "highs")]
    Highs,
}

/// A [`MipSolver`] backed by `good_lp`.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use u_league::lp::{GoodLpSolver, MipSolver, SolveOptions};
/// # let program = u_league::lp::LinearProgram::new();
/// let solver = GoodLpSolver::microlp();
/// let options = SolveOptions::new().with_time_limit(Duration::from_secs(30));
/// let outcome = solver.solve(&program, &options);
/// println!("{}", outcome.status);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoodLpSolver {
    engine: Engine,
}

impl GoodLpSolver {
    /// The pure-Rust microlp engine. Small leagues only.
    pub fn microlp() -> Self {
        Self {
            engine: Engine::Microlp,
        }
    }

    /// The HiGHS engine.
    #[cfg(feature = "highs")]
    pub fn highs() -> Self {
        Self {
            engine: Engine::Highs,
        }
    }

    /// Whether the engine stops at `SolveOptions::time_limit`. Every
    /// compiled-in engine does.
    pub fn honors_time_limit(&self) -> bool {
        true
    }
}

impl Default for GoodLpSolver {
    /// HiGHS when compiled in, microlp otherwise.
    fn default() -> Self {
        #[cfg(feature = "highs")]
        {
            Self::highs()
        }
        #[cfg(not(feature = "highs"))]
        {
            Self::microlp()
        }
    }
}

impl MipSolver for GoodLpSolver {
    fn name(&self) -> &str {
        match self.engine {
            Engine::Microlp => "microlp",
            #[cfg(feature = "highs")]
            Engine::Highs => "highs",
        }
    }

    fn solve(&self, program: &LinearProgram, options: &SolveOptions) -> SolverOutcome {
        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = program
            .variables()
            .iter()
            .map(|decl| {
                let definition = match decl.kind {
                    VarKind::Binary => variable().binary(),
                    VarKind::Continuous { lower, upper } => {
                        let mut def = variable();
                        if let Some(l) = lower {
                            def = def.min(l);
                        }
                        if let Some(u) = upper {
                            def = def.max(u);
                        }
                        def
                    }
                };
                vars.add(definition.name(decl.name.clone()))
            })
            .collect();

        let objective = to_expression(program.objective(), &handles);
        let constraints: Vec<Constraint> = program
            .constraints()
            .iter()
            .map(|c| to_constraint(c, &handles))
            .collect();
        debug!(
            "{}: translated {} variables and {} constraints",
            self.name(),
            handles.len(),
            constraints.len()
        );

        let problem = vars.minimise(objective);
        let start = Instant::now();
        let result = match self.engine {
            Engine::Microlp => run(
                problem.using(good_lp::microlp),
                options.time_limit,
                constraints,
                &handles,
            ),
            #[cfg(feature = "highs")]
            Engine::Highs => run(
                problem.using(good_lp::highs).set_verbose(options.verbose),
                options.time_limit,
                constraints,
                &handles,
            ),
        };
        let elapsed = start.elapsed();

        match result {
            Ok((status, values)) => {
                SolverOutcome::solved(program, status, VariableValues::from_vec(values), elapsed)
            }
            Err(e) => SolverOutcome::unsolved(unsolved_status(&e), e.to_string(), elapsed),
        }
    }
}

/// Adds the rows, applies the time limit, and solves.
fn run<M>(
    mut model: M,
    time_limit: Option<Duration>,
    constraints: Vec<Constraint>,
    handles: &[Variable],
) -> Result<(SolveStatus, Vec<f64>), ResolutionError>
where
    M: SolverModel<Error = ResolutionError> + WithTimeLimit,
{
    if let Some(limit) = time_limit {
        model = model.with_time_limit(limit.as_secs_f64());
    }
    for c in constraints {
        model.add_constraint(c);
    }
    let solution = model.solve()?;
    let status = solved_status(solution.status());
    Ok((status, handles.iter().map(|&v| solution.value(v)).collect()))
}

/// Status of an assignment the engine returned.
fn solved_status(status: SolutionStatus) -> SolveStatus {
    match status {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        // Stopped at the time or gap limit with an incumbent.
        _ => SolveStatus::FeasibleTimedOut,
    }
}

/// Status of a solve that returned no assignment.
fn unsolved_status(error: &ResolutionError) -> SolveStatus {
    match error {
        ResolutionError::Infeasible => SolveStatus::Infeasible,
        ResolutionError::Unbounded => SolveStatus::Unbounded,
        other if other.to_string().to_lowercase().contains("time limit") => SolveStatus::TimedOut,
        _ => SolveStatus::Error,
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(0.0);
    for &(var, coefficient) in expr.terms() {
        out += handles[var.index()] * coefficient;
    }
    out
}

fn to_constraint(c: &LinearConstraint, handles: &[Variable]) -> Constraint {
    let lhs = to_expression(&c.expr, handles);
    let rhs = Expression::from(c.rhs);
    match c.sense {
        Sense::Eq => constraint::eq(lhs, rhs),
        Sense::Le => constraint::leq(lhs, rhs),
        Sense::Ge => constraint::geq(lhs, rhs),
    }
}
