//! Solver-neutral linear programs.
//!
//! A [`LinearProgram`] is a flat list of variable declarations, named
//! linear constraints, and one linear objective to minimize. Any MIP
//! engine can consume it through the [`MipSolver`] trait; the crate ships
//! a `good_lp` backend ([`GoodLpSolver`]).
//!
//! Constraints carry the [`ScheduleRule`] that produced them, so a solved
//! (or hand-written) assignment can be checked rule by rule with
//! [`LinearProgram::violations`].

mod backend;
mod solver;

pub use backend::GoodLpSolver;
pub use solver::{MipSolver, SolveOptions, SolveStatus, SolverOutcome};

use std::fmt;

use crate::models::ScheduleRule;

/// Index of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarKind {
    /// 0 or 1.
    Binary,
    /// Real-valued within optional bounds (`None` = unbounded on that side).
    Continuous {
        lower: Option<f64>,
        upper: Option<f64>,
    },
}

impl VarKind {
    /// A continuous variable with no bounds.
    pub const FREE: VarKind = VarKind::Continuous {
        lower: None,
        upper: None,
    };

    /// A continuous variable bounded below by zero.
    pub const NON_NEGATIVE: VarKind = VarKind::Continuous {
        lower: Some(0.0),
        upper: None,
    };

    /// Whether `value` lies in the domain, within `tolerance`.
    pub fn admits(&self, value: f64, tolerance: f64) -> bool {
        match *self {
            VarKind::Binary => value.abs() <= tolerance || (value - 1.0).abs() <= tolerance,
            VarKind::Continuous { lower, upper } => {
                lower.is_none_or(|l| value >= l - tolerance)
                    && upper.is_none_or(|u| value <= u + tolerance)
            }
        }
    }
}

/// A named variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub kind: VarKind,
}

/// A sum of weighted variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of `vars`, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }

    /// Adds `coefficient * var`.
    pub fn add(&mut self, var: VarId, coefficient: f64) -> &mut Self {
        self.terms.push((var, coefficient));
        self
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, var: VarId, coefficient: f64) -> Self {
        self.terms.push((var, coefficient));
        self
    }

    /// Adds every variable with coefficient 1.
    pub fn extend(&mut self, vars: impl IntoIterator<Item = VarId>) -> &mut Self {
        self.terms.extend(vars.into_iter().map(|v| (v, 1.0)));
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression under `values`.
    pub fn evaluate(&self, values: &VariableValues) -> f64 {
        self.terms.iter().map(|&(v, c)| c * values.value(v)).sum()
    }
}

/// Relation between an expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `expr == rhs`
    Eq,
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::Eq => "==",
            Sense::Le => "<=",
            Sense::Ge => ">=",
        })
    }
}

/// A named linear constraint: `expr (sense) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Unique name, e.g. `divisional_home[Bears,Packers]`.
    pub name: String,
    /// Rule group that emitted this row.
    pub rule: ScheduleRule,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Whether `values` satisfy this row within `tolerance`.
    pub fn is_satisfied(&self, values: &VariableValues, tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Eq => (lhs - self.rhs).abs() <= tolerance,
            Sense::Le => lhs <= self.rhs + tolerance,
            Sense::Ge => lhs >= self.rhs - tolerance,
        }
    }
}

/// A minimization problem over declared variables.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    variables: Vec<VariableDecl>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable and returns its id.
    pub fn add_variable(&mut self, name: impl Into<String>, kind: VarKind) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableDecl {
            name: name.into(),
            kind,
        });
        id
    }

    /// Appends a constraint.
    pub fn add_constraint(
        &mut self,
        rule: ScheduleRule,
        name: impl Into<String>,
        expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            rule,
            expr,
            sense,
            rhs,
        });
    }

    /// Sets the expression to minimize.
    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn variables(&self) -> &[VariableDecl] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &VariableDecl {
        &self.variables[id.index()]
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    #[inline]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of binary variables.
    pub fn binary_count(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.kind == VarKind::Binary)
            .count()
    }

    /// Rows emitted by one rule group.
    pub fn constraints_for(&self, rule: ScheduleRule) -> impl Iterator<Item = &LinearConstraint> {
        self.constraints.iter().filter(move |c| c.rule == rule)
    }

    /// Finds a constraint by name.
    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Rows broken by `values`, in emission order.
    pub fn violations<'a>(
        &'a self,
        values: &VariableValues,
        tolerance: f64,
    ) -> Vec<&'a LinearConstraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, tolerance))
            .collect()
    }

    /// Variables whose value lies outside their domain.
    pub fn domain_violations(&self, values: &VariableValues, tolerance: f64) -> Vec<VarId> {
        self.variables
            .iter()
            .enumerate()
            .filter(|(i, decl)| !decl.kind.admits(values.value(VarId(*i)), tolerance))
            .map(|(i, _)| VarId(i))
            .collect()
    }

    /// Objective value under `values`.
    pub fn objective_value(&self, values: &VariableValues) -> f64 {
        self.objective.evaluate(values)
    }
}

/// One value per declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValues {
    values: Vec<f64>,
}

impl VariableValues {
    /// All-zero values for `count` variables.
    pub fn zeros(count: usize) -> Self {
        Self {
            values: vec![0.0; count],
        }
    }

    pub fn from_vec(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Value of a variable (0 if out of range).
    #[inline]
    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, var: VarId, value: f64) {
        if let Some(slot) = self.values.get_mut(var.index()) {
            *slot = value;
        }
    }

    /// Binary reading of a variable: true above 0.5.
    #[inline]
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
