//! Season scheduling pipeline and KPI evaluation.
//!
//! `SeasonScheduler` chains topology derivation, model building, solving,
//! extraction, and auditing into one call. `SeasonKpi` reports how evenly
//! strength of schedule, venues, and primetime exposure are spread.
//!
//! # References
//!
//! - Nemhauser & Trick (1998), "Scheduling a Major College Basketball Conference"
//! - Kendall et al. (2010), "Scheduling in sports: An annotated bibliography"

mod kpi;
mod season;

pub use kpi::{SeasonKpi, TeamKpi};
pub use season::{SeasonOutcome, SeasonScheduler};
