//! League season scheduling for the U-Engine ecosystem.
//!
//! Turns a league description (conferences, divisions, regions, broadcast
//! slots, season rules) into a mixed-integer program, hands it to a MIP
//! engine, and decodes the answer into a team × week schedule.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `LeagueConfig`, `TimeSlot`, `ScheduleRule`,
//!   `SeasonSchedule`, `Violation`
//! - **`validation`**: Input integrity checks (duplicate names, region
//!   coverage, bye window, opening host)
//! - **`topology`**: Derived league relationships and opponent tiers
//! - **`lp`**: Solver-neutral linear programs and the `MipSolver` interface
//! - **`mip`**: Season formulation, one constraint generator per rule
//! - **`extract`**: Solved values → `SeasonSchedule`
//! - **`audit`**: Independent rule check of a finished schedule
//! - **`scheduler`**: End-to-end pipeline and KPIs
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use u_league::models::LeagueConfig;
//! use u_league::scheduler::SeasonScheduler;
//!
//! let config = LeagueConfig::standard();
//! let outcome = SeasonScheduler::new()
//!     .with_time_limit(Duration::from_secs(600))
//!     .run(&config)?;
//! println!("{} (max SOS deviation {:?})", outcome.status, outcome.objective);
//! # Ok::<(), u_league::ScheduleError>(())
//! ```
//!
//! # References
//!
//! - Nemhauser & Trick (1998), "Scheduling a Major College Basketball Conference"
//! - Rasmussen & Trick (2008), "Round robin scheduling – a survey"

pub mod audit;
pub mod error;
pub mod extract;
pub mod lp;
pub mod mip;
pub mod models;
pub mod scheduler;
pub mod topology;
pub mod validation;

pub use error::{Result, ScheduleError};
