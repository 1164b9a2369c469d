//! Sweepbound Core - Bounded Sweep Logic
//!
//! This crate holds everything that makes decisions during a sweep:
//! - Bounds, bound sequences and the resource budget
//! - The outcome classifier that turns oracle output into typed outcomes
//! - BMC and IMC sweep strategies with their stopping policies
//! - The executor that runs both strategies for one instance
//!
//! Launching the oracle is delegated through the [`Oracle`] trait.

mod bound;
mod error;
mod executor;
mod oracle;
mod outcome;
mod strategy;

pub use bound::{Bound, BoundArg, BoundSequence, ResourceBudget, UNBOUNDED_SENTINEL};
pub use error::ConfigError;
pub use executor::{Instance, InstanceRecord, SweepExecutor, SweepPlan};
pub use oracle::Oracle;
pub use outcome::{
    FAILURE_MARKER, FailureReason, Outcome, RawResult, SUCCESS_MARKER, SweepResult, classify,
};
pub use strategy::{ImcMode, StrategyRun, bmc_sweep, imc_escalating, imc_single_shot};
