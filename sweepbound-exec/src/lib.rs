//! Sweepbound Exec - Oracle Process Supervision
//!
//! Runs the external verification oracle under a [`ResourceBudget`]:
//! - Hard wall-clock deadline, counted from before the spawn
//! - Memory ceiling through `RLIMIT_AS` or a `systemd-run` scope
//! - Whole-process-group termination (SIGTERM, grace, SIGKILL)
//! - Bounded stdout capture and guaranteed reaping
//!
//! [`ResourceBudget`]: sweepbound_core::ResourceBudget

mod invoker;
mod sys;

pub use invoker::{
    DEFAULT_GRACE_PERIOD, MAX_CAPTURE_BYTES, MemoryEnforcement, OracleCommand, ProcessOracle,
};
