//! # Sweepbound
//!
//! Resource-bounded verification sweeps over a corpus of model checking
//! instances.
//!
//! For every instance, an external oracle is run under a hard wall-clock
//! deadline and a memory ceiling:
//! - **BMC**: escalating depths; stops on the first refutation or the
//!   first unresolved run, otherwise reports success at the deepest bound
//! - **IMC**: one unbounded call, or an escalating walk over inner bounds
//!   that stops on the first verdict
//!
//! Results land in an append-only session report, one entry per instance.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sweepbound::prelude::*;
//!
//! let plan = SweepPlan::new(
//!     BoundSequence::from_values(&[5, 10])?,
//!     BoundSequence::from_values(&[-1])?,
//!     ImcMode::SingleShot,
//! )?;
//! let budget = ResourceBudget::new(Duration::from_secs(300), 20_000)?;
//! let oracle = ProcessOracle::new(
//!     OracleCommand::new("./modelchecker"),
//!     budget,
//!     MemoryEnforcement::SystemdScope,
//! );
//! let mut executor = SweepExecutor::new(plan, oracle);
//! let record = executor.run_instance(&Instance::from_path("counter.aag"));
//! println!("{}", record.summary_line());
//! ```

// Re-export core types
pub use sweepbound_core::{
    Bound, BoundArg, BoundSequence, ConfigError, FailureReason, ImcMode, Instance, InstanceRecord,
    Oracle, Outcome, RawResult, ResourceBudget, StrategyRun, SweepExecutor, SweepPlan,
    SweepResult, bmc_sweep, classify, imc_escalating, imc_single_shot,
};

// Re-export process supervision
pub use sweepbound_exec::{MemoryEnforcement, OracleCommand, ProcessOracle};

// Re-export reporting
pub use sweepbound_report::{
    ReportError, SessionHeader, SessionReport, SweepSummary, build_summary, write_json_summary,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BoundSequence, ImcMode, Instance, MemoryEnforcement, OracleCommand, ProcessOracle,
        ResourceBudget, SweepExecutor, SweepPlan, SweepResult,
    };
    pub use std::time::Duration;
}

/// Run the Sweepbound CLI harness.
pub use sweepbound_cli::{Cli, SessionConfig, SweepConfig, list_instances, run, run_session};
