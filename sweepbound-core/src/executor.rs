//! Sweep Executor
//!
//! Runs both strategies for one instance, BMC first, then IMC.

use crate::bound::BoundSequence;
use crate::error::ConfigError;
use crate::oracle::Oracle;
use crate::strategy::{ImcMode, StrategyRun, bmc_sweep, imc_escalating, imc_single_shot};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// One input file of the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// File name; the instance identity
    pub name: String,
    /// Full path handed to the oracle
    pub path: PathBuf,
}

impl Instance {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Build from a path, using its file name as identity
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(name, path)
    }
}

/// Immutable bound configuration for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepPlan {
    /// BMC depths, ascending by convention
    pub bmc_bounds: BoundSequence,
    /// IMC inner bounds; only the escalating mode walks them
    pub imc_inner_bounds: BoundSequence,
    pub imc_mode: ImcMode,
}

impl SweepPlan {
    pub fn new(
        bmc_bounds: BoundSequence,
        imc_inner_bounds: BoundSequence,
        imc_mode: ImcMode,
    ) -> Result<Self, ConfigError> {
        // Re-validate so a plan can never carry the sentinel as a BMC depth.
        let bmc_bounds = BoundSequence::depths(bmc_bounds.as_slice().to_vec())?;
        Ok(Self {
            bmc_bounds,
            imc_inner_bounds,
            imc_mode,
        })
    }
}

/// Both strategy results for one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub instance: Instance,
    pub bmc: StrategyRun,
    pub imc: StrategyRun,
    pub elapsed: Duration,
}

impl InstanceRecord {
    /// `"<bmc> | <imc>"` summary line
    pub fn summary_line(&self) -> String {
        format!("{} | {}", self.bmc.result.label(), self.imc.result.label())
    }
}

/// Drives the strategies for each instance against an oracle
pub struct SweepExecutor<O> {
    plan: SweepPlan,
    oracle: O,
}

impl<O: Oracle> SweepExecutor<O> {
    pub fn new(plan: SweepPlan, oracle: O) -> Self {
        Self { plan, oracle }
    }

    pub fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Consume the executor and hand the oracle back
    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Run BMC then IMC on a single instance. Never fails: every
    /// unresolved invocation becomes a labelled outcome.
    pub fn run_instance(&mut self, instance: &Instance) -> InstanceRecord {
        let start = Instant::now();
        info!(instance = %instance.name, "running");

        let bmc = bmc_sweep(&mut self.oracle, &instance.path, &self.plan.bmc_bounds);
        let imc = match self.plan.imc_mode {
            ImcMode::SingleShot => imc_single_shot(&mut self.oracle, &instance.path),
            ImcMode::Escalating => {
                imc_escalating(&mut self.oracle, &instance.path, &self.plan.imc_inner_bounds)
            }
        };

        let record = InstanceRecord {
            instance: instance.clone(),
            bmc,
            imc,
            elapsed: start.elapsed(),
        };
        info!(
            instance = %instance.name,
            bmc = %record.bmc.result,
            imc = %record.imc.result,
            elapsed_ms = record.elapsed.as_millis() as u64,
            "finished"
        );
        record
    }
}
