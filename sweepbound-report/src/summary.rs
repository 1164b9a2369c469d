//! Run Summary Data Structures

use chrono::{DateTime, Utc};
use serde::Serialize;
use sweepbound_core::{
    BoundSequence, ImcMode, InstanceRecord, ResourceBudget, StrategyRun, SweepPlan, SweepResult,
};

/// Complete machine-readable summary of a session
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub meta: SummaryMeta,
    pub results: Vec<InstanceSummary>,
    pub totals: SummaryTotals,
}

/// Run configuration and provenance
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMeta {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub budget: ResourceBudget,
    pub bmc_bounds: BoundSequence,
    pub imc_inner_bounds: BoundSequence,
    pub imc_mode: ImcMode,
    pub total_duration_ms: f64,
}

/// One instance as it appears in the summary
#[derive(Debug, Clone, Serialize)]
pub struct InstanceSummary {
    pub instance: String,
    pub bmc: StrategySummary,
    pub imc: StrategySummary,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub label: String,
    pub result: SweepResult,
    pub invocations: u32,
}

impl From<&StrategyRun> for StrategySummary {
    fn from(run: &StrategyRun) -> Self {
        Self {
            label: run.result.label(),
            result: run.result,
            invocations: run.invocations,
        }
    }
}

/// Outcome counts per strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StrategyTotals {
    pub verified: usize,
    pub refuted: usize,
    pub timed_out: usize,
    pub out_of_memory: usize,
    pub exhausted: usize,
}

impl StrategyTotals {
    fn add(&mut self, result: &SweepResult) {
        match result {
            SweepResult::Verified(_) => self.verified += 1,
            SweepResult::Refuted(_) => self.refuted += 1,
            SweepResult::TimedOut => self.timed_out += 1,
            SweepResult::ResourceExhausted => self.out_of_memory += 1,
            SweepResult::Exhausted => self.exhausted += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryTotals {
    pub instances: usize,
    pub bmc: StrategyTotals,
    pub imc: StrategyTotals,
    /// Instances where the two strategies reached opposite verdicts
    pub disagreements: usize,
}

fn disagree(bmc: &SweepResult, imc: &SweepResult) -> bool {
    matches!(
        (bmc, imc),
        (SweepResult::Verified(_), SweepResult::Refuted(_))
            | (SweepResult::Refuted(_), SweepResult::Verified(_))
    )
}

/// Assemble a summary from the records of a finished session
pub fn build_summary(
    records: &[InstanceRecord],
    plan: &SweepPlan,
    budget: &ResourceBudget,
    total_duration_ms: f64,
) -> SweepSummary {
    let mut totals = SummaryTotals {
        instances: records.len(),
        ..SummaryTotals::default()
    };

    let results = records
        .iter()
        .map(|record| {
            totals.bmc.add(&record.bmc.result);
            totals.imc.add(&record.imc.result);
            if disagree(&record.bmc.result, &record.imc.result) {
                totals.disagreements += 1;
            }
            InstanceSummary {
                instance: record.instance.name.clone(),
                bmc: StrategySummary::from(&record.bmc),
                imc: StrategySummary::from(&record.imc),
                elapsed_ms: record.elapsed.as_secs_f64() * 1000.0,
            }
        })
        .collect();

    SweepSummary {
        meta: SummaryMeta {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            budget: *budget,
            bmc_bounds: plan.bmc_bounds.clone(),
            imc_inner_bounds: plan.imc_inner_bounds.clone(),
            imc_mode: plan.imc_mode,
            total_duration_ms,
        },
        results,
        totals,
    }
}
