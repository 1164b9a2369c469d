//! Sweepbound Report - Session Output
//!
//! Two outputs are produced for a run:
//! - The session report: append-only text, two header lines then two
//!   lines per instance, flushed as each instance finishes
//! - An optional JSON summary (machine-readable) written at the end

mod json;
mod session;
mod summary;

pub use json::{generate_json_summary, write_json_summary};
pub use session::{ReportError, SessionHeader, SessionReport};
pub use summary::{
    InstanceSummary, StrategySummary, StrategyTotals, SummaryMeta, SummaryTotals, SweepSummary,
    build_summary,
};
