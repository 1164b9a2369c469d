//! Outcome Classification
//!
//! Maps what the invoker observed about one oracle run into a typed
//! outcome, and defines the per-strategy result that ends up in the report.
//!
//! ```text
//! RawResult ──classify──▶ Outcome ──strategy policy──▶ SweepResult
//! ```

use crate::bound::{Bound, BoundArg};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Substring the oracle prints on success
pub const SUCCESS_MARKER: &str = "OK";
/// Substring the oracle prints on failure
pub const FAILURE_MARKER: &str = "FAIL";

/// Why an invocation terminated abnormally
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("failed to spawn oracle: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("oracle terminated by signal {0}")]
    Signaled(i32),

    #[error("I/O error while supervising oracle: {0}")]
    Io(#[source] std::io::Error),
}

/// What the invoker observed for a single oracle run
#[derive(Debug)]
pub enum RawResult {
    /// Process exited on its own; captured stdout
    Completed(String),
    /// Wall-clock deadline passed, process was killed
    TimedOut,
    /// Any other abnormal termination
    Failed(FailureReason),
}

/// Typed outcome of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Verified(BoundArg),
    Refuted(BoundArg),
    TimedOut,
    ResourceExhausted,
}

impl Outcome {
    /// Whether the oracle produced a verdict
    pub fn is_verdict(self) -> bool {
        matches!(self, Outcome::Verified(_) | Outcome::Refuted(_))
    }
}

/// Classify a raw invocation result.
///
/// A failure without a timeout is assumed to be the memory ceiling killing
/// the oracle. That collapses crashes and a missing binary into the same
/// bucket, so the reason is logged before it is dropped.
pub fn classify(raw: &RawResult, arg: BoundArg) -> Outcome {
    match raw {
        RawResult::TimedOut => Outcome::TimedOut,
        RawResult::Failed(reason) => {
            tracing::warn!(%arg, "oracle failed: {}", reason);
            Outcome::ResourceExhausted
        }
        RawResult::Completed(stdout) => {
            if stdout.contains(SUCCESS_MARKER) {
                Outcome::Verified(arg)
            } else if stdout.contains(FAILURE_MARKER) {
                Outcome::Refuted(arg)
            } else {
                Outcome::ResourceExhausted
            }
        }
    }
}

/// Terminal result of one strategy for one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "bound", rename_all = "snake_case")]
pub enum SweepResult {
    /// Verdict `OK`, with the bound it was reached at (none for single-shot)
    Verified(Option<Bound>),
    /// Verdict `FAIL`, with the bound it was reached at (none for single-shot)
    Refuted(Option<Bound>),
    TimedOut,
    ResourceExhausted,
    /// Escalation ran out of bounds; timeout and memory are not told apart
    Exhausted,
}

impl SweepResult {
    /// Short label used in the session report
    pub fn label(&self) -> String {
        match self {
            SweepResult::Verified(Some(b)) => format!("OK ({})", b),
            SweepResult::Verified(None) => "OK".to_string(),
            SweepResult::Refuted(Some(b)) => format!("FAIL ({})", b),
            SweepResult::Refuted(None) => "FAIL".to_string(),
            SweepResult::TimedOut => "OUT OF TIME".to_string(),
            SweepResult::ResourceExhausted => "OUT OF MEMORY".to_string(),
            SweepResult::Exhausted => "OUT OF RESOURCES/TIME".to_string(),
        }
    }

    pub fn is_verdict(&self) -> bool {
        matches!(self, SweepResult::Verified(_) | SweepResult::Refuted(_))
    }
}

impl fmt::Display for SweepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
