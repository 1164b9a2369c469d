//! Session Report Writer
//!
//! Append-only text log of a run:
//!
//! ```text
//! Timeout: 300s, Maximum resident set: 20000M
//! BMC: k = [5] | IMC: inner bound = [-1]
//! a.inst
//! OK (5) | FAIL
//! ```
//!
//! The sink is truncated when the report is created and flushed after every
//! instance, so an interrupted run leaves a valid partial report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use sweepbound_core::{BoundSequence, InstanceRecord, ResourceBudget};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration recorded in the report preamble
#[derive(Debug, Clone)]
pub struct SessionHeader {
    pub budget: ResourceBudget,
    pub bmc_bounds: BoundSequence,
    pub imc_inner_bounds: BoundSequence,
}

impl SessionHeader {
    /// The two preamble lines, without trailing newline
    pub fn lines(&self) -> [String; 2] {
        [
            format!(
                "Timeout: {}s, Maximum resident set: {}M",
                self.budget.timeout.as_secs_f64(),
                self.budget.memory_max_mb
            ),
            format!(
                "BMC: k = {} | IMC: inner bound = {}",
                self.bmc_bounds, self.imc_inner_bounds
            ),
        ]
    }
}

/// Append-only session log
pub struct SessionReport<W: Write> {
    sink: W,
    entries: usize,
}

impl SessionReport<BufWriter<File>> {
    /// Truncate (or create) `path` and write the header
    pub fn create(path: impl AsRef<Path>, header: &SessionHeader) -> Result<Self, ReportError> {
        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> SessionReport<W> {
    /// Start a report on an arbitrary sink
    pub fn new(mut sink: W, header: &SessionHeader) -> Result<Self, ReportError> {
        for line in header.lines() {
            writeln!(sink, "{}", line)?;
        }
        sink.flush()?;
        Ok(Self { sink, entries: 0 })
    }

    /// Append one instance (name line, then summary line) and flush
    pub fn append(&mut self, record: &InstanceRecord) -> Result<(), ReportError> {
        writeln!(self.sink, "{}", record.instance.name)?;
        writeln!(self.sink, "{}", record.summary_line())?;
        self.sink.flush()?;
        self.entries += 1;
        Ok(())
    }

    /// Number of instances written so far
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use sweepbound_core::{Bound, Instance, StrategyRun, SweepResult};

    fn header() -> SessionHeader {
        SessionHeader {
            budget: ResourceBudget::new(Duration::from_secs(300), 20000).unwrap(),
            bmc_bounds: BoundSequence::from_values(&[5]).unwrap(),
            imc_inner_bounds: BoundSequence::from_values(&[-1]).unwrap(),
        }
    }

    fn record(name: &str, bmc: SweepResult, imc: SweepResult) -> InstanceRecord {
        InstanceRecord {
            instance: Instance::from_path(name),
            bmc: StrategyRun {
                result: bmc,
                invocations: 1,
            },
            imc: StrategyRun {
                result: imc,
                invocations: 1,
            },
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_header_format() {
        let [first, second] = header().lines();
        assert_eq!(first, "Timeout: 300s, Maximum resident set: 20000M");
        assert_eq!(second, "BMC: k = [5] | IMC: inner bound = [-1]");
    }

    #[test]
    fn test_fractional_timeout() {
        let mut h = header();
        h.budget = ResourceBudget::new(Duration::from_millis(1500), 1).unwrap();
        assert!(h.lines()[0].starts_with("Timeout: 1.5s"));
    }

    #[test]
    fn test_append_entries() {
        let mut report = SessionReport::new(Vec::new(), &header()).unwrap();
        report
            .append(&record(
                "a.inst",
                SweepResult::Verified(Some(Bound::Depth(5))),
                SweepResult::Refuted(None),
            ))
            .unwrap();
        report
            .append(&record("b.inst", SweepResult::TimedOut, SweepResult::ResourceExhausted))
            .unwrap();
        assert_eq!(report.entries(), 2);

        let text = String::from_utf8(report.into_inner()).unwrap();
        assert_eq!(
            text,
            "Timeout: 300s, Maximum resident set: 20000M\n\
             BMC: k = [5] | IMC: inner bound = [-1]\n\
             a.inst\n\
             OK (5) | FAIL\n\
             b.inst\n\
             OUT OF TIME | OUT OF MEMORY\n"
        );
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs");

        let mut first = SessionReport::create(&path, &header()).unwrap();
        first
            .append(&record("old.inst", SweepResult::TimedOut, SweepResult::TimedOut))
            .unwrap();
        drop(first);

        let second = SessionReport::create(&path, &header()).unwrap();
        drop(second);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.contains("old.inst"));
    }

    #[test]
    fn test_entries_are_flushed_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs");

        let mut report = SessionReport::create(&path, &header()).unwrap();
        report
            .append(&record("a.inst", SweepResult::Exhausted, SweepResult::Verified(None)))
            .unwrap();

        // Still open: the entry must already be on disk.
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("a.inst\nOUT OF RESOURCES/TIME | OK\n"));
    }
}
