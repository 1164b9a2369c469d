//! JSON Output

use crate::session::ReportError;
use crate::summary::SweepSummary;
use std::path::Path;

/// Generate a prettified JSON summary.
pub fn generate_json_summary(summary: &SweepSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

/// Write the JSON summary to `path`, replacing any previous file.
pub fn write_json_summary(summary: &SweepSummary, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let json = generate_json_summary(summary)?;
    std::fs::write(path.as_ref(), json)?;
    Ok(())
}
