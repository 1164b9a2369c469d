//! Configuration errors
//!
//! All of these are fatal at startup: they are raised before the first
//! instance is processed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Bound sequence must not be empty")]
    EmptyBoundSequence,

    #[error("Invalid bound '{0}': expected a non-negative integer or -1")]
    InvalidBound(String),

    #[error("BMC bound sequence may not contain -1; use concrete depths")]
    UnboundedBmcDepth,

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Timeout of {0:?} is too large to schedule")]
    TimeoutTooLarge(std::time::Duration),

    #[error("Memory ceiling must be greater than zero")]
    ZeroMemoryCeiling,

    #[error("Invalid duration '{0}'")]
    InvalidDuration(String),

    #[error("Invalid instance filter: {0}")]
    InvalidFilter(String),

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
