//! Bounds, Bound Sequences and the Resource Budget
//!
//! A bound is either a concrete depth or the `-1` sentinel that asks the
//! oracle for its default (unbounded) exploration. Sequences are validated
//! once at startup and are read-only afterwards.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Integer value reserved for "unbounded / default depth".
pub const UNBOUNDED_SENTINEL: i64 = -1;

/// A single verification depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Bound {
    /// Oracle default, written as `-1`
    Unbounded,
    /// Concrete depth
    Depth(u32),
}

impl Bound {
    /// Whether this is the `-1` sentinel
    pub fn is_unbounded(self) -> bool {
        matches!(self, Bound::Unbounded)
    }
}

impl TryFrom<i64> for Bound {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == UNBOUNDED_SENTINEL {
            return Ok(Bound::Unbounded);
        }
        u32::try_from(value)
            .map(Bound::Depth)
            .map_err(|_| ConfigError::InvalidBound(value.to_string()))
    }
}

impl From<Bound> for i64 {
    fn from(bound: Bound) -> Self {
        match bound {
            Bound::Unbounded => UNBOUNDED_SENTINEL,
            Bound::Depth(k) => i64::from(k),
        }
    }
}

impl FromStr for Bound {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBound(s.to_string()))?;
        Bound::try_from(value)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", i64::from(*self))
    }
}

/// Ordered, non-empty list of bounds, evaluated left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BoundSequence(Vec<Bound>);

impl BoundSequence {
    /// Build a sequence; empty input is rejected because the sweep end
    /// state would be undefined.
    pub fn new(bounds: Vec<Bound>) -> Result<Self, ConfigError> {
        if bounds.is_empty() {
            return Err(ConfigError::EmptyBoundSequence);
        }
        Ok(Self(bounds))
    }

    /// Build a BMC depth sequence. `-1` is not a depth for BMC.
    pub fn depths(bounds: Vec<Bound>) -> Result<Self, ConfigError> {
        if bounds.iter().any(|b| b.is_unbounded()) {
            return Err(ConfigError::UnboundedBmcDepth);
        }
        Self::new(bounds)
    }

    /// Parse from raw integers
    pub fn from_values(values: &[i64]) -> Result<Self, ConfigError> {
        let bounds = values
            .iter()
            .map(|&v| Bound::try_from(v))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(bounds)
    }

    /// Parse a comma separated list, e.g. `"1,2,3"` or `"-1"`
    pub fn parse_list(s: &str) -> Result<Self, ConfigError> {
        let bounds = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Bound::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(bounds)
    }

    /// Iterate in configured order
    pub fn iter(&self) -> impl Iterator<Item = Bound> + '_ {
        self.0.iter().copied()
    }

    /// Concrete depths only; sequences built with [`BoundSequence::depths`]
    /// never hold the sentinel.
    pub fn depth_values(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().filter_map(|b| match b {
            Bound::Depth(k) => Some(*k),
            Bound::Unbounded => None,
        })
    }

    /// Final bound of the sequence
    pub fn last(&self) -> Bound {
        // Non-empty by construction.
        self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Bound] {
        &self.0
    }
}

impl fmt::Display for BoundSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, bound) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", bound)?;
        }
        f.write_str("]")
    }
}

/// Argument passed to the oracle for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundArg {
    /// BMC unrolling depth, passed as a positional `k`
    Depth(u32),
    /// IMC inner bound, passed as `-a <n>`
    InnerBound(Bound),
}

impl BoundArg {
    /// Command line arguments for the oracle, placed before the instance path
    pub fn to_args(self) -> Vec<String> {
        match self {
            BoundArg::Depth(k) => vec![k.to_string()],
            BoundArg::InnerBound(bound) => vec!["-a".to_string(), bound.to_string()],
        }
    }

    /// The bound this argument carries
    pub fn bound(self) -> Bound {
        match self {
            BoundArg::Depth(k) => Bound::Depth(k),
            BoundArg::InnerBound(bound) => bound,
        }
    }
}

impl fmt::Display for BoundArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_args().join(" "))
    }
}

/// Wall-clock and memory ceiling applied to every oracle invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceBudget {
    /// Hard deadline per invocation
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Memory ceiling in megabytes
    pub memory_max_mb: u64,
}

impl ResourceBudget {
    pub fn new(timeout: Duration, memory_max_mb: u64) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        // Every invocation computes `now + timeout` as its deadline.
        if Instant::now().checked_add(timeout).is_none() {
            return Err(ConfigError::TimeoutTooLarge(timeout));
        }
        if memory_max_mb == 0 {
            return Err(ConfigError::ZeroMemoryCeiling);
        }
        Ok(Self {
            timeout,
            memory_max_mb,
        })
    }

    /// Memory ceiling in bytes
    pub fn memory_max_bytes(&self) -> u64 {
        self.memory_max_mb.saturating_mul(1024 * 1024)
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
