//! Sweep Strategies
//!
//! Each strategy walks its bound sequence in configured order, one
//! invocation at a time, and decides when to stop.
//!
//! | strategy        | stops on                         | continues on |
//! |-----------------|----------------------------------|--------------|
//! | BMC             | `FAIL`, timeout, exhaustion      | `OK`         |
//! | IMC single-shot | (one call only)                  | -            |
//! | IMC escalating  | `OK` or `FAIL`                   | exhaustion   |

use crate::bound::{Bound, BoundArg, BoundSequence};
use crate::oracle::Oracle;
use crate::outcome::{Outcome, SweepResult, classify};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Result of running one strategy against one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrategyRun {
    pub result: SweepResult,
    /// Number of oracle invocations made
    pub invocations: u32,
}

/// Which IMC strategy a session reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ImcMode {
    /// One call with the unbounded sentinel
    #[default]
    SingleShot,
    /// Try inner bounds in order until a verdict appears
    Escalating,
}

impl FromStr for ImcMode {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-shot" | "single" => Ok(ImcMode::SingleShot),
            "escalating" | "loop" => Ok(ImcMode::Escalating),
            other => Err(crate::error::ConfigError::UnknownVariant {
                kind: "IMC mode",
                value: other.to_string(),
            }),
        }
    }
}

fn invoke_once<O: Oracle + ?Sized>(oracle: &mut O, instance: &Path, arg: BoundArg) -> Outcome {
    let raw = oracle.invoke(instance, arg);
    let outcome = classify(&raw, arg);
    debug!(instance = %instance.display(), %arg, ?outcome, "invocation finished");
    outcome
}

/// Bounded model checking sweep.
///
/// Each depth must verify for the sweep to continue. The first refutation
/// ends it, and so does the first timeout or exhaustion: later depths are
/// never tried once one depth is unresolved.
///
/// `depths` must not hold the `-1` sentinel; [`SweepPlan::new`] and
/// [`BoundSequence::depths`] reject it. Such a sequence is refused here
/// as well rather than silently shortened.
///
/// [`SweepPlan::new`]: crate::SweepPlan::new
pub fn bmc_sweep<O: Oracle + ?Sized>(
    oracle: &mut O,
    instance: &Path,
    depths: &BoundSequence,
) -> StrategyRun {
    let has_sentinel = depths.iter().any(|b| b == Bound::Unbounded);
    debug_assert!(
        !has_sentinel,
        "BMC depths may not contain the unbounded sentinel"
    );
    if has_sentinel {
        warn!(%depths, "BMC sweep refused: depths contain -1");
        return StrategyRun {
            result: SweepResult::ResourceExhausted,
            invocations: 0,
        };
    }

    let mut invocations = 0;
    let mut last = None;

    for k in depths.depth_values() {
        let arg = BoundArg::Depth(k);
        invocations += 1;
        let outcome = invoke_once(oracle, instance, arg);

        let stop = match outcome {
            Outcome::Verified(_) => None,
            Outcome::Refuted(_) => Some(SweepResult::Refuted(Some(Bound::Depth(k)))),
            Outcome::TimedOut => Some(SweepResult::TimedOut),
            Outcome::ResourceExhausted => Some(SweepResult::ResourceExhausted),
        };
        if let Some(result) = stop {
            return StrategyRun {
                result,
                invocations,
            };
        }
        last = Some(outcome);
    }

    let result = match last {
        Some(Outcome::Verified(arg)) => SweepResult::Verified(Some(arg.bound())),
        _ => SweepResult::ResourceExhausted,
    };
    StrategyRun {
        result,
        invocations,
    }
}

/// Interpolation-based check with the oracle's default (unbounded) inner bound.
pub fn imc_single_shot<O: Oracle + ?Sized>(oracle: &mut O, instance: &Path) -> StrategyRun {
    let arg = BoundArg::InnerBound(Bound::Unbounded);
    let result = match invoke_once(oracle, instance, arg) {
        Outcome::Verified(_) => SweepResult::Verified(None),
        Outcome::Refuted(_) => SweepResult::Refuted(None),
        Outcome::TimedOut => SweepResult::TimedOut,
        Outcome::ResourceExhausted => SweepResult::ResourceExhausted,
    };
    StrategyRun {
        result,
        invocations: 1,
    }
}

/// Escalating IMC: tries inner bounds until any verdict is reached.
/// Exhaustion at one bound moves on to the next.
pub fn imc_escalating<O: Oracle + ?Sized>(
    oracle: &mut O,
    instance: &Path,
    inner_bounds: &BoundSequence,
) -> StrategyRun {
    let mut invocations = 0;

    for bound in inner_bounds.iter() {
        invocations += 1;
        let result = match invoke_once(oracle, instance, BoundArg::InnerBound(bound)) {
            Outcome::Verified(_) => SweepResult::Verified(Some(bound)),
            Outcome::Refuted(_) => SweepResult::Refuted(Some(bound)),
            Outcome::TimedOut | Outcome::ResourceExhausted => continue,
        };
        return StrategyRun {
            result,
            invocations,
        };
    }

    StrategyRun {
        result: SweepResult::Exhausted,
        invocations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::testing::{Reply, ScriptedOracle};

    fn seq(values: &[i64]) -> BoundSequence {
        BoundSequence::from_values(values).unwrap()
    }

    fn path() -> &'static Path {
        Path::new("a.inst")
    }

    #[test]
    fn test_bmc_all_verified_reports_last_bound() {
        let mut oracle = ScriptedOracle::new(Reply::Ok);
        let run = bmc_sweep(&mut oracle, path(), &seq(&[1, 2, 3]));
        assert_eq!(run.result, SweepResult::Verified(Some(Bound::Depth(3))));
        assert_eq!(run.invocations, 3);
    }

    #[test]
    fn test_bmc_first_refutation_wins() {
        let mut oracle = ScriptedOracle::new(Reply::Ok)
            .on(Bound::Depth(2), Reply::Fail)
            .on(Bound::Depth(3), Reply::Fail);
        let run = bmc_sweep(&mut oracle, path(), &seq(&[1, 2, 3]));
        assert_eq!(run.result, SweepResult::Refuted(Some(Bound::Depth(2))));
        assert_eq!(oracle.calls, vec![BoundArg::Depth(1), BoundArg::Depth(2)]);
    }

    #[test]
    fn test_bmc_timeout_aborts_sweep() {
        let mut oracle = ScriptedOracle::new(Reply::Timeout);
        let run = bmc_sweep(&mut oracle, path(), &seq(&[1, 2, 3]));
        assert_eq!(run.result, SweepResult::TimedOut);
        assert_eq!(run.invocations, 1);
        assert_eq!(oracle.calls, vec![BoundArg::Depth(1)]);
    }

    #[test]
    fn test_bmc_exhaustion_mid_sequence_aborts() {
        let mut oracle = ScriptedOracle::new(Reply::Ok).on(Bound::Depth(2), Reply::Killed);
        let run = bmc_sweep(&mut oracle, path(), &seq(&[1, 2, 3]));
        assert_eq!(run.result, SweepResult::ResourceExhausted);
        assert_eq!(run.invocations, 2);

        let mut oracle = ScriptedOracle::new(Reply::Silent);
        let run = bmc_sweep(&mut oracle, path(), &seq(&[4]));
        assert_eq!(run.result, SweepResult::ResourceExhausted);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "unbounded sentinel"))]
    fn test_bmc_refuses_sentinel_depth() {
        let mut oracle = ScriptedOracle::new(Reply::Ok);
        let run = bmc_sweep(&mut oracle, path(), &seq(&[1, -1]));
        assert_eq!(run.result, SweepResult::ResourceExhausted);
        assert!(oracle.calls.is_empty());
    }

    #[test]
    fn test_single_shot_uses_sentinel_and_drops_bound() {
        let mut oracle = ScriptedOracle::new(Reply::Fail);
        let run = imc_single_shot(&mut oracle, path());
        assert_eq!(run.result, SweepResult::Refuted(None));
        assert_eq!(oracle.calls, vec![BoundArg::InnerBound(Bound::Unbounded)]);

        let mut oracle = ScriptedOracle::new(Reply::Timeout);
        assert_eq!(imc_single_shot(&mut oracle, path()).result, SweepResult::TimedOut);

        let mut oracle = ScriptedOracle::new(Reply::Killed);
        assert_eq!(
            imc_single_shot(&mut oracle, path()).result,
            SweepResult::ResourceExhausted
        );
    }

    #[test]
    fn test_escalating_stops_on_any_verdict() {
        let mut oracle = ScriptedOracle::new(Reply::Ok)
            .on(Bound::Depth(1), Reply::Timeout)
            .on(Bound::Depth(2), Reply::Fail);
        let run = imc_escalating(&mut oracle, path(), &seq(&[1, 2, 3, -1]));
        assert_eq!(run.result, SweepResult::Refuted(Some(Bound::Depth(2))));
        assert_eq!(run.invocations, 2);
    }

    #[test]
    fn test_escalating_continues_past_exhaustion() {
        let mut oracle = ScriptedOracle::new(Reply::Killed).on(Bound::Unbounded, Reply::Ok);
        let run = imc_escalating(&mut oracle, path(), &seq(&[1, 2, -1]));
        assert_eq!(run.result, SweepResult::Verified(Some(Bound::Unbounded)));
        assert_eq!(run.invocations, 3);
    }

    #[test]
    fn test_escalating_exhausted_is_undistinguished() {
        let mut oracle = ScriptedOracle::new(Reply::Timeout).on(Bound::Depth(2), Reply::Silent);
        let run = imc_escalating(&mut oracle, path(), &seq(&[1, 2]));
        assert_eq!(run.result, SweepResult::Exhausted);
        assert_eq!(run.invocations, 2);
    }

    #[test]
    fn test_closure_oracle() {
        let mut oracle = |_: &Path, arg: BoundArg| match arg {
            BoundArg::Depth(k) if k < 3 => crate::outcome::RawResult::Completed("OK".into()),
            _ => crate::outcome::RawResult::Completed("FAIL".into()),
        };
        let run = bmc_sweep(&mut oracle, path(), &seq(&[1, 2, 3, 4]));
        assert_eq!(run.result, SweepResult::Refuted(Some(Bound::Depth(3))));
    }

    #[test]
    fn test_imc_mode_parse() {
        assert_eq!("single-shot".parse::<ImcMode>().unwrap(), ImcMode::SingleShot);
        assert_eq!("Escalating".parse::<ImcMode>().unwrap(), ImcMode::Escalating);
        assert!("both".parse::<ImcMode>().is_err());
    }
}
