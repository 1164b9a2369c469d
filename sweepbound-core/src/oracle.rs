//! The verification oracle seam
//!
//! Strategies only see this trait. The process-backed implementation with
//! timeout and memory enforcement lives in `sweepbound-exec`.

use crate::bound::BoundArg;
use crate::outcome::RawResult;
use std::path::Path;

/// Something that can run the verification oracle once
pub trait Oracle {
    /// Run the oracle on `instance` with `arg`. Must block until the
    /// invocation has finished and any child process is reaped.
    fn invoke(&mut self, instance: &Path, arg: BoundArg) -> RawResult;
}

impl<F> Oracle for F
where
    F: FnMut(&Path, BoundArg) -> RawResult,
{
    fn invoke(&mut self, instance: &Path, arg: BoundArg) -> RawResult {
        self(instance, arg)
    }
}
