//! Resource-Bounded Invoker
//!
//! Launches the oracle once per call, enforces the wall-clock deadline and
//! the memory ceiling, captures stdout and always reaps the child.
//!
//! ```text
//!  spawn (own process group, memory ceiling)
//!    │
//!    ▼
//!  poll stdout until EOF ──deadline──▶ SIGTERM group → grace → SIGKILL → reap
//!    │
//!    ▼
//!  wait for exit ─────────deadline──▶ (same)
//!    │
//!    ▼
//!  exit status → Completed(stdout) | Failed(Signaled)
//! ```

use crate::sys::{self, PollResult};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::Read;
use std::os::unix::io::AsRawFd;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::str::FromStr;
use std::time::{Duration, Instant};
use sweepbound_core::{BoundArg, ConfigError, FailureReason, Oracle, RawResult, ResourceBudget};
use tracing::{debug, warn};

/// Most stdout retained per invocation. Older output is dropped first;
/// the verdict is printed last.
pub const MAX_CAPTURE_BYTES: usize = 64 * 1024;

/// Longest single poll, so the deadline is re-checked regularly
const POLL_SLICE: Duration = Duration::from_millis(100);

/// Interval between exit checks while waiting on the child
const REAP_INTERVAL: Duration = Duration::from_millis(10);

/// Default time between SIGTERM and SIGKILL on timeout
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// How the memory ceiling is enforced on the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryEnforcement {
    /// `systemd-run --scope -p MemoryMax=<mb>M --user`; one cgroup-wide
    /// ceiling shared by the oracle and its descendants
    #[default]
    SystemdScope,
    /// `RLIMIT_AS` set in the child. Per process and on virtual memory:
    /// each descendant gets its own ceiling.
    Rlimit,
    /// No ceiling
    None,
}

impl FromStr for MemoryEnforcement {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "systemd-scope" | "systemd" => Ok(MemoryEnforcement::SystemdScope),
            "rlimit" => Ok(MemoryEnforcement::Rlimit),
            "none" => Ok(MemoryEnforcement::None),
            other => Err(ConfigError::UnknownVariant {
                kind: "memory enforcement",
                value: other.to_string(),
            }),
        }
    }
}

/// Oracle executable plus arguments placed before the bound argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleCommand {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
}

impl OracleCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Runs the oracle as a child process under a [`ResourceBudget`]
#[derive(Debug, Clone)]
pub struct ProcessOracle {
    command: OracleCommand,
    budget: ResourceBudget,
    enforcement: MemoryEnforcement,
    grace_period: Duration,
}

impl ProcessOracle {
    pub fn new(
        command: OracleCommand,
        budget: ResourceBudget,
        enforcement: MemoryEnforcement,
    ) -> Self {
        match enforcement {
            MemoryEnforcement::SystemdScope => {}
            MemoryEnforcement::Rlimit => warn!(
                memory_max_mb = budget.memory_max_mb,
                "memory ceiling applies per process; descendants of the oracle are not capped together"
            ),
            MemoryEnforcement::None => {
                warn!("memory ceiling is not enforced; out-of-memory results will not be detected")
            }
        }
        Self {
            command,
            budget,
            enforcement,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Override the SIGTERM → SIGKILL grace window
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn budget(&self) -> &ResourceBudget {
        &self.budget
    }

    /// Full argument vector for one call, as it will be executed
    ///
    /// Paths are passed through as raw OS strings.
    pub fn command_line(&self, instance: &Path, arg: BoundArg) -> (PathBuf, Vec<OsString>) {
        let mut args: Vec<OsString> = Vec::new();
        let program = match self.enforcement {
            MemoryEnforcement::SystemdScope => {
                args.extend(
                    [
                        "--scope".to_string(),
                        "-p".to_string(),
                        format!("MemoryMax={}M", self.budget.memory_max_mb),
                        "--user".to_string(),
                    ]
                    .map(OsString::from),
                );
                args.push(self.command.program.as_os_str().to_owned());
                PathBuf::from("systemd-run")
            }
            MemoryEnforcement::Rlimit | MemoryEnforcement::None => self.command.program.clone(),
        };
        args.extend(self.command.leading_args.iter().map(OsString::from));
        args.extend(arg.to_args().into_iter().map(OsString::from));
        args.push(instance.as_os_str().to_owned());
        (program, args)
    }

    fn build_command(&self, instance: &Path, arg: BoundArg) -> Command {
        let (program, args) = self.command_line(instance, arg);
        debug!(program = %program.display(), ?args, "spawning oracle");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .process_group(0);

        if self.enforcement == MemoryEnforcement::Rlimit {
            let bytes = self.budget.memory_max_bytes();
            unsafe {
                command.pre_exec(move || sys::limit_address_space(bytes));
            }
        }
        command
    }

    /// Run the oracle once. Exactly one child is created and reaped.
    pub fn run(&self, instance: &Path, arg: BoundArg) -> RawResult {
        // Fixed before spawn so setup overhead counts against the budget.
        let Some(deadline) = Instant::now().checked_add(self.budget.timeout) else {
            return RawResult::Failed(FailureReason::Io(std::io::Error::other(
                "timeout overflows the monotonic clock",
            )));
        };

        let child = match self.build_command(instance, arg).spawn() {
            Ok(child) => child,
            Err(e) => return RawResult::Failed(FailureReason::Spawn(e)),
        };
        let mut guard = ChildGuard::new(child, self.grace_period);

        let Some(mut stdout) = guard.child.stdout.take() else {
            return RawResult::Failed(FailureReason::Io(std::io::Error::other(
                "oracle stdout was not captured",
            )));
        };

        let mut capture = TailBuffer::new(MAX_CAPTURE_BYTES);
        match drain_stdout(&mut stdout, &mut capture, deadline) {
            Drain::EndOfStream => {}
            Drain::Deadline => {
                guard.terminate();
                return RawResult::TimedOut;
            }
            Drain::Error(e) => {
                guard.terminate();
                return RawResult::Failed(FailureReason::Io(e));
            }
        }

        match guard.wait_until(deadline) {
            Ok(Some(status)) => status_to_result(status, capture),
            Ok(None) => {
                guard.terminate();
                RawResult::TimedOut
            }
            Err(e) => RawResult::Failed(FailureReason::Io(e)),
        }
    }
}

impl Oracle for ProcessOracle {
    fn invoke(&mut self, instance: &Path, arg: BoundArg) -> RawResult {
        self.run(instance, arg)
    }
}

fn status_to_result(status: ExitStatus, capture: TailBuffer) -> RawResult {
    if let Some(signal) = status.signal() {
        return RawResult::Failed(FailureReason::Signaled(signal));
    }
    if !status.success() {
        debug!(code = ?status.code(), "oracle exited with non-zero status");
    }
    RawResult::Completed(capture.into_string())
}

enum Drain {
    EndOfStream,
    Deadline,
    Error(std::io::Error),
}

/// Read stdout until EOF or the deadline, whichever comes first
fn drain_stdout(stdout: &mut ChildStdout, capture: &mut TailBuffer, deadline: Instant) -> Drain {
    let fd = stdout.as_raw_fd();
    let mut chunk = [0u8; 4096];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Drain::Deadline;
        }

        match sys::wait_for_data(fd, remaining.min(POLL_SLICE)) {
            PollResult::DataAvailable => match stdout.read(&mut chunk) {
                Ok(0) => return Drain::EndOfStream,
                Ok(n) => capture.extend(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Drain::Error(e),
            },
            PollResult::PipeClosed => return Drain::EndOfStream,
            PollResult::Timeout => continue,
            PollResult::Error(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            PollResult::Error(e) => return Drain::Error(e),
        }
    }
}

/// Owns the child until it is reaped; kills the whole group on drop
struct ChildGuard {
    child: Child,
    grace_period: Duration,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child, grace_period: Duration) -> Self {
        Self {
            child,
            grace_period,
            reaped: false,
        }
    }

    /// Wait for exit until `deadline`. `Ok(None)` means still running.
    ///
    /// The leader is observed as a zombie first: until it is reaped its pid
    /// cannot be recycled, so killing the group here reaches only the
    /// oracle's own stragglers.
    fn wait_until(&mut self, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
        let pgid = self.child.id();
        loop {
            if sys::has_exited(pgid)? {
                let _ = sys::signal_group(pgid, libc::SIGKILL);
                let status = self.child.wait()?;
                self.reaped = true;
                return Ok(Some(status));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            std::thread::sleep(remaining.min(REAP_INTERVAL));
        }
    }

    /// SIGTERM the group, give it the grace window, then SIGKILL and reap.
    ///
    /// Once the leader is reaped the group is never signalled again; its
    /// pgid may belong to someone else by then.
    fn terminate(&mut self) {
        if self.reaped {
            return;
        }
        let pgid = self.child.id();
        // Ignore errors: the group may already be gone
        let _ = sys::signal_group(pgid, libc::SIGTERM);
        let grace_deadline = Instant::now()
            .checked_add(self.grace_period)
            .unwrap_or_else(Instant::now);
        if let Ok(Some(_)) = self.wait_until(grace_deadline) {
            debug!(pid = pgid, "oracle exited after SIGTERM");
            return;
        }
        // The leader is alive or a zombie, so the pgid is still ours.
        let _ = sys::signal_group(pgid, libc::SIGKILL);
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Keeps the last `cap` bytes written to it
struct TailBuffer {
    bytes: Vec<u8>,
    cap: usize,
}

impl TailBuffer {
    fn new(cap: usize) -> Self {
        Self {
            bytes: Vec::new(),
            cap,
        }
    }

    fn extend(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
        if self.bytes.len() > self.cap {
            let excess = self.bytes.len() - self.cap;
            self.bytes.drain(..excess);
        }
    }

    fn into_string(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}
