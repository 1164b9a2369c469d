//! Thin libc wrappers used by the invoker

use std::os::unix::io::RawFd;
use std::time::Duration;

/// Result of polling for data
#[derive(Debug)]
pub(crate) enum PollResult {
    DataAvailable,
    Timeout,
    PipeClosed,
    Error(std::io::Error),
}

/// Wait for data to be available on a file descriptor with timeout
pub(crate) fn wait_for_data(fd: RawFd, timeout: Duration) -> PollResult {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // Round sub-millisecond waits up so we never spin on a zero timeout.
    let timeout_ms = timeout.as_millis().clamp(1, i32::MAX as u128) as i32;

    let result = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };

    if result < 0 {
        PollResult::Error(std::io::Error::last_os_error())
    } else if result == 0 {
        PollResult::Timeout
    } else if pollfd.revents & libc::POLLIN != 0 {
        // Data first: a closing pipe may still hold the verdict line
        PollResult::DataAvailable
    } else if pollfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
        PollResult::PipeClosed
    } else {
        PollResult::Timeout
    }
}

/// Send `signal` to every process in the group led by `pgid`.
pub(crate) fn signal_group(pgid: u32, signal: libc::c_int) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(-(pgid as libc::pid_t), signal) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Whether `pid` has exited, without reaping it. The zombie keeps the pid
/// (and so its process group id) reserved until `wait` is called.
pub(crate) fn has_exited(pid: u32) -> Result<bool, std::io::Error> {
    let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
    let ret = unsafe {
        libc::waitid(
            libc::P_PID,
            pid as libc::id_t,
            &mut info,
            libc::WEXITED | libc::WNOHANG | libc::WNOWAIT,
        )
    };
    if ret == -1 {
        return Err(std::io::Error::last_os_error());
    }
    // With WNOHANG, si_pid stays zero while the child is still running.
    Ok(unsafe { info.si_pid() } != 0)
}

/// Cap the address space of the calling process. Runs in the child between
/// fork and exec, so it must stay async-signal-safe.
pub(crate) fn limit_address_space(bytes: u64) -> Result<(), std::io::Error> {
    let limit = libc::rlimit {
        rlim_cur: bytes as libc::rlim_t,
        rlim_max: bytes as libc::rlim_t,
    };
    let ret = unsafe { libc::setrlimit(libc::RLIMIT_AS, &limit) };
    if ret != 0 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}
