use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid as NixPid;
use sysinfo::{Pid as SysinfoPid, ProcessesToUpdate, System};
use tracing::debug;

use crate::process::errors::ProcessError;
use crate::process::types::{Pid, ProcessInfo, ProcessStatus};

/// Length at which Linux truncates `/proc/<pid>/comm` process names.
const COMM_NAME_MAX_LEN: usize = 15;

/// Check if a process with the given PID is currently running.
///
/// Zombie and dead processes count as not running.
pub fn is_process_running(pid: u32) -> Result<bool, ProcessError> {
    let mut system = System::new();
    let pid_obj = SysinfoPid::from_u32(pid);
    system.refresh_processes(ProcessesToUpdate::Some(&[pid_obj]), true);
    Ok(system
        .process(pid_obj)
        .is_some_and(|process| ProcessStatus::from(process.status()).is_alive()))
}

/// Extract the base name from a path
fn extract_base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Check if a process name matches an expected name
///
/// Matches exactly, by base name after stripping paths, or against the
/// kernel-truncated comm name for long executable names. Substrings never
/// match, so "treeland" does not pick up "treeland-shortcut".
fn process_name_matches(actual_name: &str, expected_name: &str) -> bool {
    if actual_name == expected_name {
        return true;
    }

    let actual_base = extract_base_name(actual_name);
    let expected_base = extract_base_name(expected_name);

    if actual_base == expected_base {
        return true;
    }

    if actual_base.len() == COMM_NAME_MAX_LEN && expected_base.starts_with(actual_base) {
        debug!(
            "process_name_matches: truncated comm match - actual='{}', expected='{}'",
            actual_name, expected_name
        );
        return true;
    }

    false
}

/// Find a live process by name.
///
/// When several processes match, the oldest one wins so that helper
/// processes spawned later with the same name are not mistaken for the
/// supervised one.
pub fn find_process_by_name(name: &str) -> Result<Option<ProcessInfo>, ProcessError> {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    let found = system
        .processes()
        .iter()
        .filter(|(_, process)| ProcessStatus::from(process.status()).is_alive())
        .filter(|(_, process)| {
            let process_name = process.name().to_string_lossy();
            let exe_matches = process
                .exe()
                .and_then(|exe| exe.file_name())
                .is_some_and(|exe| exe.to_string_lossy() == extract_base_name(name));
            exe_matches || process_name_matches(&process_name, name)
        })
        .min_by_key(|(pid, process)| (process.start_time(), pid.as_u32()))
        .map(|(pid, process)| ProcessInfo {
            pid: Pid::from_raw(pid.as_u32()),
            name: process.name().to_string_lossy().to_string(),
        });

    debug!(
        event = "core.process.find_by_name_completed",
        name = name,
        found = found.is_some()
    );

    Ok(found)
}

fn send_signal(pid: u32, signal: Signal) -> Result<(), ProcessError> {
    let raw = i32::try_from(pid).map_err(|_| ProcessError::InvalidPid { pid })?;
    if raw == 0 {
        return Err(ProcessError::InvalidPid { pid });
    }

    kill(NixPid::from_raw(raw), signal).map_err(|errno| match errno {
        Errno::ESRCH => ProcessError::NotFound { pid },
        Errno::EPERM => ProcessError::AccessDenied { pid },
        other => ProcessError::SignalFailed {
            pid,
            signal: signal.to_string(),
            message: other.desc().to_string(),
        },
    })
}

/// Ask a process to exit (SIGTERM).
pub fn terminate_process(pid: u32) -> Result<(), ProcessError> {
    send_signal(pid, Signal::SIGTERM)
}

/// Forcefully kill a process (SIGKILL).
pub fn force_kill_process(pid: u32) -> Result<(), ProcessError> {
    send_signal(pid, Signal::SIGKILL)
}
