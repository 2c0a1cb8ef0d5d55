//! Process launching seam.
//!
//! [`Launcher`] and [`ProcessHandle`] decouple the tracker and run loop from
//! `std::process`, so eviction and freeze behaviour can be exercised with
//! in-memory handles.

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::errors::LaunchError;
use super::types::AppDescriptor;
use crate::process::{self, ProcessError};

/// How often `wait_timeout` polls a child for exit.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A launched process owned by the stress tester.
pub trait ProcessHandle {
    fn pid(&self) -> u32;

    /// Non-blocking exit check.
    fn has_exited(&mut self) -> Result<bool, ProcessError>;

    /// Ask the process to exit.
    fn terminate(&mut self) -> Result<(), ProcessError>;

    /// Wait up to `timeout` for the process to exit. Returns whether it did.
    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool, ProcessError>;

    /// Kill the process and reap it.
    fn kill(&mut self) -> Result<(), ProcessError>;
}

/// Starts processes for app descriptors.
pub trait Launcher {
    fn launch(&mut self, app: &AppDescriptor) -> Result<Box<dyn ProcessHandle>, LaunchError>;
}

/// Launches real processes with their standard streams discarded.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&mut self, app: &AppDescriptor) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        let (program, args) = app.argv().ok_or_else(|| LaunchError::EmptyCommand {
            name: app.name.clone(),
        })?;

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed {
                name: app.name.clone(),
                command: app.command.clone(),
                message: e.to_string(),
            })?;

        info!(
            event = "core.apps.launch_completed",
            app = app.name,
            pid = child.id()
        );

        Ok(Box::new(ChildHandle { child }))
    }
}

/// [`ProcessHandle`] over a spawned `std::process::Child`.
#[derive(Debug)]
pub struct ChildHandle {
    child: Child,
}

impl ChildHandle {
    fn wait_error(&self, e: std::io::Error) -> ProcessError {
        ProcessError::WaitFailed {
            pid: self.child.id(),
            message: e.to_string(),
        }
    }
}

impl ProcessHandle for ChildHandle {
    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn has_exited(&mut self) -> Result<bool, ProcessError> {
        match self.child.try_wait() {
            Ok(status) => Ok(status.is_some()),
            Err(e) => Err(self.wait_error(e)),
        }
    }

    fn terminate(&mut self) -> Result<(), ProcessError> {
        // Once reaped the pid may belong to someone else
        if self.has_exited()? {
            debug!(event = "core.apps.terminate_skipped_exited", pid = self.pid());
            return Ok(());
        }
        process::terminate_process(self.pid())
    }

    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool, ProcessError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.has_exited()? {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            std::thread::sleep(WAIT_POLL_INTERVAL.min(deadline - now));
        }
    }

    fn kill(&mut self) -> Result<(), ProcessError> {
        let pid = self.pid();
        // Once reaped the pid may belong to someone else
        if !self.has_exited()? {
            match process::force_kill_process(pid) {
                Ok(()) | Err(ProcessError::NotFound { .. }) => {}
                Err(e) => {
                    warn!(event = "core.apps.kill_failed", pid = pid, error = %e);
                    return Err(e);
                }
            }
        }
        self.child.wait().map_err(|e| self.wait_error(e))?;
        Ok(())
    }
}
