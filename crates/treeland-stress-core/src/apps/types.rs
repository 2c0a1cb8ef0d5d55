use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Grace period between SIGTERM and SIGKILL when stopping a tracked process.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// An application the stress tester can launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    pub name: String,
    /// Whitespace-separated program and arguments.
    pub command: String,
    pub category: String,
}

impl AppDescriptor {
    pub fn new(name: &str, command: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            category: category.to_string(),
        }
    }

    /// Split the command into program and arguments.
    ///
    /// Returns `None` for a blank command.
    pub fn argv(&self) -> Option<(&str, Vec<&str>)> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}

/// Apps launched when no app list file is given.
pub fn default_app_list() -> Vec<AppDescriptor> {
    vec![
        AppDescriptor::new("foot", "foot", "terminal"),
        AppDescriptor::new("deepin-terminal", "deepin-terminal", "terminal"),
        AppDescriptor::new("deepin-compressor", "deepin-compressor", "utility"),
        AppDescriptor::new("xterm", "xterm", "terminal"),
        AppDescriptor::new("d-spy", "d-spy", "development"),
    ]
}

/// Run mode of the launch loop.
///
/// `Frozen` is terminal: it rejects every launch and is only left by
/// interrupting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Running,
    Frozen,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Running => write!(f, "running"),
            RunMode::Frozen => write!(f, "frozen"),
        }
    }
}

/// Settings for one launch stress run.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub interval: Duration,
    pub max_processes: usize,
    /// `None` runs until interrupted.
    pub duration: Option<Duration>,
    pub grace_period: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_processes: 10,
            duration: None,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

/// Diagnostic emitted once when the supervised compositor disappears.
#[derive(Debug, Clone)]
pub struct FreezeReport {
    pub detected_at: DateTime<Local>,
    pub compositor: String,
    pub compositor_pid: u32,
    /// (pid, app name) of every process still tracked, oldest first.
    pub still_tracked: Vec<(u32, String)>,
}

/// What a single iteration of the launch loop did.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    Launched {
        name: String,
        pid: u32,
        launches: usize,
        running: usize,
    },
    LaunchFailed {
        name: String,
        error: String,
    },
    /// The compositor vanished during this tick; no launch happened.
    Froze(FreezeReport),
    /// Already frozen; the launch was suppressed.
    Suppressed,
}

/// How a tracked process was brought down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Exited within the grace period after SIGTERM.
    Terminated,
    /// Needed SIGKILL after the grace period.
    Killed,
    /// Neither signal could be confirmed; the entry was dropped anyway.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub skipped: bool,
    pub terminated: usize,
    pub killed: usize,
    pub failed: usize,
}

/// Final report of a launch stress run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub launches: usize,
    pub mode: RunMode,
    pub cleanup: CleanupReport,
}

impl RunSummary {
    /// Average time between launches, `None` when nothing was launched.
    pub fn average_interval(&self) -> Option<Duration> {
        let launches = u32::try_from(self.launches).ok().filter(|n| *n > 0)?;
        Some(self.elapsed / launches)
    }
}
