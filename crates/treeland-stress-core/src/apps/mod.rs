//! Launch stress tester.
//!
//! Repeatedly launches randomly chosen applications, caps the number of
//! concurrently running ones by evicting the oldest, and freezes further
//! launches once the supervised compositor process disappears.

pub mod app_list;
pub mod errors;
pub mod handler;
pub mod launcher;
pub mod runner;
pub mod supervisor;
pub mod tracker;
pub mod types;

pub use errors::{AppListError, LaunchError};
pub use launcher::{Launcher, ProcessHandle, SystemLauncher};
pub use runner::StressRunner;
pub use supervisor::{ProcessProbe, Supervisor, SupervisorCheck, SystemProbe};
pub use tracker::ProcessTracker;
pub use types::{
    AppDescriptor, CleanupReport, FreezeReport, LaunchOptions, RunMode, RunSummary, StopOutcome,
    TickOutcome,
};
