//! treeland-stress-core: Core library for compositor stress tools
//!
//! This library provides the behaviour behind the `treeland-stress` CLI:
//! a launch stress tester that churns GUI application processes, and a
//! display configuration driver that sweeps every output through its modes,
//! transforms and scales via `wlr-randr`.
//!
//! # Main Entry Points
//!
//! - [`apps`] - Launch stress tester (tracker, supervisor, run loop)
//! - [`display`] - Display configuration driver (query, apply, sweeps)
//! - [`config`] - Configuration management
//! - [`process`] - OS process primitives

pub mod apps;
pub mod config;
pub mod display;
pub mod errors;
pub mod events;
pub mod logging;
pub mod process;

// Re-export commonly used types at crate root for convenience
pub use apps::types::{AppDescriptor, RunMode, RunSummary};
pub use config::StressConfig;
pub use display::types::{DisplayMode, DisplaySnapshot, Displays, Transform};
pub use errors::{StressError, StressResult};

// Re-export handler modules as the primary API
pub use apps::handler as apps_ops;
pub use display::handler as display_ops;

// Re-export logging initialization
pub use logging::init_logging;
