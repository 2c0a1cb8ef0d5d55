//! Configuration type definitions.
//!
//! Every field is optional so that partial config files and CLI overrides
//! can be layered; accessors resolve unset values to the defaults in
//! [`super::defaults`].
//!
//! # Example Configuration
//!
//! ```toml
//! [apps]
//! interval_secs = 0.1
//! max_processes = 10
//! duration_secs = 0
//! app_list = "/home/user/apps.json"
//! compositor = "treeland"
//! supervise = true
//!
//! [display]
//! interval_secs = 5.0
//! tool = "wlr-randr"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::defaults;

/// Main configuration loaded from TOML config files and CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StressConfig {
    /// Launch stress tester settings
    #[serde(default)]
    pub apps: AppsConfig,

    /// Display configuration driver settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Launch stress tester configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppsConfig {
    /// Seconds between two launches.
    /// Default: 0.1 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<f64>,

    /// Maximum number of concurrently tracked processes.
    /// Default: 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,

    /// Run duration in seconds, 0 runs until interrupted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,

    /// JSON file holding the app descriptor list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_list: Option<PathBuf>,

    /// Process name of the compositor to supervise.
    /// Default: "treeland".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compositor: Option<String>,

    /// Whether to freeze launches when the compositor disappears.
    /// Default: true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervise: Option<bool>,
}

impl AppsConfig {
    pub fn interval_secs(&self) -> f64 {
        self.interval_secs.unwrap_or(defaults::DEFAULT_APPS_INTERVAL_SECS)
    }

    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs()).unwrap_or(Duration::MAX)
    }

    pub fn max_processes(&self) -> usize {
        self.max_processes.unwrap_or(defaults::DEFAULT_MAX_PROCESSES)
    }

    /// `None` means unbounded.
    pub fn duration(&self) -> Option<Duration> {
        match self.duration_secs.unwrap_or(0) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn app_list(&self) -> Option<&Path> {
        self.app_list.as_deref()
    }

    pub fn compositor(&self) -> &str {
        self.compositor.as_deref().unwrap_or(defaults::DEFAULT_COMPOSITOR)
    }

    pub fn supervise(&self) -> bool {
        self.supervise.unwrap_or(true)
    }
}

/// Display configuration driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    /// Seconds to wait between two configuration changes.
    /// Default: 5.0 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<f64>,

    /// Display configuration tool executable.
    /// Default: "wlr-randr".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl DisplayConfig {
    pub fn interval_secs(&self) -> f64 {
        self.interval_secs.unwrap_or(defaults::DEFAULT_DISPLAY_INTERVAL_SECS)
    }

    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs()).unwrap_or(Duration::MAX)
    }

    pub fn tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(defaults::DEFAULT_DISPLAY_TOOL)
    }
}
