//! Default values for configuration fields.

/// Seconds between two app launches.
pub const DEFAULT_APPS_INTERVAL_SECS: f64 = 0.1;

/// Maximum number of concurrently tracked app processes.
pub const DEFAULT_MAX_PROCESSES: usize = 10;

/// Process name of the compositor under test.
pub const DEFAULT_COMPOSITOR: &str = "treeland";

/// Seconds between two display configuration changes.
pub const DEFAULT_DISPLAY_INTERVAL_SECS: f64 = 5.0;

/// Display configuration tool executable.
pub const DEFAULT_DISPLAY_TOOL: &str = "wlr-randr";

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".treeland-stress";

/// Name of the configuration file inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";
