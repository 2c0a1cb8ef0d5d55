//! Configuration loading and merging logic.
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.treeland-stress/config.toml`
//! 3. **Project config** - `./.treeland-stress/config.toml`
//!
//! CLI flags are layered on top by the caller through [`merge_configs`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::config::types::{AppsConfig, DisplayConfig, StressConfig};
use crate::errors::ConfigError;

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
/// Missing config files are not errors.
pub fn load_hierarchy() -> Result<StressConfig, ConfigError> {
    load_from_paths(&config_paths())
}

/// Candidate config file locations, lowest precedence first.
fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths
}

/// Load and merge the given config files in order.
pub fn load_from_paths(paths: &[PathBuf]) -> Result<StressConfig, ConfigError> {
    let mut config = StressConfig::default();
    for path in paths {
        if let Some(file_config) = load_config_file(path)? {
            config = merge_configs(config, file_config);
        }
    }
    Ok(config)
}

/// Load a configuration file, returning `None` if it does not exist.
pub fn load_config_file(path: &Path) -> Result<Option<StressConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(event = "core.config.file_not_found", path = %path.display());
            return Ok(None);
        }
        Err(e) => return Err(ConfigError::IoError { source: e }),
    };

    let config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    debug!(event = "core.config.file_loaded", path = %path.display());
    Ok(Some(config))
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Override values replace base values only if present.
pub fn merge_configs(base: StressConfig, override_config: StressConfig) -> StressConfig {
    StressConfig {
        apps: AppsConfig {
            interval_secs: override_config.apps.interval_secs.or(base.apps.interval_secs),
            max_processes: override_config.apps.max_processes.or(base.apps.max_processes),
            duration_secs: override_config.apps.duration_secs.or(base.apps.duration_secs),
            app_list: override_config.apps.app_list.or(base.apps.app_list),
            compositor: override_config.apps.compositor.or(base.apps.compositor),
            supervise: override_config.apps.supervise.or(base.apps.supervise),
        },
        display: DisplayConfig {
            interval_secs: override_config
                .display
                .interval_secs
                .or(base.display.interval_secs),
            tool: override_config.display.tool.or(base.display.tool),
        },
    }
}
