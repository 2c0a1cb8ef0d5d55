//! JSON persistence of the app descriptor list.
//!
//! ```json
//! [
//!   { "name": "foot", "command": "foot", "category": "terminal" }
//! ]
//! ```

use std::path::Path;

use tracing::{info, warn};

use super::errors::AppListError;
use super::types::{AppDescriptor, default_app_list};

/// Load an app list from a JSON file.
pub fn load_app_list(path: &Path) -> Result<Vec<AppDescriptor>, AppListError> {
    let content = std::fs::read_to_string(path).map_err(|e| AppListError::ReadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let apps: Vec<AppDescriptor> =
        serde_json::from_str(&content).map_err(|e| AppListError::ParseFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    if apps.is_empty() {
        return Err(AppListError::Empty {
            path: path.display().to_string(),
        });
    }

    info!(
        event = "core.apps.app_list_loaded",
        path = %path.display(),
        count = apps.len()
    );

    Ok(apps)
}

/// Load the app list at `path`, falling back to the built-in list.
///
/// A missing or unreadable file is not fatal: the failure is logged and the
/// defaults are used instead.
pub fn load_app_list_or_default(path: Option<&Path>) -> Vec<AppDescriptor> {
    let Some(path) = path else {
        return default_app_list();
    };

    match load_app_list(path) {
        Ok(apps) => apps,
        Err(e) => {
            warn!(
                event = "core.apps.app_list_load_failed",
                path = %path.display(),
                error = %e,
                "Using the built-in app list"
            );
            default_app_list()
        }
    }
}

/// Save an app list as pretty-printed JSON, creating parent directories.
pub fn save_app_list(path: &Path, apps: &[AppDescriptor]) -> Result<(), AppListError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| AppListError::SaveFailed {
            message: format!("Failed to create directory ({}): {}", parent.display(), e),
        })?;
    }

    let json = serde_json::to_string_pretty(apps).map_err(|e| AppListError::SaveFailed {
        message: format!("Failed to serialize app list: {}", e),
    })?;

    std::fs::write(path, json).map_err(|e| AppListError::SaveFailed {
        message: format!("Failed to write app list ({}): {}", path.display(), e),
    })?;

    info!(
        event = "core.apps.app_list_saved",
        path = %path.display(),
        count = apps.len()
    );

    Ok(())
}
