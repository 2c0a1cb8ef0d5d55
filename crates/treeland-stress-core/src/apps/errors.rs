use crate::errors::StressError;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("App '{name}' has an empty command")]
    EmptyCommand { name: String },

    #[error("Failed to start '{name}' ({command}): {message}")]
    SpawnFailed {
        name: String,
        command: String,
        message: String,
    },

    #[error("App list is empty, nothing to launch")]
    EmptyAppList,
}

impl StressError for LaunchError {
    fn error_code(&self) -> &'static str {
        match self {
            LaunchError::EmptyCommand { .. } => "LAUNCH_EMPTY_COMMAND",
            LaunchError::SpawnFailed { .. } => "LAUNCH_SPAWN_FAILED",
            LaunchError::EmptyAppList => "LAUNCH_EMPTY_APP_LIST",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            LaunchError::EmptyCommand { .. } | LaunchError::EmptyAppList
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppListError {
    #[error("Failed to read app list '{path}': {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to parse app list '{path}': {message}")]
    ParseFailed { path: String, message: String },

    #[error("App list '{path}' contains no apps")]
    Empty { path: String },

    #[error("Failed to save app list: {message}")]
    SaveFailed { message: String },
}

impl StressError for AppListError {
    fn error_code(&self) -> &'static str {
        match self {
            AppListError::ReadFailed { .. } => "APP_LIST_READ_FAILED",
            AppListError::ParseFailed { .. } => "APP_LIST_PARSE_FAILED",
            AppListError::Empty { .. } => "APP_LIST_EMPTY",
            AppListError::SaveFailed { .. } => "APP_LIST_SAVE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        !matches!(self, AppListError::SaveFailed { .. })
    }
}
