use crate::errors::StressError;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Display tool '{tool}' not found in PATH")]
    ToolNotFound { tool: String },

    #[error("'{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Failed to parse display tool output: {message}")]
    InvalidOutput { message: String },

    #[error("Output '{name}' not found")]
    OutputNotFound { name: String },
}

impl StressError for DisplayError {
    fn error_code(&self) -> &'static str {
        match self {
            DisplayError::ToolNotFound { .. } => "DISPLAY_TOOL_NOT_FOUND",
            DisplayError::CommandFailed { .. } => "DISPLAY_COMMAND_FAILED",
            DisplayError::InvalidOutput { .. } => "DISPLAY_INVALID_OUTPUT",
            DisplayError::OutputNotFound { .. } => "DISPLAY_OUTPUT_NOT_FOUND",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            DisplayError::ToolNotFound { .. } | DisplayError::OutputNotFound { .. }
        )
    }
}
