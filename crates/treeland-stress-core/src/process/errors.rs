use crate::errors::StressError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Process '{pid}' not found")]
    NotFound { pid: u32 },

    #[error("Failed to signal process '{pid}' with {signal}: {message}")]
    SignalFailed {
        pid: u32,
        signal: String,
        message: String,
    },

    #[error("Access denied for process '{pid}'")]
    AccessDenied { pid: u32 },

    #[error("Failed to wait for process '{pid}': {message}")]
    WaitFailed { pid: u32, message: String },

    #[error("Invalid PID: {pid}")]
    InvalidPid { pid: u32 },
}

impl StressError for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::NotFound { .. } => "PROCESS_NOT_FOUND",
            ProcessError::SignalFailed { .. } => "PROCESS_SIGNAL_FAILED",
            ProcessError::AccessDenied { .. } => "PROCESS_ACCESS_DENIED",
            ProcessError::WaitFailed { .. } => "PROCESS_WAIT_FAILED",
            ProcessError::InvalidPid { .. } => "PROCESS_INVALID_PID",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ProcessError::NotFound { .. }
                | ProcessError::AccessDenied { .. }
                | ProcessError::InvalidPid { .. }
        )
    }
}
