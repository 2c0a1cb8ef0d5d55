//! Invocation of the external display configuration tool.

use std::process::Command;

use tracing::{debug, info, warn};

use super::errors::DisplayError;

/// An external display configuration tool.
pub trait DisplayTool {
    /// Raw JSON describing every output.
    fn query_json(&self) -> Result<String, DisplayError>;

    /// Run one configuration command.
    fn run(&self, args: &[String]) -> Result<(), DisplayError>;
}

/// `wlr-randr` driven through its command line.
#[derive(Debug, Clone)]
pub struct WlrRandr {
    exec: String,
}

impl WlrRandr {
    pub fn new(exec: &str) -> Self {
        Self {
            exec: exec.to_string(),
        }
    }

    pub fn exec(&self) -> &str {
        &self.exec
    }

    /// Whether the executable can be found.
    pub fn is_available(&self) -> bool {
        which::which(&self.exec).is_ok()
    }

    fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.exec.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn output(&self, args: &[String]) -> Result<std::process::Output, DisplayError> {
        Command::new(&self.exec).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DisplayError::ToolNotFound {
                    tool: self.exec.clone(),
                }
            } else {
                DisplayError::CommandFailed {
                    command: self.command_line(args),
                    message: format!("Failed to execute: {}", e),
                }
            }
        })
    }
}

impl Default for WlrRandr {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_DISPLAY_TOOL)
    }
}

impl DisplayTool for WlrRandr {
    fn query_json(&self) -> Result<String, DisplayError> {
        let args = vec!["--json".to_string()];
        let output = self.output(&args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DisplayError::CommandFailed {
                command: self.command_line(&args),
                message: stderr.trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| DisplayError::InvalidOutput {
            message: format!("Output is not UTF-8: {}", e),
        })
    }

    fn run(&self, args: &[String]) -> Result<(), DisplayError> {
        let command = self.command_line(args);
        info!(event = "core.display.command_started", command = command);

        let output = self.output(args)?;
        if output.status.success() {
            debug!(event = "core.display.command_completed", command = command);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            event = "core.display.command_failed",
            command = command,
            status = ?output.status.code(),
            stderr = %stderr.trim()
        );
        Err(DisplayError::CommandFailed {
            command,
            message: if stderr.trim().is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr.trim().to_string()
            },
        })
    }
}
