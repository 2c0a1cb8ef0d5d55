use std::thread;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::errors::DisplayError;
use super::parse::parse_displays;
use super::tool::DisplayTool;
use super::types::{
    ApplyOutcome, DisplayMode, DisplayOptions, DisplaySnapshot, Displays, SCALE_TOLERANCE,
    Transform,
};

/// Applies and verifies output settings through a [`DisplayTool`].
///
/// Verification always re-queries the tool; no snapshot outlives a
/// mutating command.
pub struct DisplayClient<'a> {
    tool: &'a dyn DisplayTool,
    options: &'a DisplayOptions,
}

impl<'a> DisplayClient<'a> {
    pub fn new(tool: &'a dyn DisplayTool, options: &'a DisplayOptions) -> Self {
        Self { tool, options }
    }

    pub fn options(&self) -> &DisplayOptions {
        self.options
    }

    /// Query and parse every output.
    pub fn try_query(&self) -> Result<Displays, DisplayError> {
        let json = self.tool.query_json()?;
        if self.options.debug {
            println!("\n=== Debug: display tool JSON ===");
            println!("{}", json.trim());
        }

        let displays = parse_displays(&json)?;
        if self.options.debug {
            for display in displays.iter() {
                print_debug_snapshot(display);
            }
        }
        Ok(displays)
    }

    /// Query every output, degrading to no outputs on failure.
    pub fn query(&self) -> Displays {
        match self.try_query() {
            Ok(displays) => displays,
            Err(e) => {
                error!(event = "core.display.query_failed", error = %e);
                Displays::default()
            }
        }
    }

    /// Fresh snapshot of one output.
    pub fn snapshot(&self, output: &str) -> Option<DisplaySnapshot> {
        self.query().into_iter().find(|display| display.name == output)
    }

    fn run_output_command(&self, output: &str, args: &[&str]) -> Result<(), DisplayError> {
        let mut full_args = vec!["--output".to_string(), output.to_string()];
        full_args.extend(args.iter().map(|arg| arg.to_string()));
        self.tool.run(&full_args)
    }

    /// Switch to `mode`, wait for it to settle and verify it.
    pub fn apply_mode(&self, output: &str, mode: &DisplayMode) -> ApplyOutcome {
        if let Err(e) = self.run_output_command(output, &["--mode", &mode.to_arg()]) {
            return command_failed(output, "mode", e);
        }
        settle(self.options.mode_settle);

        let current = self
            .snapshot(output)
            .and_then(|display| display.current_mode);
        match current {
            Some(current) if current.matches(mode) => ApplyOutcome::Applied,
            Some(current) => unverified(
                output,
                "mode",
                format!("current mode {} does not match {}", current, mode),
            ),
            None => unverified(output, "mode", "current mode unavailable".to_string()),
        }
    }

    /// Switch to the preferred mode.
    pub fn set_preferred(&self, output: &str) -> Result<(), DisplayError> {
        self.run_output_command(output, &["--preferred"])?;
        settle(self.options.mode_settle);
        Ok(())
    }

    /// Apply `transform` and check it took effect.
    pub fn apply_transform(&self, output: &str, transform: Transform) -> ApplyOutcome {
        if let Err(e) = self.run_output_command(output, &["--transform", transform.as_str()]) {
            return command_failed(output, "transform", e);
        }

        match self.snapshot(output) {
            Some(display) if display.transform == transform => ApplyOutcome::Applied,
            Some(display) => unverified(
                output,
                "transform",
                format!("current transform {} does not match {}", display.transform, transform),
            ),
            None => unverified(output, "transform", "output disappeared".to_string()),
        }
    }

    /// Apply `scale`, wait for it to settle and verify it within tolerance.
    pub fn apply_scale(&self, output: &str, scale: f64) -> ApplyOutcome {
        if let Err(e) = self.run_output_command(output, &["--scale", &scale.to_string()]) {
            return command_failed(output, "scale", e);
        }
        settle(self.options.scale_settle);

        match self.snapshot(output) {
            Some(display) if (display.scale - scale).abs() < SCALE_TOLERANCE => {
                ApplyOutcome::Applied
            }
            Some(display) => unverified(
                output,
                "scale",
                format!("current scale {} does not match {}", display.scale, scale),
            ),
            None => unverified(output, "scale", "output disappeared".to_string()),
        }
    }

    /// Toggle adaptive sync and check it took effect.
    pub fn apply_adaptive_sync(&self, output: &str, enabled: bool) -> ApplyOutcome {
        let value = if enabled { "enabled" } else { "disabled" };
        if let Err(e) = self.run_output_command(output, &["--adaptive-sync", value]) {
            return command_failed(output, "adaptive_sync", e);
        }

        match self.snapshot(output) {
            Some(display) if display.adaptive_sync == enabled => ApplyOutcome::Applied,
            Some(_) => unverified(
                output,
                "adaptive_sync",
                format!("adaptive sync is not {}", value),
            ),
            None => unverified(output, "adaptive_sync", "output disappeared".to_string()),
        }
    }
}

fn settle(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

fn command_failed(output: &str, setting: &str, e: DisplayError) -> ApplyOutcome {
    warn!(
        event = "core.display.apply_failed",
        output = output,
        setting = setting,
        error = %e
    );
    ApplyOutcome::CommandFailed {
        error: e.to_string(),
    }
}

fn unverified(output: &str, setting: &str, reason: String) -> ApplyOutcome {
    warn!(
        event = "core.display.verify_mismatch",
        output = output,
        setting = setting,
        reason = reason
    );
    ApplyOutcome::Unverified { reason }
}

fn print_debug_snapshot(snapshot: &DisplaySnapshot) {
    debug!(event = "core.display.output_parsed", output = snapshot.name);
    println!("Parsed output {}: {} modes", snapshot.name, snapshot.modes.len());
    match &snapshot.current_mode {
        Some(mode) => println!("  Current mode: {}", mode),
        None => println!("  Current mode: none"),
    }
    println!("  Transform: {}", snapshot.transform);
    println!("  Scale: {}", snapshot.scale);
    println!("  Position: ({}, {})", snapshot.position.x, snapshot.position.y);
}
