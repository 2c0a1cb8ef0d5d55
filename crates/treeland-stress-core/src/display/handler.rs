use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::errors::DisplayError;
use super::operations::DisplayClient;
use super::tool::DisplayTool;
use super::types::{
    ApplyOutcome, DisplayOptions, Phase, PhaseReport, SCALE_SWEEP, SCALE_TOLERANCE, Transform,
};
use crate::apps::runner::sleep_interruptible;
use crate::config::DisplayConfig;

/// Resolve run options for a validated config.
///
/// `debug` is threaded through every query rather than held globally.
pub fn display_options(config: &DisplayConfig, debug: bool) -> DisplayOptions {
    DisplayOptions {
        interval: config.interval(),
        debug,
        ..Default::default()
    }
}

/// Builder for one phase's report.
struct PhaseProgress {
    report: PhaseReport,
}

impl PhaseProgress {
    fn new(output: &str, phase: Phase, total: usize) -> Self {
        info!(
            event = "core.display.phase_started",
            output = output,
            phase = %phase,
            total = total
        );
        Self {
            report: PhaseReport {
                output: output.to_string(),
                phase,
                total,
                attempted: 0,
                succeeded: Vec::new(),
                restored: false,
                interrupted: false,
            },
        }
    }

    fn record(&mut self, label: String, success: bool) {
        self.report.attempted += 1;
        if success {
            self.report.succeeded.push(label);
        }
    }

    fn finish(mut self, restored: bool) -> PhaseReport {
        self.report.restored = restored;
        info!(
            event = "core.display.phase_completed",
            output = self.report.output,
            phase = %self.report.phase,
            succeeded = self.report.succeeded.len(),
            attempted = self.report.attempted,
            total = self.report.total,
            restored = restored,
            interrupted = self.report.interrupted
        );
        self.report
    }
}

fn interrupted(interrupt: &AtomicBool, progress: &mut PhaseProgress) -> bool {
    if interrupt.load(Ordering::SeqCst) {
        progress.report.interrupted = true;
        return true;
    }
    false
}

/// Apply every supported mode in enumeration order, then restore the
/// initial mode.
pub fn sweep_modes(
    client: &DisplayClient<'_>,
    output: &str,
    interrupt: &AtomicBool,
) -> PhaseReport {
    let initial = client.snapshot(output);
    let modes = initial
        .as_ref()
        .map(|display| display.modes.clone())
        .unwrap_or_default();
    let initial_mode = initial.and_then(|display| display.current_mode);

    let mut progress = PhaseProgress::new(output, Phase::Modes, modes.len());
    for mode in &modes {
        if interrupted(interrupt, &mut progress) {
            break;
        }
        let outcome = client.apply_mode(output, mode);
        progress.record(mode.to_string(), outcome.is_applied());
        sleep_interruptible(client.options().interval, interrupt);
    }

    let restored = match initial_mode {
        Some(mode) => {
            info!(event = "core.display.restore_mode", output = output, mode = %mode);
            client.apply_mode(output, &mode).is_applied()
        }
        None => {
            warn!(event = "core.display.restore_mode_unknown", output = output);
            false
        }
    };
    progress.finish(restored)
}

/// Apply each of the eight transforms on the preferred mode, then restore
/// the initial transform.
///
/// A transform counts as supported when the tool accepts it; a failed
/// re-query check is only logged.
pub fn sweep_transforms(
    client: &DisplayClient<'_>,
    output: &str,
    interrupt: &AtomicBool,
) -> PhaseReport {
    let initial_transform = client
        .snapshot(output)
        .map(|display| display.transform)
        .unwrap_or_default();

    if let Err(e) = client.set_preferred(output) {
        warn!(
            event = "core.display.preferred_failed",
            output = output,
            error = %e,
            "Continuing with the current mode"
        );
    }

    let mut progress = PhaseProgress::new(output, Phase::Transforms, Transform::ALL.len());
    for transform in Transform::ALL {
        if interrupted(interrupt, &mut progress) {
            break;
        }
        let outcome = client.apply_transform(output, transform);
        progress.record(transform.to_string(), outcome.command_succeeded());
        sleep_interruptible(client.options().interval, interrupt);
    }

    info!(
        event = "core.display.restore_transform",
        output = output,
        transform = %initial_transform
    );
    let restored = client
        .apply_transform(output, initial_transform)
        .is_applied();
    progress.finish(restored)
}

/// Apply each sweep scale on the preferred mode with the normal transform,
/// then restore the initial scale.
pub fn sweep_scales(
    client: &DisplayClient<'_>,
    output: &str,
    interrupt: &AtomicBool,
) -> PhaseReport {
    let initial_scale = client
        .snapshot(output)
        .map(|display| display.scale)
        .unwrap_or(1.0);

    if let Err(e) = client.set_preferred(output) {
        warn!(
            event = "core.display.preferred_failed",
            output = output,
            error = %e,
            "Continuing with the current mode"
        );
    }
    if let ApplyOutcome::CommandFailed { error } =
        client.apply_transform(output, Transform::Normal)
    {
        warn!(
            event = "core.display.normal_transform_failed",
            output = output,
            error = error,
            "Continuing with the current transform"
        );
    }

    let mut progress = PhaseProgress::new(output, Phase::Scales, SCALE_SWEEP.len());
    for scale in SCALE_SWEEP {
        if interrupted(interrupt, &mut progress) {
            break;
        }
        let outcome = client.apply_scale(output, scale);
        progress.record(scale.to_string(), outcome.is_applied());
        sleep_interruptible(client.options().interval, interrupt);
    }

    info!(
        event = "core.display.restore_scale",
        output = output,
        scale = initial_scale
    );
    let restored = client.apply_scale(output, initial_scale).is_applied();
    if !restored {
        warn!(
            event = "core.display.restore_scale_failed",
            output = output,
            scale = initial_scale,
            tolerance = SCALE_TOLERANCE
        );
    }
    progress.finish(restored)
}

/// Run all three phases on one output, strictly in order.
pub fn test_output<F>(
    client: &DisplayClient<'_>,
    output: &str,
    interrupt: &AtomicBool,
    mut on_report: F,
) -> Vec<PhaseReport>
where
    F: FnMut(&PhaseReport),
{
    let phases: [fn(&DisplayClient<'_>, &str, &AtomicBool) -> PhaseReport; 3] =
        [sweep_modes, sweep_transforms, sweep_scales];

    let mut reports = Vec::new();
    for phase in phases {
        if interrupt.load(Ordering::SeqCst) {
            break;
        }
        let report = phase(client, output, interrupt);
        on_report(&report);
        reports.push(report);
    }
    reports
}

/// Sweep every output (or only `only_output`) in enumeration order.
///
/// An unavailable tool or unparsable output yields no reports.
pub fn run_display_test<F>(
    tool: &dyn DisplayTool,
    options: &DisplayOptions,
    only_output: Option<&str>,
    interrupt: &AtomicBool,
    mut on_report: F,
) -> Vec<PhaseReport>
where
    F: FnMut(&PhaseReport),
{
    let client = DisplayClient::new(tool, options);
    let displays = client.query();

    info!(
        event = "core.display.test_started",
        outputs = ?displays.names(),
        only_output = only_output
    );

    if let Some(name) = only_output
        && displays.get(name).is_none()
    {
        let e = DisplayError::OutputNotFound {
            name: name.to_string(),
        };
        warn!(
            event = "core.display.output_not_found",
            error = %e,
            available = ?displays.names()
        );
    }

    let mut reports = Vec::new();
    for display in displays.iter() {
        if only_output.is_some_and(|name| name != display.name) {
            continue;
        }
        if interrupt.load(Ordering::SeqCst) {
            break;
        }
        reports.extend(test_output(&client, &display.name, interrupt, &mut on_report));
    }

    info!(event = "core.display.test_completed", phases = reports.len());
    reports
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::display::operations::test_support::{FakeOutput, FakeRandr, sample_modes};
    use crate::display::types::DisplayMode;

    fn options() -> DisplayOptions {
        DisplayOptions {
            interval: Duration::ZERO,
            mode_settle: Duration::ZERO,
            scale_settle: Duration::ZERO,
            debug: false,
        }
    }

    fn run_all(tool: &FakeRandr) -> Vec<PhaseReport> {
        let opts = options();
        run_display_test(tool, &opts, None, &AtomicBool::new(false), |_| {})
    }

    #[test]
    fn test_display_options_from_config() {
        let config = DisplayConfig {
            interval_secs: Some(0.5),
            ..Default::default()
        };
        let opts = display_options(&config, true);
        assert_eq!(opts.interval, Duration::from_millis(500));
        assert_eq!(opts.mode_settle, Duration::from_secs(1));
        assert!(opts.debug);
    }

    #[test]
    fn test_mode_sweep_restores_initial_mode() {
        let mut output = FakeOutput::new("DP-1", sample_modes());
        output.current = 1;
        let tool = FakeRandr::with_outputs(vec![output]);
        let opts = options();
        let client = DisplayClient::new(&tool, &opts);

        let report = sweep_modes(&client, "DP-1", &AtomicBool::new(false));

        assert_eq!(report.attempted, 3);
        assert!(report.all_succeeded());
        assert!(report.restored);
        // The sweep ended on the last mode; restoring brings back the second
        assert_eq!(tool.output("DP-1").current, 1);
        assert_eq!(
            report.succeeded,
            vec!["1920x1080@60Hz", "1920x1080@144.001Hz", "1280x720@60Hz"]
        );
    }

    #[test]
    fn test_transform_sweep_restores_initial_transform() {
        let mut output = FakeOutput::new("DP-1", sample_modes());
        output.transform = Transform::Rotate270;
        output.current = 2;
        let tool = FakeRandr {
            rejected_transforms: vec![Transform::Flipped90],
            ..FakeRandr::with_outputs(vec![output])
        };
        let opts = options();
        let client = DisplayClient::new(&tool, &opts);

        let report = sweep_transforms(&client, "DP-1", &AtomicBool::new(false));

        assert_eq!(report.attempted, 8);
        assert_eq!(report.succeeded.len(), 7);
        assert!(!report.succeeded.contains(&"flipped-90".to_string()));
        assert!(report.restored);
        let after = tool.output("DP-1");
        assert_eq!(after.transform, Transform::Rotate270);
        // Preferred mode was set before sweeping
        assert_eq!(after.current, after.preferred);
    }

    #[test]
    fn test_scale_sweep_restores_initial_scale() {
        let tool = FakeRandr::with_outputs(vec![FakeOutput::new("DP-1", sample_modes())]);
        let opts = options();
        let client = DisplayClient::new(&tool, &opts);

        let report = sweep_scales(&client, "DP-1", &AtomicBool::new(false));

        assert_eq!(report.succeeded, vec!["0.5", "0.7", "0.9", "1.1", "1.3", "1.5"]);
        assert!(report.restored);
        assert!((tool.output("DP-1").scale - 1.0).abs() < SCALE_TOLERANCE);
    }

    #[test]
    fn test_scale_sweep_records_ignored_scales_as_failures() {
        let mut output = FakeOutput::new("DP-1", sample_modes());
        output.scale = 1.25;
        output.transform = Transform::Rotate90;
        let tool = FakeRandr {
            ignored_scales: vec![0.5, 1.3],
            ..FakeRandr::with_outputs(vec![output])
        };
        let opts = options();
        let client = DisplayClient::new(&tool, &opts);

        let report = sweep_scales(&client, "DP-1", &AtomicBool::new(false));

        assert_eq!(report.attempted, 6);
        assert_eq!(report.succeeded, vec!["0.7", "0.9", "1.1", "1.5"]);
        assert!(!report.all_succeeded());
        assert!(report.restored);
        let after = tool.output("DP-1");
        assert!((after.scale - 1.25).abs() < SCALE_TOLERANCE);
        assert_eq!(after.transform, Transform::Normal);
    }

    #[test]
    fn test_full_run_covers_outputs_in_order() {
        let tool = FakeRandr::with_outputs(vec![
            FakeOutput::new("eDP-1", sample_modes()),
            FakeOutput::new("HDMI-A-1", vec![DisplayMode::new(1024, 768, 60.0)]),
        ]);

        let reports = run_all(&tool);

        let order: Vec<(String, Phase)> = reports
            .iter()
            .map(|r| (r.output.clone(), r.phase))
            .collect();
        assert_eq!(
            order,
            vec![
                ("eDP-1".to_string(), Phase::Modes),
                ("eDP-1".to_string(), Phase::Transforms),
                ("eDP-1".to_string(), Phase::Scales),
                ("HDMI-A-1".to_string(), Phase::Modes),
                ("HDMI-A-1".to_string(), Phase::Transforms),
                ("HDMI-A-1".to_string(), Phase::Scales),
            ]
        );
        assert!(reports.iter().all(|r| r.restored));
    }

    #[test]
    fn test_only_output_filter() {
        let tool = FakeRandr::with_outputs(vec![
            FakeOutput::new("eDP-1", sample_modes()),
            FakeOutput::new("HDMI-A-1", sample_modes()),
        ]);
        let opts = options();

        let reports = run_display_test(
            &tool,
            &opts,
            Some("HDMI-A-1"),
            &AtomicBool::new(false),
            |_| {},
        );

        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.output == "HDMI-A-1"));
        assert!(
            tool.commands
                .borrow()
                .iter()
                .all(|args| args[1] == "HDMI-A-1")
        );
    }

    #[test]
    fn test_unparsable_output_runs_nothing() {
        let tool = FakeRandr {
            broken_json: true,
            ..FakeRandr::with_outputs(vec![FakeOutput::new("DP-1", sample_modes())])
        };

        assert!(run_all(&tool).is_empty());
        assert!(tool.commands.borrow().is_empty());
    }

    #[test]
    fn test_interrupt_stops_sweep_but_restores() {
        let mut output = FakeOutput::new("DP-1", sample_modes());
        output.current = 1;
        let tool = FakeRandr::with_outputs(vec![output]);
        let opts = options();
        let client = DisplayClient::new(&tool, &opts);
        let interrupt = AtomicBool::new(true);

        let report = sweep_modes(&client, "DP-1", &interrupt);

        assert!(report.interrupted);
        assert_eq!(report.attempted, 0);
        assert!(report.restored);
        assert_eq!(tool.output("DP-1").current, 1);
    }

    #[test]
    fn test_reports_are_streamed() {
        let tool = FakeRandr::with_outputs(vec![FakeOutput::new("DP-1", sample_modes())]);
        let opts = options();
        let mut seen = Vec::new();

        run_display_test(&tool, &opts, None, &AtomicBool::new(false), |report| {
            seen.push(report.phase)
        });

        assert_eq!(seen, vec![Phase::Modes, Phase::Transforms, Phase::Scales]);
    }
}
