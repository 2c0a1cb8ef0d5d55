use std::sync::atomic::AtomicBool;

use tracing::info;

use super::app_list;
use super::errors::LaunchError;
use super::launcher::SystemLauncher;
use super::runner::StressRunner;
use super::supervisor::{Supervisor, SystemProbe};
use super::types::{AppDescriptor, DEFAULT_GRACE_PERIOD, LaunchOptions, RunSummary, TickOutcome};
use crate::config::AppsConfig;

/// Resolve the launch options for a validated config.
pub fn launch_options(config: &AppsConfig) -> LaunchOptions {
    LaunchOptions {
        interval: config.interval(),
        max_processes: config.max_processes(),
        duration: config.duration(),
        grace_period: DEFAULT_GRACE_PERIOD,
    }
}

/// The app list named by the config, or the built-in one.
pub fn resolve_app_list(config: &AppsConfig) -> Vec<AppDescriptor> {
    app_list::load_app_list_or_default(config.app_list())
}

/// Run a launch stress test against real processes.
///
/// `on_tick` observes every loop iteration, e.g. to print progress.
pub fn run_launch_test<F>(
    config: &AppsConfig,
    apps: Vec<AppDescriptor>,
    interrupt: &AtomicBool,
    on_tick: F,
) -> Result<RunSummary, LaunchError>
where
    F: FnMut(&TickOutcome),
{
    info!(
        event = "core.apps.test_started",
        supervise = config.supervise(),
        compositor = config.compositor()
    );

    let mut runner = StressRunner::new(apps, launch_options(config), Box::new(SystemLauncher))?;
    if config.supervise() {
        runner =
            runner.with_supervisor(Supervisor::attach(config.compositor(), Box::new(SystemProbe)));
    }

    Ok(runner.run(interrupt, on_tick))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::types::RunMode;
    use std::time::Duration;

    #[test]
    fn test_launch_options_from_defaults() {
        let options = launch_options(&AppsConfig::default());
        assert_eq!(options.interval, Duration::from_millis(100));
        assert_eq!(options.max_processes, 10);
        assert_eq!(options.duration, None);
        assert_eq!(options.grace_period, Duration::from_secs(3));
    }

    #[test]
    fn test_run_launch_test_with_real_processes() {
        let config = AppsConfig {
            interval_secs: Some(0.02),
            max_processes: Some(2),
            duration_secs: Some(1),
            supervise: Some(false),
            ..Default::default()
        };
        let apps = vec![AppDescriptor::new("sleeper", "sleep 30", "test")];
        let interrupt = AtomicBool::new(false);

        let mut peak = 0;
        let summary = run_launch_test(&config, apps, &interrupt, |outcome| {
            if let TickOutcome::Launched { running, .. } = outcome {
                peak = peak.max(*running);
            }
        })
        .unwrap();

        assert!(summary.launches > 2);
        assert_eq!(peak, 2);
        assert_eq!(summary.mode, RunMode::Running);
        assert_eq!(summary.cleanup.terminated + summary.cleanup.killed, 2);
    }
}
