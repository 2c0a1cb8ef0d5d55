use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Local;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{error, info, warn};

use super::errors::LaunchError;
use super::launcher::Launcher;
use super::supervisor::{Supervisor, SupervisorCheck};
use super::tracker::ProcessTracker;
use super::types::{
    AppDescriptor, CleanupReport, FreezeReport, LaunchOptions, RunMode, RunSummary, TickOutcome,
};

/// Longest uninterrupted sleep, so Ctrl+C is honoured promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Drives the launch loop: supervise, make room, launch, sleep.
pub struct StressRunner {
    apps: Vec<AppDescriptor>,
    options: LaunchOptions,
    launcher: Box<dyn Launcher>,
    tracker: ProcessTracker,
    supervisor: Option<Supervisor>,
    mode: RunMode,
    rng: StdRng,
    launches: usize,
}

impl StressRunner {
    pub fn new(
        apps: Vec<AppDescriptor>,
        options: LaunchOptions,
        launcher: Box<dyn Launcher>,
    ) -> Result<Self, LaunchError> {
        if apps.is_empty() {
            return Err(LaunchError::EmptyAppList);
        }

        Ok(Self {
            apps,
            options,
            launcher,
            tracker: ProcessTracker::new(),
            supervisor: None,
            mode: RunMode::Running,
            rng: StdRng::from_entropy(),
            launches: 0,
        })
    }

    pub fn with_supervisor(mut self, supervisor: Supervisor) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn launches(&self) -> usize {
        self.launches
    }

    pub fn tracker(&self) -> &ProcessTracker {
        &self.tracker
    }

    /// One loop iteration, without the trailing sleep.
    pub fn tick(&mut self) -> TickOutcome {
        if self.mode == RunMode::Running
            && let Some(report) = self.check_supervisor()
        {
            self.mode = RunMode::Frozen;
            return TickOutcome::Froze(report);
        }

        if self.mode == RunMode::Frozen {
            return TickOutcome::Suppressed;
        }

        self.tracker
            .enforce_cap(self.options.max_processes, self.options.grace_period);

        // apps is never empty, see new()
        let Some(app) = self.apps.choose(&mut self.rng).cloned() else {
            return TickOutcome::Suppressed;
        };

        match self.launcher.launch(&app) {
            Ok(handle) => {
                let pid = handle.pid();
                self.tracker.insert(&app.name, handle);
                self.launches += 1;
                TickOutcome::Launched {
                    name: app.name,
                    pid,
                    launches: self.launches,
                    running: self.tracker.len(),
                }
            }
            Err(e) => {
                warn!(event = "core.apps.launch_failed", app = app.name, error = %e);
                TickOutcome::LaunchFailed {
                    name: app.name,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Returns a freeze report on the tick the supervised process vanishes.
    fn check_supervisor(&mut self) -> Option<FreezeReport> {
        let supervisor = self.supervisor.as_mut()?;
        let SupervisorCheck::Disappeared { pid } = supervisor.check() else {
            return None;
        };

        let report = FreezeReport {
            detected_at: Local::now(),
            compositor: supervisor.name().to_string(),
            compositor_pid: pid,
            still_tracked: self.tracker.snapshot(),
        };

        error!(
            event = "core.apps.frozen",
            compositor = report.compositor,
            compositor_pid = pid,
            detected_at = %report.detected_at.to_rfc3339(),
            tracked_pids = ?self.tracker.pids(),
            "Compositor disappeared, suspending launches until interrupted"
        );

        Some(report)
    }

    /// Run until interrupted or the duration bound elapses, then clean up.
    ///
    /// The duration bound no longer applies once frozen: only an interrupt
    /// ends a frozen run.
    pub fn run<F>(&mut self, interrupt: &AtomicBool, mut on_tick: F) -> RunSummary
    where
        F: FnMut(&TickOutcome),
    {
        let started = Instant::now();
        info!(
            event = "core.apps.run_started",
            interval_ms = self.options.interval.as_millis() as u64,
            max_processes = self.options.max_processes,
            duration_secs = self.options.duration.map(|d| d.as_secs()),
            app_count = self.apps.len()
        );

        loop {
            if interrupt.load(Ordering::SeqCst) {
                info!(event = "core.apps.run_interrupted");
                break;
            }

            if self.mode == RunMode::Running
                && let Some(limit) = self.options.duration
                && started.elapsed() >= limit
            {
                info!(event = "core.apps.duration_elapsed");
                break;
            }

            let outcome = self.tick();
            on_tick(&outcome);

            sleep_interruptible(self.options.interval, interrupt);
        }

        let cleanup = self.cleanup();
        let summary = RunSummary {
            elapsed: started.elapsed(),
            launches: self.launches,
            mode: self.mode,
            cleanup,
        };

        info!(
            event = "core.apps.run_completed",
            elapsed_ms = summary.elapsed.as_millis() as u64,
            launches = summary.launches,
            mode = %summary.mode
        );
        summary
    }

    /// Stop every tracked process, unless frozen.
    ///
    /// A frozen run leaves its processes alone so the state at the moment the
    /// compositor vanished can be inspected.
    pub fn cleanup(&mut self) -> CleanupReport {
        if self.mode == RunMode::Frozen {
            warn!(
                event = "core.apps.cleanup_skipped_frozen",
                tracked = self.tracker.len()
            );
            return CleanupReport {
                skipped: true,
                ..Default::default()
            };
        }
        self.tracker.cleanup(self.options.grace_period)
    }
}

/// Sleep for `duration`, returning early once `interrupt` is set.
pub fn sleep_interruptible(duration: Duration, interrupt: &AtomicBool) {
    let deadline = Instant::now() + duration;
    loop {
        if interrupt.load(Ordering::SeqCst) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::apps::launcher::ProcessHandle;
    use crate::apps::supervisor::test_support::FakeProbe;
    use crate::apps::tracker::test_support::{FakeHandle, FakeState};

    /// Hands out fake handles with increasing pids and records launches.
    #[derive(Default)]
    struct FakeLauncher {
        next_pid: u32,
        launched: Rc<RefCell<Vec<String>>>,
        states: Rc<RefCell<Vec<Rc<RefCell<FakeState>>>>>,
        fail_for: Option<String>,
    }

    impl Launcher for FakeLauncher {
        fn launch(
            &mut self,
            app: &AppDescriptor,
        ) -> Result<Box<dyn ProcessHandle>, LaunchError> {
            if self.fail_for.as_deref() == Some(app.name.as_str()) {
                return Err(LaunchError::SpawnFailed {
                    name: app.name.clone(),
                    command: app.command.clone(),
                    message: "not installed".to_string(),
                });
            }
            self.next_pid += 1;
            let (handle, state) = FakeHandle::new(self.next_pid);
            self.launched.borrow_mut().push(app.name.clone());
            self.states.borrow_mut().push(state);
            Ok(Box::new(handle))
        }
    }

    fn options(max_processes: usize) -> LaunchOptions {
        LaunchOptions {
            interval: Duration::ZERO,
            max_processes,
            duration: None,
            grace_period: Duration::ZERO,
        }
    }

    fn single_app(name: &str) -> Vec<AppDescriptor> {
        vec![AppDescriptor::new(name, name, "test")]
    }

    #[test]
    fn test_empty_app_list_rejected() {
        let result = StressRunner::new(vec![], options(2), Box::new(FakeLauncher::default()));
        assert!(matches!(result, Err(LaunchError::EmptyAppList)));
    }

    #[test]
    fn test_cap_scenario_evicts_first_launch() {
        // Launches A, B, C with a cap of two: A goes, B and C stay.
        let launcher = FakeLauncher::default();
        let states = Rc::clone(&launcher.states);
        let mut runner = StressRunner::new(single_app("app"), options(2), Box::new(launcher))
            .unwrap();

        for _ in 0..3 {
            assert!(matches!(runner.tick(), TickOutcome::Launched { .. }));
        }

        assert_eq!(runner.tracker().pids(), vec![2, 3]);
        let states = states.borrow();
        assert!(states[0].borrow().terminated);
        assert!(!states[1].borrow().terminated);
        assert!(!states[2].borrow().terminated);
    }

    #[test]
    fn test_tracked_count_never_exceeds_cap() {
        for max in 1..5 {
            let mut runner =
                StressRunner::new(single_app("app"), options(max), Box::new(FakeLauncher::default()))
                    .unwrap();
            for _ in 0..20 {
                runner.tick();
                assert!(runner.tracker().len() <= max);
            }
            assert_eq!(runner.launches(), 20);
        }
    }

    #[test]
    fn test_launch_failure_is_not_fatal() {
        let launcher = FakeLauncher {
            fail_for: Some("broken".to_string()),
            ..Default::default()
        };
        let apps = vec![
            AppDescriptor::new("broken", "broken", "test"),
            AppDescriptor::new("ok", "ok", "test"),
        ];
        let mut runner = StressRunner::new(apps, options(3), Box::new(launcher))
            .unwrap()
            .with_rng(StdRng::seed_from_u64(7));

        let mut failed = 0;
        for _ in 0..30 {
            if let TickOutcome::LaunchFailed { name, .. } = runner.tick() {
                assert_eq!(name, "broken");
                failed += 1;
            }
        }

        assert!(failed > 0);
        assert_eq!(runner.launches(), 30 - failed);
    }

    #[test]
    fn test_choice_covers_every_app() {
        let launcher = FakeLauncher::default();
        let launched = Rc::clone(&launcher.launched);
        let apps = vec![
            AppDescriptor::new("a", "a", "test"),
            AppDescriptor::new("b", "b", "test"),
            AppDescriptor::new("c", "c", "test"),
        ];
        let mut runner = StressRunner::new(apps, options(100), Box::new(launcher))
            .unwrap()
            .with_rng(StdRng::seed_from_u64(1));

        for _ in 0..90 {
            runner.tick();
        }

        let launched = launched.borrow();
        for name in ["a", "b", "c"] {
            assert!(launched.iter().any(|n| n == name), "{name} never launched");
        }
    }

    #[test]
    fn test_no_launch_after_compositor_disappears() {
        let launcher = FakeLauncher::default();
        let launched = Rc::clone(&launcher.launched);
        let (probe, alive) = FakeProbe::new(Some(500));
        let mut runner = StressRunner::new(single_app("app"), options(10), Box::new(launcher))
            .unwrap()
            .with_supervisor(Supervisor::attach("treeland", Box::new(probe)));

        runner.tick();
        runner.tick();
        assert_eq!(launched.borrow().len(), 2);

        alive.set(false);
        match runner.tick() {
            TickOutcome::Froze(report) => {
                assert_eq!(report.compositor, "treeland");
                assert_eq!(report.compositor_pid, 500);
                let pids: Vec<u32> = report.still_tracked.iter().map(|(pid, _)| *pid).collect();
                assert_eq!(pids, vec![1, 2]);
            }
            other => panic!("expected freeze, got {other:?}"),
        }
        assert_eq!(runner.mode(), RunMode::Frozen);

        alive.set(true);
        for _ in 0..100 {
            assert!(matches!(runner.tick(), TickOutcome::Suppressed));
        }
        assert_eq!(launched.borrow().len(), 2);
        assert_eq!(runner.launches(), 2);
    }

    #[test]
    fn test_frozen_run_skips_cleanup() {
        let launcher = FakeLauncher::default();
        let states = Rc::clone(&launcher.states);
        let (probe, alive) = FakeProbe::new(Some(500));
        let mut runner = StressRunner::new(single_app("app"), options(10), Box::new(launcher))
            .unwrap()
            .with_supervisor(Supervisor::attach("treeland", Box::new(probe)));

        runner.tick();
        alive.set(false);
        runner.tick();

        let report = runner.cleanup();
        assert!(report.skipped);
        assert_eq!(runner.tracker().len(), 1);
        assert!(!states.borrow()[0].borrow().terminated);
    }

    #[test]
    fn test_run_stops_on_duration_and_cleans_up() {
        let launcher = FakeLauncher::default();
        let states = Rc::clone(&launcher.states);
        let mut opts = options(3);
        opts.interval = Duration::from_millis(5);
        opts.duration = Some(Duration::from_millis(60));
        let mut runner = StressRunner::new(single_app("app"), opts, Box::new(launcher)).unwrap();

        let ticks = Cell::new(0);
        let interrupt = AtomicBool::new(false);
        let summary = runner.run(&interrupt, |_| ticks.set(ticks.get() + 1));

        assert!(summary.launches > 0);
        assert_eq!(summary.launches, ticks.get());
        assert_eq!(summary.mode, RunMode::Running);
        assert!(!summary.cleanup.skipped);
        assert!(runner.tracker().is_empty());
        // Every handle still alive at the end was signalled
        for state in states.borrow().iter() {
            let state = state.borrow();
            assert!(state.terminated || state.killed);
        }
    }

    #[test]
    fn test_run_returns_immediately_when_interrupted() {
        let mut runner =
            StressRunner::new(single_app("app"), options(3), Box::new(FakeLauncher::default()))
                .unwrap();
        let interrupt = AtomicBool::new(true);

        let summary = runner.run(&interrupt, |_| panic!("no tick expected"));

        assert_eq!(summary.launches, 0);
        assert_eq!(summary.average_interval(), None);
    }

    #[test]
    fn test_sleep_interruptible_returns_early() {
        let interrupt = AtomicBool::new(true);
        let started = Instant::now();
        sleep_interruptible(Duration::from_secs(10), &interrupt);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
