use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::launcher::ProcessHandle;
use super::types::{CleanupReport, StopOutcome};

/// A launched process the tester still owns.
pub struct TrackedProcess {
    pub pid: u32,
    pub name: String,
    pub launched_at: Instant,
    handle: Box<dyn ProcessHandle>,
}

impl std::fmt::Debug for TrackedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedProcess")
            .field("pid", &self.pid)
            .field("name", &self.name)
            .field("launched_at", &self.launched_at)
            .finish_non_exhaustive()
    }
}

/// Launched processes in insertion order, oldest first.
#[derive(Debug, Default)]
pub struct ProcessTracker {
    entries: VecDeque<TrackedProcess>,
}

impl ProcessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, handle: Box<dyn ProcessHandle>) {
        self.entries.push_back(TrackedProcess {
            pid: handle.pid(),
            name: name.to_string(),
            launched_at: Instant::now(),
            handle,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked pids, oldest first.
    pub fn pids(&self) -> Vec<u32> {
        self.entries.iter().map(|entry| entry.pid).collect()
    }

    /// (pid, app name) pairs, oldest first.
    pub fn snapshot(&self) -> Vec<(u32, String)> {
        self.entries
            .iter()
            .map(|entry| (entry.pid, entry.name.clone()))
            .collect()
    }

    /// Drop entries whose process has already exited.
    ///
    /// An entry whose status cannot be read is kept; it will be retried on
    /// the next pass or stopped by eviction or cleanup.
    pub fn reap_exited(&mut self) -> Vec<u32> {
        let mut reaped = Vec::new();
        self.entries.retain_mut(|entry| match entry.handle.has_exited() {
            Ok(true) => {
                reaped.push(entry.pid);
                false
            }
            Ok(false) => true,
            Err(e) => {
                warn!(
                    event = "core.apps.exit_check_failed",
                    pid = entry.pid,
                    error = %e
                );
                true
            }
        });

        if !reaped.is_empty() {
            info!(
                event = "core.apps.reaped_exited",
                count = reaped.len(),
                remaining = self.entries.len()
            );
        }
        reaped
    }

    /// Make room for one more launch.
    ///
    /// Reaps exited processes, then stops the oldest entries until fewer
    /// than `max_processes` remain. Returns the evicted pids in eviction
    /// order.
    pub fn enforce_cap(&mut self, max_processes: usize, grace_period: Duration) -> Vec<u32> {
        self.reap_exited();

        let mut evicted = Vec::new();
        while self.entries.len() >= max_processes {
            let Some(mut oldest) = self.entries.pop_front() else {
                break;
            };
            let outcome = stop_process(&mut oldest, grace_period);
            info!(
                event = "core.apps.evicted_oldest",
                pid = oldest.pid,
                app = oldest.name,
                age_ms = oldest.launched_at.elapsed().as_millis() as u64,
                outcome = ?outcome,
                remaining = self.entries.len()
            );
            evicted.push(oldest.pid);
        }
        evicted
    }

    /// Stop every tracked process and empty the tracker.
    pub fn cleanup(&mut self, grace_period: Duration) -> CleanupReport {
        info!(event = "core.apps.cleanup_started", count = self.entries.len());

        let mut report = CleanupReport::default();
        while let Some(mut entry) = self.entries.pop_front() {
            match stop_process(&mut entry, grace_period) {
                StopOutcome::Terminated => report.terminated += 1,
                StopOutcome::Killed => report.killed += 1,
                StopOutcome::Failed => report.failed += 1,
            }
        }

        info!(
            event = "core.apps.cleanup_completed",
            terminated = report.terminated,
            killed = report.killed,
            failed = report.failed
        );
        report
    }
}

/// SIGTERM, wait up to `grace_period`, then SIGKILL.
///
/// Failures are logged and never propagate: the caller drops the entry
/// whatever the outcome.
fn stop_process(entry: &mut TrackedProcess, grace_period: Duration) -> StopOutcome {
    if let Err(e) = entry.handle.terminate() {
        warn!(
            event = "core.apps.terminate_failed",
            pid = entry.pid,
            app = entry.name,
            error = %e
        );
    }

    match entry.handle.wait_timeout(grace_period) {
        Ok(true) => return StopOutcome::Terminated,
        Ok(false) => {
            warn!(
                event = "core.apps.terminate_timed_out",
                pid = entry.pid,
                app = entry.name,
                grace_ms = grace_period.as_millis() as u64
            );
        }
        Err(e) => {
            warn!(
                event = "core.apps.wait_failed",
                pid = entry.pid,
                app = entry.name,
                error = %e
            );
        }
    }

    match entry.handle.kill() {
        Ok(()) => StopOutcome::Killed,
        Err(e) => {
            warn!(
                event = "core.apps.kill_failed",
                pid = entry.pid,
                app = entry.name,
                error = %e
            );
            StopOutcome::Failed
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::apps::launcher::ProcessHandle;
    use crate::process::ProcessError;

    /// Signals received by a [`FakeHandle`], shared with the test.
    #[derive(Debug, Default)]
    pub(crate) struct FakeState {
        pub exited: bool,
        pub terminated: bool,
        pub killed: bool,
        /// Whether SIGTERM makes the process exit.
        pub ignores_terminate: bool,
        pub fail_terminate: bool,
    }

    pub(crate) struct FakeHandle {
        pub pid: u32,
        pub state: Rc<RefCell<FakeState>>,
    }

    impl FakeHandle {
        pub(crate) fn new(pid: u32) -> (Self, Rc<RefCell<FakeState>>) {
            let state = Rc::new(RefCell::new(FakeState::default()));
            (
                Self {
                    pid,
                    state: Rc::clone(&state),
                },
                state,
            )
        }
    }

    impl ProcessHandle for FakeHandle {
        fn pid(&self) -> u32 {
            self.pid
        }

        fn has_exited(&mut self) -> Result<bool, ProcessError> {
            Ok(self.state.borrow().exited)
        }

        fn terminate(&mut self) -> Result<(), ProcessError> {
            let mut state = self.state.borrow_mut();
            state.terminated = true;
            if state.fail_terminate {
                return Err(ProcessError::AccessDenied { pid: self.pid });
            }
            if !state.ignores_terminate {
                state.exited = true;
            }
            Ok(())
        }

        fn wait_timeout(&mut self, _timeout: Duration) -> Result<bool, ProcessError> {
            Ok(self.state.borrow().exited)
        }

        fn kill(&mut self) -> Result<(), ProcessError> {
            let mut state = self.state.borrow_mut();
            state.killed = true;
            state.exited = true;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FakeHandle;
    use super::*;

    const GRACE: Duration = Duration::from_millis(10);

    fn tracker_with(pids: &[u32]) -> ProcessTracker {
        let mut tracker = ProcessTracker::new();
        for pid in pids {
            let (handle, _) = FakeHandle::new(*pid);
            tracker.insert(&format!("app-{pid}"), Box::new(handle));
        }
        tracker
    }

    #[test]
    fn test_enforce_cap_evicts_oldest_first() {
        let mut tracker = tracker_with(&[10, 20, 30]);

        let evicted = tracker.enforce_cap(3, GRACE);

        assert_eq!(evicted, vec![10]);
        assert_eq!(tracker.pids(), vec![20, 30]);
    }

    #[test]
    fn test_enforce_cap_leaves_room_for_one_launch() {
        for max in 1..6 {
            let mut tracker = tracker_with(&[1, 2, 3, 4, 5, 6, 7]);
            tracker.enforce_cap(max, GRACE);
            assert_eq!(tracker.len(), max - 1, "max = {max}");
            // Survivors are always the newest entries
            let expected: Vec<u32> = (9 - max as u32..=7).collect();
            assert_eq!(tracker.pids(), expected, "max = {max}");
        }
    }

    #[test]
    fn test_enforce_cap_reaps_exited_before_evicting() {
        let mut tracker = ProcessTracker::new();
        let (old, _) = FakeHandle::new(1);
        let (dead, dead_state) = FakeHandle::new(2);
        let (young, _) = FakeHandle::new(3);
        tracker.insert("old", Box::new(old));
        tracker.insert("dead", Box::new(dead));
        tracker.insert("young", Box::new(young));
        dead_state.borrow_mut().exited = true;

        let evicted = tracker.enforce_cap(3, GRACE);

        assert!(evicted.is_empty());
        assert_eq!(tracker.pids(), vec![1, 3]);
    }

    #[test]
    fn test_enforce_cap_zero_does_not_spin() {
        let mut tracker = tracker_with(&[1, 2]);
        tracker.enforce_cap(0, GRACE);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_stubborn_process_is_killed() {
        let mut tracker = ProcessTracker::new();
        let (handle, state) = FakeHandle::new(7);
        state.borrow_mut().ignores_terminate = true;
        tracker.insert("stubborn", Box::new(handle));

        let report = tracker.cleanup(GRACE);

        assert_eq!(report.killed, 1);
        assert!(state.borrow().terminated);
        assert!(state.borrow().killed);
    }

    #[test]
    fn test_terminate_failure_still_removes_entry() {
        let mut tracker = ProcessTracker::new();
        let (handle, state) = FakeHandle::new(8);
        state.borrow_mut().fail_terminate = true;
        tracker.insert("locked", Box::new(handle));

        let evicted = tracker.enforce_cap(1, GRACE);

        assert_eq!(evicted, vec![8]);
        assert!(tracker.is_empty());
        assert!(state.borrow().killed);
    }

    #[test]
    fn test_cleanup_signals_everything_and_empties() {
        let mut tracker = ProcessTracker::new();
        let mut states = Vec::new();
        for pid in 1..=4 {
            let (handle, state) = FakeHandle::new(pid);
            if pid % 2 == 0 {
                state.borrow_mut().ignores_terminate = true;
            }
            tracker.insert("app", Box::new(handle));
            states.push(state);
        }

        let report = tracker.cleanup(GRACE);

        assert!(tracker.is_empty());
        assert_eq!(report.terminated, 2);
        assert_eq!(report.killed, 2);
        for state in states {
            let state = state.borrow();
            assert!(state.terminated || state.killed);
        }
    }
}
