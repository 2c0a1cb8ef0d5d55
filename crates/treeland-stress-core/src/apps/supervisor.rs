use tracing::{debug, error, info, warn};

use crate::process;

/// Looks up and probes the supervised process.
pub trait ProcessProbe {
    fn find_by_name(&self, name: &str) -> Option<u32>;
    fn is_alive(&self, pid: u32) -> bool;
}

/// [`ProcessProbe`] backed by the system process table.
#[derive(Debug, Default)]
pub struct SystemProbe;

impl ProcessProbe for SystemProbe {
    fn find_by_name(&self, name: &str) -> Option<u32> {
        match process::find_process_by_name(name) {
            Ok(info) => info.map(|info| {
                debug!(
                    event = "core.supervisor.process_matched",
                    name = name,
                    process_name = info.name,
                    pid = info.pid.as_u32()
                );
                info.pid.as_u32()
            }),
            Err(e) => {
                warn!(event = "core.supervisor.lookup_failed", name = name, error = %e);
                None
            }
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        match process::is_process_running(pid) {
            Ok(running) => running,
            Err(e) => {
                // An unreadable process table is not proof of death
                warn!(event = "core.supervisor.probe_failed", pid = pid, error = %e);
                true
            }
        }
    }
}

/// Result of one supervision check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorCheck {
    /// The process was never found; nothing is supervised.
    Unattached,
    Alive { pid: u32 },
    /// First tick on which the process is gone.
    Disappeared { pid: u32 },
    /// Gone on an earlier tick.
    Lost { pid: u32 },
}

/// Watches the compositor process for disappearance.
///
/// The pid is resolved once, when the supervisor is attached, and cached.
pub struct Supervisor {
    name: String,
    pid: Option<u32>,
    lost: bool,
    probe: Box<dyn ProcessProbe>,
}

impl Supervisor {
    pub fn attach(name: &str, probe: Box<dyn ProcessProbe>) -> Self {
        let pid = probe.find_by_name(name);
        match pid {
            Some(pid) => info!(event = "core.supervisor.attached", name = name, pid = pid),
            None => warn!(
                event = "core.supervisor.not_found",
                name = name,
                "Supervised process not found, launches will not be frozen"
            ),
        }

        Self {
            name: name.to_string(),
            pid,
            lost: false,
            probe,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn check(&mut self) -> SupervisorCheck {
        let Some(pid) = self.pid else {
            return SupervisorCheck::Unattached;
        };

        if self.lost {
            return SupervisorCheck::Lost { pid };
        }

        if self.probe.is_alive(pid) {
            return SupervisorCheck::Alive { pid };
        }

        self.lost = true;
        error!(event = "core.supervisor.process_disappeared", name = self.name, pid = pid);
        SupervisorCheck::Disappeared { pid }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeProbe;
    use super::*;

    #[test]
    fn test_unattached_when_not_found() {
        let (probe, _) = FakeProbe::new(None);
        let mut supervisor = Supervisor::attach("treeland", Box::new(probe));
        assert_eq!(supervisor.pid(), None);
        assert_eq!(supervisor.check(), SupervisorCheck::Unattached);
    }

    #[test]
    fn test_disappearance_reported_once() {
        let (probe, alive) = FakeProbe::new(Some(42));
        let mut supervisor = Supervisor::attach("treeland", Box::new(probe));

        assert_eq!(supervisor.check(), SupervisorCheck::Alive { pid: 42 });

        alive.set(false);
        assert_eq!(supervisor.check(), SupervisorCheck::Disappeared { pid: 42 });
        assert_eq!(supervisor.check(), SupervisorCheck::Lost { pid: 42 });

        // Coming back does not undo the loss
        alive.set(true);
        assert_eq!(supervisor.check(), SupervisorCheck::Lost { pid: 42 });
    }

    #[test]
    fn test_system_probe_finds_nothing_for_unknown_name() {
        let probe = SystemProbe;
        assert_eq!(probe.find_by_name("nonexistent-compositor-xyz"), None);
        assert!(!probe.is_alive(999999));
    }
}
