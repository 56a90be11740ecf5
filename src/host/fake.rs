//! In-memory host used by tests

use crate::error::{GuardError, Result};
use crate::host::{ActiveState, Enablement, Host, ProcessEntry, UnitState};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct FakeHost {
    units: RefCell<BTreeMap<String, UnitState>>,
    processes: RefCell<Vec<ProcessEntry>>,
    failing_programs: BTreeSet<String>,
    failing_units: BTreeSet<String>,
    failing_pids: BTreeSet<u32>,
    /// Every mutating call, in order
    pub calls: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(self, unit: &str, active: ActiveState, enablement: Enablement) -> Self {
        self.units
            .borrow_mut()
            .insert(unit.to_string(), UnitState { active, enablement });
        self
    }

    pub fn with_process(self, pid: u32, name: &str, cmd: &[&str]) -> Self {
        self.processes.borrow_mut().push(ProcessEntry {
            pid,
            name: name.to_string(),
            cmd: cmd.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Make `run` fail for this program
    pub fn failing_program(mut self, program: &str) -> Self {
        self.failing_programs.insert(program.to_string());
        self
    }

    /// Make every systemctl mutation on this unit fail
    pub fn failing_unit(mut self, unit: &str) -> Self {
        self.failing_units.insert(unit.to_string());
        self
    }

    /// Make SIGTERM to this pid fail
    pub fn failing_pid(mut self, pid: u32) -> Self {
        self.failing_pids.insert(pid);
        self
    }

    pub fn state(&self, unit: &str) -> UnitState {
        self.units
            .borrow()
            .get(unit)
            .copied()
            .unwrap_or_else(UnitState::absent)
    }

    pub fn running_pids(&self) -> Vec<u32> {
        self.processes.borrow().iter().map(|p| p.pid).collect()
    }

    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn mutate(&self, verb: &str, unit: &str, apply: impl FnOnce(&mut UnitState)) -> Result<()> {
        self.record(format!("{} {}", verb, unit));
        if self.failing_units.contains(unit) {
            return Err(GuardError::CommandFailed {
                program: format!("systemctl {} {}", verb, unit),
                code: 1,
                stderr: "simulated failure".to_string(),
            });
        }
        let mut units = self.units.borrow_mut();
        let state = units.entry(unit.to_string()).or_insert_with(UnitState::absent);
        apply(state);
        Ok(())
    }
}

impl Host for FakeHost {
    fn unit_state(&self, unit: &str) -> Result<UnitState> {
        Ok(self.state(unit))
    }

    fn stop_unit(&self, unit: &str) -> Result<()> {
        self.mutate("stop", unit, |s| s.active = ActiveState::Inactive)
    }

    fn start_unit(&self, unit: &str) -> Result<()> {
        self.mutate("start", unit, |s| s.active = ActiveState::Active)
    }

    fn restart_unit(&self, unit: &str) -> Result<()> {
        self.mutate("restart", unit, |s| s.active = ActiveState::Active)
    }

    fn disable_unit(&self, unit: &str) -> Result<()> {
        self.mutate("disable", unit, |s| s.enablement = Enablement::Disabled)
    }

    fn mask_unit(&self, unit: &str) -> Result<()> {
        self.mutate("mask", unit, |s| s.enablement = Enablement::Masked)
    }

    fn enable_unit(&self, unit: &str) -> Result<()> {
        self.mutate("enable", unit, |s| s.enablement = Enablement::Enabled)
    }

    fn daemon_reload(&self) -> Result<()> {
        self.record("daemon-reload".to_string());
        Ok(())
    }

    fn processes(&self) -> Result<Vec<ProcessEntry>> {
        Ok(self.processes.borrow().clone())
    }

    fn terminate(&self, pid: u32) -> Result<bool> {
        self.record(format!("kill {}", pid));
        if self.failing_pids.contains(&pid) {
            return Err(GuardError::PermissionDenied(format!(
                "could not signal PID {}",
                pid
            )));
        }
        let mut processes = self.processes.borrow_mut();
        let before = processes.len();
        processes.retain(|p| p.pid != pid);
        Ok(processes.len() < before)
    }

    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        self.record(format!("run {} {}", program, args.join(" ")).trim_end().to_string());
        if self.failing_programs.contains(program) {
            return Err(GuardError::CommandFailed {
                program: program.to_string(),
                code: 1,
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}
