//! Host collaborator: service manager, process table and command runner
//!
//! The enforcer never models host state itself. It asks the [`Host`] and
//! issues commands against it.

pub mod system;

#[cfg(test)]
pub mod fake;

pub use system::SystemHost;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Runtime state reported by `systemctl is-active`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveState {
    Active,
    Activating,
    Reloading,
    Deactivating,
    Inactive,
    Failed,
    Unknown,
}

impl ActiveState {
    pub fn parse(output: &str) -> Self {
        match output.lines().next().unwrap_or("").trim() {
            "active" => ActiveState::Active,
            "activating" => ActiveState::Activating,
            "reloading" => ActiveState::Reloading,
            "deactivating" => ActiveState::Deactivating,
            "inactive" => ActiveState::Inactive,
            "failed" => ActiveState::Failed,
            _ => ActiveState::Unknown,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self,
            ActiveState::Active | ActiveState::Activating | ActiveState::Reloading
        )
    }
}

/// Unit file state reported by `systemctl is-enabled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enablement {
    Enabled,
    Disabled,
    Masked,
    /// static, indirect, generated, transient or alias units
    Static,
    NotFound,
}

impl Enablement {
    pub fn parse(output: &str) -> Self {
        match output.lines().next().unwrap_or("").trim() {
            "enabled" | "enabled-runtime" | "linked" | "linked-runtime" => Enablement::Enabled,
            "disabled" => Enablement::Disabled,
            "masked" | "masked-runtime" => Enablement::Masked,
            "static" | "indirect" | "generated" | "transient" | "alias" => Enablement::Static,
            _ => Enablement::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    pub active: ActiveState,
    pub enablement: Enablement,
}

impl UnitState {
    pub fn absent() -> Self {
        Self {
            active: ActiveState::Inactive,
            enablement: Enablement::NotFound,
        }
    }
}

/// A process visible in the host's process table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub cmd: Vec<String>,
}

/// Operations the enforcer and the watchdog issue against the host
pub trait Host {
    fn unit_state(&self, unit: &str) -> Result<UnitState>;
    fn stop_unit(&self, unit: &str) -> Result<()>;
    fn start_unit(&self, unit: &str) -> Result<()>;
    fn restart_unit(&self, unit: &str) -> Result<()>;
    fn disable_unit(&self, unit: &str) -> Result<()>;
    fn mask_unit(&self, unit: &str) -> Result<()>;
    fn enable_unit(&self, unit: &str) -> Result<()>;
    fn daemon_reload(&self) -> Result<()>;

    /// Snapshot of running processes
    fn processes(&self) -> Result<Vec<ProcessEntry>>;
    /// Send SIGTERM; `Ok(false)` when the process is already gone
    fn terminate(&self, pid: u32) -> Result<bool>;

    /// Run an arbitrary follow-up command
    fn run(&self, program: &str, args: &[String]) -> Result<()>;
}
