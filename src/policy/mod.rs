//! Policy model: ordered actions plus the configuration that shapes them

pub mod action;
pub mod config;
pub mod defaults;

pub use action::{Action, ActionKind, Hook, UnitDefinition};
pub use config::{PolicyConfig, DEFAULT_CONFIG_PATH};
pub use defaults::{printer_policy, WatchdogCommand};

use serde::{Deserialize, Serialize};

/// A named, ordered list of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Policy {
    /// Process patterns of every kill action, in policy order
    pub fn process_patterns(&self) -> Vec<String> {
        self.actions
            .iter()
            .filter_map(|a| match &a.kind {
                ActionKind::KillProcess { patterns } => Some(patterns.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}
