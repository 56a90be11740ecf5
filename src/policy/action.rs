//! Action definitions
//!
//! An [`Action`] is one idempotent change to the host. Actions are defined
//! statically and applied in order by the enforcer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One idempotent change against the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Human readable name shown in reports
    pub name: String,
    /// What the action does
    pub kind: ActionKind,
    /// A failed critical action aborts the rest of the run
    #[serde(default)]
    pub critical: bool,
    /// Hooks queued when this action changes the host
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notify: Vec<Hook>,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            critical: false,
            notify: Vec::new(),
        }
    }

    /// Mark the action as critical
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Queue a hook to run once the action has changed something
    pub fn notify(mut self, hook: Hook) -> Self {
        self.notify.push(hook);
        self
    }

    /// Every action is safe to repeat.
    pub fn idempotent(&self) -> bool {
        true
    }

    /// The unit, path or pattern the action operates on
    pub fn target(&self) -> String {
        self.kind.target()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    StopService { unit: String },
    DisableService { unit: String },
    MaskService { unit: String },
    StartService { unit: String },
    KillProcess { patterns: Vec<String> },
    /// Glob pattern, resolved under the enforcement root
    RemoveFile { pattern: String },
    RenameFile { from: PathBuf, to: PathBuf },
    /// `managed` is the content the policy later writes to `source`; a source
    /// already holding it is not backed up
    BackupFile {
        source: PathBuf,
        backup: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        managed: Option<String>,
    },
    WriteFile { path: PathBuf, content: String },
    PinPackage { path: PathBuf, packages: Vec<String> },
    InstallUnit(UnitDefinition),
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::StopService { .. } => "STOP SERVICE",
            ActionKind::DisableService { .. } => "DISABLE SERVICE",
            ActionKind::MaskService { .. } => "MASK SERVICE",
            ActionKind::StartService { .. } => "START SERVICE",
            ActionKind::KillProcess { .. } => "KILL PROCESS",
            ActionKind::RemoveFile { .. } => "REMOVE FILE",
            ActionKind::RenameFile { .. } => "RENAME FILE",
            ActionKind::BackupFile { .. } => "BACKUP FILE",
            ActionKind::WriteFile { .. } => "WRITE FILE",
            ActionKind::PinPackage { .. } => "PIN PACKAGE",
            ActionKind::InstallUnit(_) => "INSTALL UNIT",
        }
    }

    pub fn target(&self) -> String {
        match self {
            ActionKind::StopService { unit }
            | ActionKind::DisableService { unit }
            | ActionKind::MaskService { unit }
            | ActionKind::StartService { unit } => unit.clone(),
            ActionKind::KillProcess { patterns } => patterns.join(", "),
            ActionKind::RemoveFile { pattern } => pattern.clone(),
            ActionKind::RenameFile { from, to } => {
                format!("{} -> {}", from.display(), to.display())
            }
            ActionKind::BackupFile { source, backup, .. } => {
                format!("{} -> {}", source.display(), backup.display())
            }
            ActionKind::WriteFile { path, .. } | ActionKind::PinPackage { path, .. } => {
                path.display().to_string()
            }
            ActionKind::InstallUnit(unit) => unit.name.clone(),
        }
    }
}

/// A systemd unit installed by the policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Unit file name, e.g. `printguard-watchdog.service`
    pub name: String,
    /// Directory the unit file is written to
    pub directory: PathBuf,
    pub content: String,
    /// Enable and start the unit after installing it
    pub enable: bool,
}

impl UnitDefinition {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }
}

/// A follow-up command run once per enforcement when a notifying action applied
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hook {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Hook {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
