//! Policy enforcer
//!
//! Applies every action of a policy in order. Individual failures are
//! recorded and the run continues; only a failed critical action stops it.

use crate::engine::actions::{self, Change};
use crate::engine::report::{EnforcementReport, EnforcementResult, HookResult, Outcome};
use crate::error::Result;
use crate::host::Host;
use crate::policy::{Action, ActionKind, Hook, Policy};
use chrono::Utc;
use std::path::PathBuf;

pub struct Enforcer<'a> {
    host: &'a dyn Host,
    root: PathBuf,
    dry_run: bool,
}

impl<'a> Enforcer<'a> {
    pub fn new(host: &'a dyn Host, root: impl Into<PathBuf>) -> Self {
        Self {
            host,
            root: root.into(),
            dry_run: false,
        }
    }

    /// Probe only: report what would change without touching the host
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn run(&self, policy: &Policy) -> EnforcementReport {
        let started_at = Utc::now();
        tracing::info!(
            policy = %policy.name,
            actions = policy.actions.len(),
            dry_run = self.dry_run,
            "enforcing policy"
        );

        let mut results = Vec::with_capacity(policy.actions.len());
        let mut pending_hooks: Vec<Hook> = Vec::new();
        let mut aborted = None;

        for action in &policy.actions {
            let result = self.apply(action);

            if result.outcome.is_change() {
                for hook in &action.notify {
                    if !pending_hooks.contains(hook) {
                        pending_hooks.push(hook.clone());
                    }
                }
            }

            let critical_failure = action.critical && result.outcome.is_failed();
            results.push(result);

            if critical_failure {
                tracing::error!(action = %action.name, "critical action failed, aborting run");
                aborted = Some(format!("critical action '{}' failed", action.name));
                break;
            }
        }

        let hooks = pending_hooks.iter().map(|hook| self.run_hook(hook)).collect();

        EnforcementReport {
            policy: policy.name.clone(),
            dry_run: self.dry_run,
            started_at,
            finished_at: Utc::now(),
            results,
            hooks,
            aborted,
        }
    }

    /// Apply a single action, never failing: errors become `Outcome::Failed`
    pub fn apply(&self, action: &Action) -> EnforcementResult {
        let (outcome, details) = match self.dispatch(&action.kind) {
            Ok(Change { changed: true, details }) if self.dry_run => (Outcome::WouldApply, details),
            Ok(Change { changed: true, details }) => {
                tracing::info!(action = %action.name, "applied");
                (Outcome::Applied, details)
            }
            Ok(Change { changed: false, details }) => {
                tracing::debug!(action = %action.name, "already satisfied");
                (Outcome::AlreadySatisfied, details)
            }
            Err(e) => {
                tracing::warn!(action = %action.name, error = %e, "action failed");
                (Outcome::Failed(e.to_string()), Vec::new())
            }
        };

        EnforcementResult {
            action_name: action.name.clone(),
            kind: action.kind.label().to_string(),
            target: action.target(),
            outcome,
            details,
        }
    }

    fn dispatch(&self, kind: &ActionKind) -> Result<Change> {
        let host = self.host;
        let root = self.root.as_path();
        let dry_run = self.dry_run;

        match kind {
            ActionKind::StopService { unit } => actions::stop_service(host, unit, dry_run),
            ActionKind::DisableService { unit } => actions::disable_service(host, unit, dry_run),
            ActionKind::MaskService { unit } => actions::mask_service(host, unit, dry_run),
            ActionKind::StartService { unit } => actions::start_service(host, unit, dry_run),
            ActionKind::KillProcess { patterns } => actions::kill_processes(host, patterns, dry_run),
            ActionKind::RemoveFile { pattern } => actions::remove_files(root, pattern, dry_run),
            ActionKind::RenameFile { from, to } => actions::rename_file(root, from, to, dry_run),
            ActionKind::BackupFile {
                source,
                backup,
                managed,
            } => actions::backup_file(root, source, backup, managed.as_deref(), dry_run),
            ActionKind::WriteFile { path, content } => {
                actions::write_file(root, path, content, dry_run)
            }
            ActionKind::PinPackage { path, packages } => {
                actions::pin_packages(root, path, packages, dry_run)
            }
            ActionKind::InstallUnit(unit) => actions::install_unit(host, root, unit, dry_run),
        }
    }

    fn run_hook(&self, hook: &Hook) -> HookResult {
        let command = hook.to_string();
        let outcome = if self.dry_run {
            Outcome::WouldApply
        } else {
            match self.host.run(&hook.program, &hook.args) {
                Ok(()) => {
                    tracing::info!(hook = %command, "hook ran");
                    Outcome::Applied
                }
                Err(e) => {
                    tracing::warn!(hook = %command, error = %e, "hook failed");
                    Outcome::Failed(e.to_string())
                }
            }
        };
        HookResult { command, outcome }
    }
}
