//! Process kill action

use crate::engine::actions::Change;
use crate::error::{GuardError, Result};
use crate::host::{Host, ProcessEntry};
use regex::Regex;
use serde::Serialize;
use std::path::Path;

const MAX_PROCESSES_PER_OPERATION: usize = 32;

/// Interpreters whose first argument names the real program
const INTERPRETERS: [&str; 5] = ["python", "python3", "perl", "sh", "bash"];

/// Matches process names against a set of regular expressions
#[derive(Debug, Clone)]
pub struct ProcessMatcher {
    patterns: Vec<Regex>,
}

impl ProcessMatcher {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| GuardError::PatternError(format!("{}: {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// A process matches when its name, its executable's file name, or the
    /// script run by an interpreter matches any pattern.
    pub fn matches(&self, process: &ProcessEntry) -> bool {
        candidate_names(process)
            .iter()
            .any(|name| self.patterns.iter().any(|re| re.is_match(name)))
    }
}

fn candidate_names(process: &ProcessEntry) -> Vec<String> {
    let mut names = vec![process.name.clone()];
    let mut args = process.cmd.iter();
    if let Some(program) = args.next().map(|a| file_name(a)) {
        let interpreted = INTERPRETERS
            .iter()
            .any(|i| program == *i || program.starts_with("python3."));
        names.push(program);
        if interpreted {
            if let Some(script) = args.find(|a| !a.starts_with('-')) {
                names.push(file_name(script));
            }
        }
    }
    names
}

fn file_name(arg: &str) -> String {
    Path::new(arg)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| arg.to_string())
}

fn is_protected_process(process: &ProcessEntry) -> bool {
    let protected = [
        "init",
        "systemd",
        "systemd-udevd",
        "dbus-daemon",
        "dbus-broker",
        "cupsd",
        "kthreadd",
    ];
    process.pid <= 1
        || process.pid == std::process::id()
        || protected.iter().any(|p| process.name == *p)
}

/// Outcome of one pass over the process table
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sweep {
    pub matched: Vec<ProcessEntry>,
    pub terminated: Vec<u32>,
    /// Exited between the scan and the signal
    pub vanished: Vec<u32>,
    pub failed: Vec<(u32, String)>,
    pub dry_run: bool,
}

impl Sweep {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn details(&self) -> Vec<String> {
        let mut details = Vec::new();
        for process in &self.matched {
            let pid = process.pid;
            if self.dry_run {
                details.push(format!("Would kill: {} (PID {})", process.name, pid));
            } else if self.terminated.contains(&pid) {
                details.push(format!("Killed: {} (PID {})", process.name, pid));
            } else if self.vanished.contains(&pid) {
                details.push(format!("Process no longer exists: {} (PID {})", process.name, pid));
            } else if let Some((_, reason)) = self.failed.iter().find(|(p, _)| *p == pid) {
                details.push(format!("Failed to kill: {} (PID {}): {}", process.name, pid, reason));
            }
        }
        if self.matched.is_empty() {
            details.push("No matching processes found".to_string());
        }
        details
    }
}

/// Scan the process table and send SIGTERM to every match
pub fn sweep(host: &dyn Host, matcher: &ProcessMatcher, dry_run: bool) -> Result<Sweep> {
    let matched: Vec<ProcessEntry> = host
        .processes()?
        .into_iter()
        .filter(|p| matcher.matches(p) && !is_protected_process(p))
        .collect();

    if matched.len() > MAX_PROCESSES_PER_OPERATION {
        return Err(GuardError::SecurityError(format!(
            "Too many processes to kill ({} > {}). Tighten the process patterns.",
            matched.len(),
            MAX_PROCESSES_PER_OPERATION
        )));
    }

    let mut sweep = Sweep {
        dry_run,
        ..Sweep::default()
    };

    if !dry_run {
        for process in &matched {
            match host.terminate(process.pid) {
                Ok(true) => {
                    tracing::info!(pid = process.pid, name = %process.name, "terminated process");
                    sweep.terminated.push(process.pid);
                }
                Ok(false) => sweep.vanished.push(process.pid),
                Err(e) => {
                    tracing::warn!(pid = process.pid, name = %process.name, error = %e, "failed to terminate process");
                    sweep.failed.push((process.pid, e.to_string()));
                }
            }
        }
    }

    sweep.matched = matched;
    Ok(sweep)
}

pub fn kill_processes(host: &dyn Host, patterns: &[String], dry_run: bool) -> Result<Change> {
    let matcher = ProcessMatcher::new(patterns)?;
    let sweep = sweep(host, &matcher, dry_run)?;

    if !sweep.is_clean() {
        return Err(GuardError::ExecutionError(sweep.details().join("; ")));
    }

    Ok(Change {
        changed: if dry_run {
            !sweep.matched.is_empty()
        } else {
            !sweep.terminated.is_empty()
        },
        details: sweep.details(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    fn patterns() -> Vec<String> {
        vec![
            "^system-config-printer(-applet)?$".to_string(),
            "^cups-browsed$".to_string(),
        ]
    }

    fn entry(pid: u32, name: &str, cmd: &[&str]) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: name.to_string(),
            cmd: cmd.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_matches_interpreted_script() {
        let matcher = ProcessMatcher::new(&patterns()).unwrap();
        let applet = entry(
            4242,
            "python3",
            &["/usr/bin/python3", "-s", "/usr/share/system-config-printer/system-config-printer-applet"],
        );
        assert!(matcher.matches(&applet));
    }

    #[test]
    fn test_does_not_match_editor_argument() {
        let matcher = ProcessMatcher::new(&patterns()).unwrap();
        let editor = entry(77, "vim", &["vim", "cups-browsed"]);
        assert!(!matcher.matches(&editor));
    }

    #[test]
    fn test_protected_processes() {
        assert!(is_protected_process(&entry(1, "whatever", &[])));
        assert!(is_protected_process(&entry(300, "cupsd", &[])));
        assert!(is_protected_process(&entry(std::process::id(), "printguard", &[])));
        assert!(!is_protected_process(&entry(300, "cups-browsed", &[])));
    }

    #[test]
    fn test_kill_no_matches_is_unchanged() {
        let host = FakeHost::new().with_process(10, "bash", &["/bin/bash"]);
        let change = kill_processes(&host, &patterns(), false).unwrap();
        assert!(!change.changed);
        assert_eq!(change.details, vec!["No matching processes found"]);
        assert!(host.take_calls().is_empty());
    }

    #[test]
    fn test_kill_running_process() {
        let host = FakeHost::new()
            .with_process(10, "bash", &["/bin/bash"])
            .with_process(20, "cups-browsed", &["/usr/sbin/cups-browsed"]);
        let change = kill_processes(&host, &patterns(), false).unwrap();
        assert!(change.changed);
        assert_eq!(host.running_pids(), vec![10]);
        assert_eq!(change.details, vec!["Killed: cups-browsed (PID 20)"]);
    }

    #[test]
    fn test_kill_failure_is_error() {
        let host = FakeHost::new()
            .with_process(20, "cups-browsed", &["cups-browsed"])
            .with_process(21, "ipp-usb", &["ipp-usb"])
            .failing_pid(20);
        let matcher = ProcessMatcher::new(&["^cups-browsed$".to_string(), "^ipp-usb$".to_string()]).unwrap();

        let result = sweep(&host, &matcher, false).unwrap();
        assert!(!result.is_clean());
        assert_eq!(result.terminated, vec![21]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].0, 20);

        let host = FakeHost::new()
            .with_process(20, "cups-browsed", &["cups-browsed"])
            .failing_pid(20);
        let err = kill_processes(&host, &patterns(), false).unwrap_err();
        assert!(err.to_string().contains("Failed to kill: cups-browsed (PID 20)"));
    }

    #[test]
    fn test_too_many_matches_is_refused() {
        let host = (100..100 + MAX_PROCESSES_PER_OPERATION as u32 + 1)
            .fold(FakeHost::new(), |host, pid| {
                host.with_process(pid, "cups-browsed", &["cups-browsed"])
            });
        let result = kill_processes(&host, &patterns(), false);
        assert!(matches!(result, Err(GuardError::SecurityError(_))));
        assert!(host.take_calls().is_empty());
    }

    #[test]
    fn test_kill_dry_run() {
        let host = FakeHost::new().with_process(20, "cups-browsed", &["cups-browsed"]);
        let change = kill_processes(&host, &patterns(), true).unwrap();
        assert!(change.changed);
        assert_eq!(host.running_pids(), vec![20]);
    }

    #[test]
    fn test_bad_pattern() {
        let result = ProcessMatcher::new(&["[".to_string()]);
        assert!(matches!(result, Err(GuardError::PatternError(_))));
    }
}
