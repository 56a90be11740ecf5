//! Systemd unit installation

use crate::engine::actions::{files::write_file, Change};
use crate::error::Result;
use crate::host::{Enablement, Host};
use crate::policy::UnitDefinition;
use std::path::Path;

/// Write the unit file, then make sure it is enabled and running.
///
/// A rewritten unit that is already running gets restarted so the new
/// definition takes effect.
pub fn install_unit(host: &dyn Host, root: &Path, unit: &UnitDefinition, dry_run: bool) -> Result<Change> {
    let written = write_file(root, &unit.path(), &unit.content, dry_run)?;
    let rewritten = written.changed;
    let mut change = written;

    if rewritten && !dry_run {
        host.daemon_reload()?;
    }

    if !unit.enable {
        return Ok(change);
    }

    let state = host.unit_state(&unit.name)?;

    if state.enablement != Enablement::Enabled {
        if dry_run {
            change = change.merge(Change::changed(format!("Would enable: {}", unit.name)));
        } else {
            host.enable_unit(&unit.name)?;
            change = change.merge(Change::changed(format!("Enabled: {}", unit.name)));
        }
    }

    if !state.active.is_running() {
        if dry_run {
            change = change.merge(Change::changed(format!("Would start: {}", unit.name)));
        } else {
            host.start_unit(&unit.name)?;
            change = change.merge(Change::changed(format!("Started: {}", unit.name)));
        }
    } else if rewritten {
        if dry_run {
            change = change.merge(Change::changed(format!("Would restart: {}", unit.name)));
        } else {
            host.restart_unit(&unit.name)?;
            change = change.merge(Change::changed(format!("Restarted: {}", unit.name)));
        }
    }

    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actions::files::resolve;
    use crate::host::fake::FakeHost;
    use crate::host::ActiveState;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn unit(content: &str) -> UnitDefinition {
        UnitDefinition {
            name: "printguard-watchdog.service".to_string(),
            directory: PathBuf::from("/etc/systemd/system"),
            content: content.to_string(),
            enable: true,
        }
    }

    #[test]
    fn test_install_enables_and_starts() {
        let root = TempDir::new().unwrap();
        let host = FakeHost::new();
        let change = install_unit(&host, root.path(), &unit("[Service]\n"), false).unwrap();

        assert!(change.changed);
        assert!(resolve(root.path(), Path::new("/etc/systemd/system/printguard-watchdog.service")).exists());
        assert_eq!(
            host.take_calls(),
            vec![
                "daemon-reload",
                "enable printguard-watchdog.service",
                "start printguard-watchdog.service"
            ]
        );
    }

    #[test]
    fn test_reinstall_is_unchanged() {
        let root = TempDir::new().unwrap();
        let host = FakeHost::new();
        install_unit(&host, root.path(), &unit("[Service]\n"), false).unwrap();
        host.take_calls();

        let change = install_unit(&host, root.path(), &unit("[Service]\n"), false).unwrap();
        assert!(!change.changed);
        assert!(host.take_calls().is_empty());
    }

    #[test]
    fn test_changed_definition_restarts_running_unit() {
        let root = TempDir::new().unwrap();
        let host = FakeHost::new().with_unit(
            "printguard-watchdog.service",
            ActiveState::Active,
            Enablement::Enabled,
        );
        let change = install_unit(&host, root.path(), &unit("[Service]\nRestart=always\n"), false).unwrap();
        assert!(change.changed);
        assert_eq!(
            host.take_calls(),
            vec!["daemon-reload", "restart printguard-watchdog.service"]
        );
    }
}
