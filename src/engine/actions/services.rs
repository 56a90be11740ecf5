//! Service manager actions

use crate::engine::actions::Change;
use crate::error::Result;
use crate::host::{Enablement, Host};

pub fn stop_service(host: &dyn Host, unit: &str, dry_run: bool) -> Result<Change> {
    let state = host.unit_state(unit)?;
    if !state.active.is_running() {
        return Ok(Change::unchanged(format!("{} is not running", unit)));
    }
    if dry_run {
        return Ok(Change::changed(format!("Would stop: {}", unit)));
    }
    host.stop_unit(unit)?;
    Ok(Change::changed(format!("Stopped: {}", unit)))
}

pub fn disable_service(host: &dyn Host, unit: &str, dry_run: bool) -> Result<Change> {
    let state = host.unit_state(unit)?;
    match state.enablement {
        Enablement::Enabled => {}
        Enablement::NotFound => {
            return Ok(Change::unchanged(format!("{} is not installed", unit)));
        }
        other => {
            return Ok(Change::unchanged(format!(
                "{} is already {}",
                unit,
                describe(other)
            )));
        }
    }
    if dry_run {
        return Ok(Change::changed(format!("Would disable: {}", unit)));
    }
    host.disable_unit(unit)?;
    Ok(Change::changed(format!("Disabled: {}", unit)))
}

/// Masking works for units that are not installed, so absence is not special
pub fn mask_service(host: &dyn Host, unit: &str, dry_run: bool) -> Result<Change> {
    let state = host.unit_state(unit)?;
    if state.enablement == Enablement::Masked {
        return Ok(Change::unchanged(format!("{} is already masked", unit)));
    }
    if dry_run {
        return Ok(Change::changed(format!("Would mask: {}", unit)));
    }
    host.mask_unit(unit)?;
    Ok(Change::changed(format!("Masked: {}", unit)))
}

pub fn start_service(host: &dyn Host, unit: &str, dry_run: bool) -> Result<Change> {
    let state = host.unit_state(unit)?;
    if state.active.is_running() {
        return Ok(Change::unchanged(format!("{} is already running", unit)));
    }
    if dry_run {
        return Ok(Change::changed(format!("Would start: {}", unit)));
    }
    host.start_unit(unit)?;
    Ok(Change::changed(format!("Started: {}", unit)))
}

fn describe(enablement: Enablement) -> &'static str {
    match enablement {
        Enablement::Enabled => "enabled",
        Enablement::Disabled => "disabled",
        Enablement::Masked => "masked",
        Enablement::Static => "static",
        Enablement::NotFound => "not installed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;
    use crate::host::ActiveState;

    const UNIT: &str = "cups-browsed.service";

    #[test]
    fn test_stop_already_stopped() {
        let host = FakeHost::new().with_unit(UNIT, ActiveState::Inactive, Enablement::Enabled);
        let change = stop_service(&host, UNIT, false).unwrap();
        assert!(!change.changed);
        assert!(host.take_calls().is_empty());
    }

    #[test]
    fn test_stop_running() {
        let host = FakeHost::new().with_unit(UNIT, ActiveState::Active, Enablement::Enabled);
        let change = stop_service(&host, UNIT, false).unwrap();
        assert!(change.changed);
        assert_eq!(host.state(UNIT).active, ActiveState::Inactive);
    }

    #[test]
    fn test_disable_absent_unit() {
        let host = FakeHost::new();
        let change = disable_service(&host, UNIT, false).unwrap();
        assert!(!change.changed);
        assert_eq!(change.details, vec!["cups-browsed.service is not installed"]);
    }

    #[test]
    fn test_disable_masked_unit() {
        let host = FakeHost::new().with_unit(UNIT, ActiveState::Inactive, Enablement::Masked);
        let change = disable_service(&host, UNIT, false).unwrap();
        assert!(!change.changed);
        assert!(host.take_calls().is_empty());
    }

    #[test]
    fn test_mask_absent_unit() {
        let host = FakeHost::new();
        let change = mask_service(&host, UNIT, false).unwrap();
        assert!(change.changed);
        assert_eq!(host.state(UNIT).enablement, Enablement::Masked);

        let again = mask_service(&host, UNIT, false).unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn test_dry_run_does_not_mutate() {
        let host = FakeHost::new().with_unit(UNIT, ActiveState::Active, Enablement::Enabled);
        assert!(stop_service(&host, UNIT, true).unwrap().changed);
        assert!(disable_service(&host, UNIT, true).unwrap().changed);
        assert!(mask_service(&host, UNIT, true).unwrap().changed);
        assert!(host.take_calls().is_empty());
        assert_eq!(host.state(UNIT).active, ActiveState::Active);
    }

    #[test]
    fn test_start_service() {
        let host = FakeHost::new().with_unit("cups.service", ActiveState::Inactive, Enablement::Enabled);
        assert!(start_service(&host, "cups.service", false).unwrap().changed);
        assert!(!start_service(&host, "cups.service", false).unwrap().changed);
    }
}
