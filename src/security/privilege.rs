//! Root privilege check

use crate::error::{GuardError, Result};

/// Whether the current process runs with an effective UID of 0
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

/// Mutating runs need root; probing does not
pub fn require_root(dry_run: bool) -> Result<()> {
    if dry_run || is_root() {
        return Ok(());
    }
    Err(GuardError::PermissionDenied(
        "enforcing the printer policy requires root. Re-run with sudo or use --dry-run".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_never_needs_root() {
        assert!(require_root(true).is_ok());
    }

    #[test]
    fn test_require_root_matches_euid() {
        assert_eq!(require_root(false).is_ok(), is_root());
    }
}
