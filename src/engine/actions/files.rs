//! Filesystem actions
//!
//! Paths in a policy are absolute host paths. They are resolved under the
//! enforcement root so the same policy can target `/` or a chroot.

use crate::engine::actions::Change;
use crate::error::{GuardError, Result};
use crate::policy::defaults::pin_preferences;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_FILES_PER_OPERATION: usize = 100;

/// Resolve an absolute policy path under `root`
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    root.join(path.strip_prefix("/").unwrap_or(path))
}

/// Remove every regular file or symlink matching a glob pattern
pub fn remove_files(root: &Path, pattern: &str, dry_run: bool) -> Result<Change> {
    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()).trim_end_matches('/'),
        pattern.trim_start_matches('/')
    );

    let entries = glob::glob(&full_pattern)
        .map_err(|e| GuardError::PatternError(format!("{}: {}", pattern, e)))?;

    let mut matched: Vec<PathBuf> = Vec::new();
    for entry in entries {
        // Unreadable directories are skipped, not fatal
        let Ok(path) = entry else { continue };
        match fs::symlink_metadata(&path) {
            Ok(meta) if !meta.is_dir() => matched.push(path),
            _ => {}
        }
    }

    if matched.is_empty() {
        return Ok(Change::unchanged(format!("No files match {}", pattern)));
    }

    if matched.len() > MAX_FILES_PER_OPERATION {
        return Err(GuardError::SecurityError(format!(
            "Too many files to delete ({} > {}). Use a more specific pattern.",
            matched.len(),
            MAX_FILES_PER_OPERATION
        )));
    }

    let mut details = Vec::new();
    let mut failures = Vec::new();
    let mut deleted_count = 0;

    for path in &matched {
        if dry_run {
            details.push(format!("Would delete: {}", path.display()));
            continue;
        }
        match fs::remove_file(path) {
            Ok(_) => {
                details.push(format!("Deleted: {}", path.display()));
                deleted_count += 1;
            }
            // Raced with another remover
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => failures.push(format!("Failed to delete {}: {}", path.display(), e)),
        }
    }

    if !failures.is_empty() {
        return Err(GuardError::ExecutionError(failures.join("; ")));
    }

    Ok(Change {
        changed: dry_run || deleted_count > 0,
        details,
    })
}

pub fn rename_file(root: &Path, from: &Path, to: &Path, dry_run: bool) -> Result<Change> {
    let source = resolve(root, from);
    let target = resolve(root, to);

    if fs::symlink_metadata(&source).is_err() {
        if target.exists() {
            return Ok(Change::unchanged(format!(
                "{} already renamed to {}",
                from.display(),
                to.display()
            )));
        }
        return Ok(Change::unchanged(format!("{} does not exist", from.display())));
    }

    if dry_run {
        return Ok(Change::changed(format!(
            "Would rename: {} -> {}",
            from.display(),
            to.display()
        )));
    }

    fs::rename(&source, &target)?;
    Ok(Change::changed(format!(
        "Renamed: {} -> {}",
        from.display(),
        to.display()
    )))
}

/// Copy `source` to `backup` once; an existing backup is never overwritten.
/// A source that already holds `managed` is our own file, not an original.
pub fn backup_file(
    root: &Path,
    source: &Path,
    backup: &Path,
    managed: Option<&str>,
    dry_run: bool,
) -> Result<Change> {
    let source_path = resolve(root, source);
    let backup_path = resolve(root, backup);

    if backup_path.exists() {
        return Ok(Change::unchanged(format!(
            "Backup already present: {}",
            backup.display()
        )));
    }
    if !source_path.is_file() {
        return Ok(Change::unchanged(format!(
            "Nothing to back up: {} does not exist",
            source.display()
        )));
    }
    if let Some(managed) = managed {
        if fs::read(&source_path)? == managed.as_bytes() {
            return Ok(Change::unchanged(format!(
                "Nothing to back up: {} is already managed",
                source.display()
            )));
        }
    }

    if dry_run {
        return Ok(Change::changed(format!(
            "Would back up: {} -> {}",
            source.display(),
            backup.display()
        )));
    }

    fs::copy(&source_path, &backup_path)?;
    Ok(Change::changed(format!(
        "Backed up: {} -> {}",
        source.display(),
        backup.display()
    )))
}

/// Write `content` unless the file already holds exactly that content
pub fn write_file(root: &Path, path: &Path, content: &str, dry_run: bool) -> Result<Change> {
    let full_path = resolve(root, path);

    if let Ok(existing) = fs::read(&full_path) {
        if existing == content.as_bytes() {
            return Ok(Change::unchanged(format!("{} is up to date", path.display())));
        }
    }

    if dry_run {
        return Ok(Change::changed(format!("Would write: {}", path.display())));
    }

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write next to the target and rename so readers never see a partial file
    let file_name = full_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| GuardError::ExecutionError(format!("{} has no file name", path.display())))?;
    let tmp_path = full_path.with_file_name(format!(".{}.printguard.tmp", file_name));
    fs::write(&tmp_path, content)?;
    if let Err(e) = fs::rename(&tmp_path, &full_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(Change::changed(format!(
        "Wrote: {} ({} bytes)",
        path.display(),
        content.len()
    )))
}

pub fn pin_packages(root: &Path, path: &Path, packages: &[String], dry_run: bool) -> Result<Change> {
    let change = write_file(root, path, &pin_preferences(packages), dry_run)?;
    if change.changed {
        Ok(Change {
            changed: true,
            details: vec![format!("Pinned: {}", packages.join(", "))],
        }
        .merge(change))
    } else {
        Ok(change)
    }
}
