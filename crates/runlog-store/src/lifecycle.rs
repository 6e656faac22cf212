//! Run lifecycle operations: rename and delete.
//!
//! Rename follows the suffix convention: a run base is `<id>` or
//! `<id> <suffix>`, and renaming replaces everything after the first space.
//! Delete removes a single run file, or a whole category directory when no
//! run is given.

use crate::layout::{category_dir, resolve_run_file, DOTTED_RUN_EXTENSION};
use runlog_common::{is_safe_name, sanitize_suffix, Error, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Rename a run within a category.
///
/// The new base is `base_override` (trimmed) when given; otherwise the run's
/// existing base up to its first space, dropping any old suffix. A non-empty
/// `suffix` is sanitized and appended after a space. Returns the new base
/// name; a computed name equal to the current one is a successful no-op.
pub fn rename_run(
    root: &Path,
    category: &str,
    run: &str,
    suffix: Option<&str>,
    base_override: Option<&str>,
) -> Result<String> {
    if category.trim().is_empty() {
        return Err(Error::MissingInput("category"));
    }
    if run.trim().is_empty() {
        return Err(Error::MissingInput("run"));
    }
    if !is_safe_name(run) {
        return Err(Error::InvalidName {
            name: run.to_string(),
        });
    }

    let current_base = run.strip_suffix(DOTTED_RUN_EXTENSION).unwrap_or(run);
    let base = match base_override.map(str::trim).filter(|b| !b.is_empty()) {
        Some(explicit) => explicit.to_string(),
        None => current_base
            .split_once(' ')
            .map(|(head, _)| head)
            .unwrap_or(current_base)
            .to_string(),
    };
    if base.is_empty() || !is_safe_name(&base) {
        return Err(Error::InvalidName { name: base });
    }

    let dir = category_dir(root, category);
    let src = resolve_run_file(&dir, run);
    if !src.is_file() {
        return Err(Error::SourceMissing {
            name: current_base.to_string(),
        });
    }

    let safe_suffix = sanitize_suffix(suffix.unwrap_or(""));
    let new_base = if safe_suffix.is_empty() {
        base
    } else {
        format!("{base} {safe_suffix}")
    };

    if new_base == current_base {
        return Ok(new_base);
    }

    let dst = resolve_run_file(&dir, &new_base);
    if dst.exists() {
        // Includes the suffix-removal collision with a still-unpadded
        // numeric file: a plain target-exists rejection.
        return Err(Error::TargetExists { name: new_base });
    }
    if let Err(e) = std::fs::rename(&src, &dst) {
        warn!(error = %e, from = %src.display(), to = %dst.display(), "rename failed");
        return Err(Error::RenameFailed {
            from: current_base.to_string(),
            to: new_base,
        });
    }

    debug!(category, from = current_base, to = %new_base, "run renamed");
    Ok(new_base)
}

/// Delete a single run file, or the whole category directory (recursively,
/// best-effort) when `run` is `None` or blank.
pub fn delete(root: &Path, category: &str, run: Option<&str>) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::MissingInput("category"));
    }
    let dir = category_dir(root, category);
    if !dir.is_dir() {
        return Err(Error::CategoryNotFound {
            name: category.to_string(),
        });
    }

    match run.map(str::trim).filter(|r| !r.is_empty()) {
        None => {
            if remove_tree_best_effort(&dir) {
                debug!(category, "category deleted");
                Ok(())
            } else {
                Err(Error::Io(std::io::Error::other(format!(
                    "failed to remove category directory: {}",
                    dir.display()
                ))))
            }
        }
        Some(run) => {
            if !is_safe_name(run) {
                return Err(Error::InvalidName {
                    name: run.to_string(),
                });
            }
            let path = resolve_run_file(&dir, run);
            if !path.is_file() {
                return Err(Error::SourceMissing {
                    name: run.to_string(),
                });
            }
            std::fs::remove_file(&path)?;
            debug!(category, run, "run deleted");
            Ok(())
        }
    }
}

/// Recursive best-effort removal: failures on individual entries do not
/// abort the traversal; the return value reflects the final top-level
/// removal.
fn remove_tree_best_effort(path: &Path) -> bool {
    if path.is_dir() {
        if let Ok(entries) = std::fs::read_dir(path) {
            for entry in entries.flatten() {
                remove_tree_best_effort(&entry.path());
            }
        }
        std::fs::remove_dir(path).is_ok()
    } else {
        std::fs::remove_file(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_run(root: &Path, category: &str, base: &str) {
        let dir = root.join(category);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{base}.jsonl")), b"{\"t\":1}\n").unwrap();
    }

    #[test]
    fn rename_replaces_suffix_after_first_space() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0007 bad");

        let new_base = rename_run(dir.path(), "Auto", "0007 bad", Some("good"), None).unwrap();
        assert_eq!(new_base, "0007 good");
        assert!(dir.path().join("Auto/0007 good.jsonl").is_file());
        assert!(!dir.path().join("Auto/0007 bad.jsonl").exists());
    }

    #[test]
    fn rename_empty_suffix_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0007 bad");

        let new_base = rename_run(dir.path(), "Auto", "0007 bad", None, None).unwrap();
        assert_eq!(new_base, "0007");
        assert!(dir.path().join("Auto/0007.jsonl").is_file());
    }

    #[test]
    fn rename_base_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0007");

        let new_base =
            rename_run(dir.path(), "Auto", "0007", Some("final"), Some(" best ")).unwrap();
        assert_eq!(new_base, "best final");
        assert!(dir.path().join("Auto/best final.jsonl").is_file());
    }

    #[test]
    fn rename_noop_when_name_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0007 good");

        let new_base = rename_run(dir.path(), "Auto", "0007 good", Some("good"), None).unwrap();
        assert_eq!(new_base, "0007 good");
        assert!(dir.path().join("Auto/0007 good.jsonl").is_file());
    }

    #[test]
    fn rename_to_existing_target_fails_and_leaves_both() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0007 bad");
        write_run(dir.path(), "Auto", "0007 good");

        let err =
            rename_run(dir.path(), "Auto", "0007 bad", Some("good"), None).unwrap_err();
        assert!(matches!(err, Error::TargetExists { .. }));
        assert!(dir.path().join("Auto/0007 bad.jsonl").is_file());
        assert!(dir.path().join("Auto/0007 good.jsonl").is_file());
    }

    #[test]
    fn rename_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Auto")).unwrap();

        let err = rename_run(dir.path(), "Auto", "0001", Some("x"), None).unwrap_err();
        assert!(matches!(err, Error::SourceMissing { .. }));
    }

    #[test]
    fn rename_rejects_traversal_names() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0001");

        let err = rename_run(dir.path(), "Auto", "../0001", Some("x"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));

        let err =
            rename_run(dir.path(), "Auto", "0001", Some("x"), Some("../up")).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }

    #[test]
    fn rename_sanitizes_suffix() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0001");

        let new_base =
            rename_run(dir.path(), "Auto", "0001", Some("red\tteam/2"), None).unwrap();
        assert_eq!(new_base, "0001 red team_2");
    }

    #[test]
    fn delete_single_run_leaves_siblings() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0001");
        write_run(dir.path(), "Auto", "0002");

        delete(dir.path(), "Auto", Some("0001")).unwrap();
        assert!(!dir.path().join("Auto/0001.jsonl").exists());
        assert!(dir.path().join("Auto/0002.jsonl").is_file());
        assert!(dir.path().join("Auto").is_dir());
    }

    #[test]
    fn delete_category_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0001");
        write_run(dir.path(), "Auto", "0002");
        fs::create_dir_all(dir.path().join("Auto/nested")).unwrap();
        fs::write(dir.path().join("Auto/nested/junk.txt"), b"x").unwrap();

        delete(dir.path(), "Auto", None).unwrap();
        assert!(!dir.path().join("Auto").exists());
    }

    #[test]
    fn delete_missing_category_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = delete(dir.path(), "Nope", None).unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn delete_dot_category_cannot_escape_the_store() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("store");
        write_run(&root, "Auto", "0001");
        fs::write(parent.path().join("outside.txt"), b"keep").unwrap();

        // ".." and "." sanitize to the fallback category, which does not
        // exist, so nothing above or at the root is touched.
        for label in ["..", "."] {
            let err = delete(&root, label, None).unwrap_err();
            assert!(matches!(err, Error::CategoryNotFound { .. }));
        }
        assert!(root.join("Auto/0001.jsonl").is_file());
        assert!(parent.path().join("outside.txt").is_file());
    }

    #[test]
    fn delete_missing_run_reports_source_missing() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0001");
        let err = delete(dir.path(), "Auto", Some("0009")).unwrap_err();
        assert!(matches!(err, Error::SourceMissing { .. }));
    }

    #[test]
    fn delete_blank_run_means_whole_category() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path(), "Auto", "0001");
        delete(dir.path(), "Auto", Some("  ")).unwrap();
        assert!(!dir.path().join("Auto").exists());
    }
}
