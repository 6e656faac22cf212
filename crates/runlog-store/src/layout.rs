//! Directory layout helpers.
//!
//! One directory per category, one `.jsonl` file per run:
//! `<root>/<Category>/<RunBase>.jsonl`.

use runlog_common::{sanitize_category, RUN_EXTENSION};
use std::io;
use std::path::{Path, PathBuf};

/// Run file extension with the leading dot, for suffix checks.
pub const DOTTED_RUN_EXTENSION: &str = ".jsonl";

/// Directory for a category under the store root. The label is sanitized;
/// the directory is not created.
pub fn category_dir(root: &Path, category: &str) -> PathBuf {
    root.join(sanitize_category(category))
}

/// Directory for a category, created together with the store root if needed.
pub fn ensure_category_dir(root: &Path, category: &str) -> io::Result<PathBuf> {
    let dir = category_dir(root, category);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Resolve a run identifier to its file within a category directory.
/// An identifier without the run extension gets it appended; one already
/// carrying the extension is used as-is.
pub fn resolve_run_file(dir: &Path, run: &str) -> PathBuf {
    if run.ends_with(DOTTED_RUN_EXTENSION) {
        dir.join(run)
    } else {
        dir.join(format!("{run}.{RUN_EXTENSION}"))
    }
}

/// Extract the run base name from a file name, if it is a run file.
pub fn run_base(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(DOTTED_RUN_EXTENSION)
}
