//! Directory/run catalog: read-side enumeration of categories and runs.
//!
//! Pure filesystem reads, no caching; every call reflects current on-disk
//! state. Two orderings are intentional: the plain run list sorts
//! descending (recency view for pickers), the full tree sorts ascending at
//! both levels (management view).

use crate::layout::{category_dir, resolve_run_file, run_base};
use chrono::{DateTime, Utc};
use runlog_common::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::Path;

/// Existence and size for one resolved run file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub exists: bool,
    pub bytes: u64,
}

/// One run in the full tree snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    /// Base name without extension.
    pub name: String,
    /// File size in bytes.
    pub bytes: u64,
    /// Last-modified timestamp, epoch milliseconds.
    pub modified: i64,
}

/// One category with its nested runs in the full tree snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub runs: Vec<RunEntry>,
}

/// Case-insensitive name ordering used across all listings.
fn name_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// List category directories under the store root, case-insensitive
/// ascending. A missing root yields an empty list.
pub fn list_categories(root: &Path) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort_by(|a, b| name_cmp(a, b));
    Ok(names)
}

/// List run base names for a category, case-insensitive **descending** so
/// the most-recent-looking name comes first. A missing category yields an
/// empty list.
pub fn list_runs(root: &Path, category: &str) -> Result<Vec<String>> {
    let dir = category_dir(root, category);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        if let Some(base) = file_name.to_str().and_then(run_base) {
            names.push(base.to_string());
        }
    }
    names.sort_by(|a, b| name_cmp(b, a));
    Ok(names)
}

/// Existence flag and byte size for one resolved run file.
pub fn run_metadata(root: &Path, category: &str, run: &str) -> Result<RunMeta> {
    let path = resolve_run_file(&category_dir(root, category), run);
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Ok(RunMeta {
            exists: true,
            bytes: meta.len(),
        }),
        Ok(_) => Ok(RunMeta {
            exists: false,
            bytes: 0,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(RunMeta {
            exists: false,
            bytes: 0,
        }),
        Err(e) => Err(e.into()),
    }
}

/// Full tree snapshot: categories with nested run metadata, ascending at
/// both levels.
pub fn tree(root: &Path) -> Result<Vec<CategoryEntry>> {
    let mut categories = Vec::new();
    for name in list_categories(root)? {
        let dir = root.join(&name);
        let mut runs = Vec::new();

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(base) = file_name.to_str().and_then(run_base) else {
                continue;
            };
            let modified = meta
                .modified()
                .map(|m| DateTime::<Utc>::from(m).timestamp_millis())
                .unwrap_or(0);
            runs.push(RunEntry {
                name: base.to_string(),
                bytes: meta.len(),
                modified,
            });
        }
        runs.sort_by(|a, b| name_cmp(&a.name, &b.name));
        categories.push(CategoryEntry { name, runs });
    }
    Ok(categories)
}
