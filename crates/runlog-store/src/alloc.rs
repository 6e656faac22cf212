//! Run identifier allocation.
//!
//! Run files within a category are named by zero-padded decimal ids. The
//! padding width is shared by all purely-numeric run files in the directory;
//! when the id space outgrows the current width, existing files are re-padded
//! to the new width so lexicographic and numeric order stay aligned.
//!
//! Not safe against concurrent allocation from multiple processes on the
//! same directory; callers keep one writer per category at a time.

use crate::layout::{resolve_run_file, run_base};
use std::io;
use std::path::Path;
use tracing::warn;

/// Minimum zero-padding width for numeric run ids.
pub const MIN_RUN_ID_WIDTH: usize = 4;

/// Compute the next run base name for a category directory, re-padding
/// existing numeric run files when the id space overflows the current width.
pub fn next_run_base(dir: &Path) -> io::Result<String> {
    let mut max_id: Option<u64> = None;
    let mut width = MIN_RUN_ID_WIDTH;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(base) = name.to_str().and_then(run_base) else {
            continue;
        };
        // Renamed labels are excluded from max/width computation.
        let Some(id) = parse_numeric_base(base) else {
            continue;
        };
        max_id = Some(max_id.map_or(id, |m| m.max(id)));
        width = width.max(base.len());
    }

    let next = max_id.map_or(1, |m| m.saturating_add(1)).max(1);
    if next >= width_threshold(width) {
        width += 1;
        repad_run_files(dir, width);
    }

    Ok(format!("{next:0width$}"))
}

/// Parse a base name as a decimal run id, rejecting anything non-numeric.
fn parse_numeric_base(base: &str) -> Option<u64> {
    if base.is_empty() || !base.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    base.parse().ok()
}

/// Smallest id that no longer fits in `width` digits.
fn width_threshold(width: usize) -> u64 {
    10u64.checked_pow(width as u32).unwrap_or(u64::MAX)
}

/// Rename every purely-numeric run file to the new zero-padded width.
/// Best-effort: individual rename failures are logged and skipped, never
/// aborting allocation.
fn repad_run_files(dir: &Path, new_width: usize) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, dir = %dir.display(), "re-pad scan failed");
            return;
        }
    };

    for entry in entries.flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(base) = run_base(name) else { continue };
        let Some(id) = parse_numeric_base(base) else {
            continue;
        };

        let padded = format!("{id:0new_width$}");
        if padded == base {
            continue;
        }
        let dst = resolve_run_file(dir, &padded);
        if let Err(e) = std::fs::rename(entry.path(), &dst) {
            warn!(error = %e, from = name, to = %dst.display(), "re-pad rename failed");
        }
    }
}
