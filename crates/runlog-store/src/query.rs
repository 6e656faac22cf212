//! Query engine: reshape one run's JSON-lines rows into column-oriented
//! time series.
//!
//! The reader is deliberately tolerant: a run still being appended to may
//! end in a truncated line, and crashed writers can leave garbage behind.
//! Any line that fails to parse is skipped, never fatal. A deliberate query
//! against a missing run, by contrast, is a distinct `RunNotFound` error.

use crate::layout::{category_dir, resolve_run_file};
use runlog_common::{Error, Result, TimeUnit, UNIT_KEY, UNIT_KEY_LEGACY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Column-oriented reshaping of a run's rows.
///
/// All rows share the time axis `t`, in call order. Each numeric field maps
/// to its own array under `series`, aligned by row order; a field present in
/// only some rows produces a shorter array than `t` (sparse-by-omission,
/// never null-filled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPayload {
    /// Shared time axis.
    pub t: Vec<f64>,

    /// Per-field value arrays, keyed by field name, created on first
    /// appearance.
    pub series: Map<String, Value>,

    /// Unit of `t` for the whole file; last declaration wins, `"s"` when
    /// the file never declared one.
    #[serde(rename = "tUnit")]
    pub t_unit: String,
}

/// Read a run's raw rows and transform them into a [`SeriesPayload`].
///
/// Skips blank lines, unparseable lines, and rows without a finite numeric
/// `t`. Unit declaration lines (`tUnit`, legacy `t_unit`) update the running
/// unit and contribute no data, even when they carry numeric siblings.
pub fn query_run(root: &Path, category: &str, run: &str) -> Result<SeriesPayload> {
    let dir = category_dir(root, category);
    let path = resolve_run_file(&dir, run);
    if !path.is_file() {
        return Err(Error::RunNotFound {
            category: category.to_string(),
            run: run.to_string(),
        });
    }

    let file = std::fs::File::open(&path)?;
    let mut reader = BufReader::new(file);

    let mut t: Vec<f64> = Vec::new();
    let mut series: Map<String, Value> = Map::new();
    let mut unit = TimeUnit::default().as_str().to_string();
    let mut skipped = 0usize;
    let mut buf: Vec<u8> = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // Decode lossily: a writer killed mid-multibyte character must cost
        // one skipped line, not the whole query.
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let row = match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(obj)) => obj,
            _ => {
                // Corrupt or truncated line from a concurrent/crashed
                // writer; skip and continue.
                skipped += 1;
                continue;
            }
        };

        if row.contains_key(UNIT_KEY) || row.contains_key(UNIT_KEY_LEGACY) {
            // Any row carrying the unit key is a declaration line, even if
            // the value is unusable; a non-string value leaves the running
            // unit unchanged.
            if let Some(declared) = unit_declaration(&row) {
                unit = declared.to_string();
            }
            continue;
        }

        let Some(ti) = row.get("t").and_then(Value::as_f64).filter(|v| v.is_finite()) else {
            skipped += 1;
            continue;
        };
        t.push(ti);

        for (key, value) in &row {
            if key == "t" {
                continue;
            }
            let Some(v) = value.as_f64() else {
                // Non-numeric sibling: ignored for this key on this row.
                continue;
            };
            let entry = series
                .entry(key.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(column) = entry.as_array_mut() {
                column.push(Value::from(v));
            }
        }
    }

    if skipped > 0 {
        debug!(category, run, skipped, "skipped unusable lines");
    }

    Ok(SeriesPayload {
        t,
        series,
        t_unit: unit,
    })
}

/// Extract the declared unit when the primary or legacy unit key holds a
/// string value.
fn unit_declaration(row: &Map<String, Value>) -> Option<&str> {
    row.get(UNIT_KEY)
        .or_else(|| row.get(UNIT_KEY_LEGACY))
        .and_then(Value::as_str)
}
