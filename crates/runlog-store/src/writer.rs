//! Append-only run writer.
//!
//! One `RunWriter` owns one open run file. Rows are serialized as one JSON
//! object per line and flushed immediately, so recorded data survives abrupt
//! process termination. A unit declaration line is emitted once before the
//! first data row; the first unit wins for the lifetime of the file.
//!
//! Recording must never interrupt the host control loop: once a writer is
//! open, per-write I/O failures are swallowed (the row is lost), logged at
//! `warn`, and surfaced only through [`RunWriter::last_error`] and
//! [`RunWriter::dropped_rows`].

use crate::alloc::next_run_base;
use crate::config::StoreConfig;
use crate::layout::{ensure_category_dir, resolve_run_file};
use runlog_common::{sanitize_category, Result, TimeUnit, UNIT_KEY};
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, trace, warn};

// ── Row construction ────────────────────────────────────────────────────

/// Ordered mapping from field name to numeric value for one row.
///
/// Built before the write call so the row shape is validated up front.
/// Setting an existing key overwrites its value in place.
#[derive(Debug, Clone, Default)]
pub struct RowFields {
    fields: Vec<(String, f64)>,
}

impl RowFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite a field.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ── Writer ──────────────────────────────────────────────────────────────

struct WriterInner {
    file: Option<std::fs::File>,
    unit: Option<TimeUnit>,
    last_error: Option<String>,
}

/// Append-only writer for one run file.
///
/// All write and close operations serialize through an internal lock;
/// concurrent callers interleave whole rows in arrival order. Closed on
/// drop; close is idempotent.
pub struct RunWriter {
    category: String,
    run_base: String,
    path: PathBuf,
    dropped_rows: AtomicU64,
    inner: Mutex<WriterInner>,
}

impl RunWriter {
    /// Create the category directory if needed, allocate the next run id,
    /// and open the run file in append mode.
    pub fn create(config: &StoreConfig, category: &str) -> Result<RunWriter> {
        let category = sanitize_category(category);
        let dir = ensure_category_dir(config.root(), &category)?;
        let run_base = next_run_base(&dir)?;
        let path = resolve_run_file(&dir, &run_base);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        debug!(category = %category, run = %run_base, "run writer opened");
        Ok(RunWriter {
            category,
            run_base,
            path,
            dropped_rows: AtomicU64::new(0),
            inner: Mutex::new(WriterInner {
                file: Some(file),
                unit: None,
                last_error: None,
            }),
        })
    }

    /// Log a row with `t` in seconds.
    pub fn log_seconds(&self, t: f64, fields: &RowFields) {
        self.log_with_unit(t, TimeUnit::Seconds, fields);
    }

    /// Log a row with `t` in milliseconds.
    pub fn log_millis(&self, t: f64, fields: &RowFields) {
        self.log_with_unit(t, TimeUnit::Milliseconds, fields);
    }

    /// Log a row with `t` in nanoseconds.
    pub fn log_nanos(&self, t: f64, fields: &RowFields) {
        self.log_with_unit(t, TimeUnit::Nanoseconds, fields);
    }

    /// Category the run belongs to (sanitized).
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Base name of the run file (without extension).
    pub fn run_base(&self) -> &str {
        &self.run_base
    }

    /// Full path of the run file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True while the underlying file handle is open.
    pub fn is_ready(&self) -> bool {
        self.inner.lock().map(|i| i.file.is_some()).unwrap_or(false)
    }

    /// Message of the most recent swallowed write failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|i| i.last_error.clone())
    }

    /// Number of rows lost to swallowed write failures or writes after close.
    pub fn dropped_rows(&self) -> u64 {
        self.dropped_rows.load(Ordering::Relaxed)
    }

    /// The unit fixed by the first write, if any write happened yet.
    pub fn unit(&self) -> Option<TimeUnit> {
        self.inner.lock().ok().and_then(|i| i.unit)
    }

    /// Release the file handle. Idempotent; flush/close errors are swallowed.
    pub fn close(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if let Some(mut file) = inner.file.take() {
            if let Err(e) = file.flush() {
                warn!(error = %e, run = %self.run_base, "flush on close failed");
            }
            debug!(category = %self.category, run = %self.run_base, "run writer closed");
        }
    }

    fn log_with_unit(&self, t: f64, unit: TimeUnit, fields: &RowFields) {
        let Ok(mut inner) = self.inner.lock() else {
            self.dropped_rows.fetch_add(1, Ordering::Relaxed);
            return;
        };
        if inner.file.is_none() {
            self.dropped_rows.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if !t.is_finite() {
            trace!(run = %self.run_base, "dropped row with non-finite t");
            self.dropped_rows.fetch_add(1, Ordering::Relaxed);
            return;
        }

        // First write fixes the unit for the rest of the file. A failed
        // header write still counts as declared; readers default to seconds.
        if inner.unit.is_none() {
            inner.unit = Some(unit);
            let mut header = Map::new();
            header.insert(UNIT_KEY.to_string(), Value::from(unit.as_str()));
            self.write_line(&mut inner, &Value::Object(header), false);
        }

        let mut row = Map::with_capacity(fields.len() + 1);
        row.insert("t".to_string(), Value::from(t));
        for (key, value) in fields.iter() {
            // JSON has no representation for NaN/inf; drop the field, keep
            // the row.
            if !value.is_finite() {
                trace!(run = %self.run_base, key, "dropped non-finite field value");
                continue;
            }
            row.insert(key.to_string(), Value::from(value));
        }
        self.write_line(&mut inner, &Value::Object(row), true);
    }

    /// Serialize one line and flush. Failures are recorded, never returned.
    fn write_line(&self, inner: &mut WriterInner, value: &Value, count_drop: bool) {
        let Some(file) = inner.file.as_mut() else {
            return;
        };
        let result = serde_json::to_string(value)
            .map_err(std::io::Error::other)
            .and_then(|line| {
                file.write_all(line.as_bytes())?;
                file.write_all(b"\n")?;
                file.flush()
            });
        if let Err(e) = result {
            warn!(error = %e, run = %self.run_base, "write failed, row dropped");
            inner.last_error = Some(e.to_string());
            if count_drop {
                self.dropped_rows.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Drop for RunWriter {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, StoreConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        (dir, config)
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn first_line_is_unit_header() {
        let (_dir, config) = store();
        let w = RunWriter::create(&config, "TeleOp").unwrap();
        w.log_seconds(10.0, &RowFields::new().set("x", 1.0));
        w.log_seconds(20.0, &RowFields::new().set("x", 2.0));
        w.close();

        let lines = lines(w.path());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#"{"tUnit":"s"}"#);
        assert_eq!(lines[1], r#"{"t":10.0,"x":1.0}"#);
        assert_eq!(lines[2], r#"{"t":20.0,"x":2.0}"#);
    }

    #[test]
    fn first_unit_wins() {
        let (_dir, config) = store();
        let w = RunWriter::create(&config, "TeleOp").unwrap();
        w.log_millis(5.0, &RowFields::new().set("x", 1.0));
        w.log_seconds(6.0, &RowFields::new().set("x", 2.0));
        w.close();

        let lines = lines(w.path());
        assert_eq!(lines[0], r#"{"tUnit":"ms"}"#);
        // No second header, both data rows present.
        assert_eq!(lines.len(), 3);
        assert_eq!(w.unit(), Some(TimeUnit::Milliseconds));
    }

    #[test]
    fn non_finite_field_dropped_row_kept() {
        let (_dir, config) = store();
        let w = RunWriter::create(&config, "TeleOp").unwrap();
        w.log_seconds(
            1.0,
            &RowFields::new().set("ok", 3.5).set("bad", f64::NAN),
        );
        w.close();

        let lines = lines(w.path());
        assert_eq!(lines[1], r#"{"t":1.0,"ok":3.5}"#);
        assert_eq!(w.dropped_rows(), 0);
    }

    #[test]
    fn non_finite_t_drops_whole_row() {
        let (_dir, config) = store();
        let w = RunWriter::create(&config, "TeleOp").unwrap();
        w.log_seconds(f64::INFINITY, &RowFields::new().set("x", 1.0));
        w.close();

        assert_eq!(lines(w.path()).len(), 0);
        assert_eq!(w.dropped_rows(), 1);
    }

    #[test]
    fn writes_after_close_are_noops() {
        let (_dir, config) = store();
        let w = RunWriter::create(&config, "TeleOp").unwrap();
        w.log_seconds(1.0, &RowFields::new().set("x", 1.0));
        w.close();
        w.close(); // idempotent
        assert!(!w.is_ready());

        w.log_seconds(2.0, &RowFields::new().set("x", 2.0));
        assert_eq!(lines(w.path()).len(), 2);
        assert_eq!(w.dropped_rows(), 1);
    }

    #[test]
    fn sequential_runs_get_sequential_ids() {
        let (_dir, config) = store();
        let w1 = RunWriter::create(&config, "Auto").unwrap();
        assert_eq!(w1.run_base(), "0001");
        drop(w1);
        let w2 = RunWriter::create(&config, "Auto").unwrap();
        assert_eq!(w2.run_base(), "0002");
    }

    #[test]
    fn category_label_is_sanitized() {
        let (_dir, config) = store();
        let w = RunWriter::create(&config, "Blue / Far").unwrap();
        assert_eq!(w.category(), "Blue_Far");
        assert!(w.path().to_string_lossy().contains("Blue_Far"));
    }

    #[test]
    fn row_fields_overwrite_in_place() {
        let fields = RowFields::new().set("x", 1.0).set("y", 2.0).set("x", 3.0);
        let collected: Vec<_> = fields.iter().collect();
        assert_eq!(collected, vec![("x", 3.0), ("y", 2.0)]);
    }

    #[test]
    fn concurrent_writers_serialize_rows() {
        let (_dir, config) = store();
        let w = std::sync::Arc::new(RunWriter::create(&config, "Auto").unwrap());

        let mut handles = Vec::new();
        for i in 0..4 {
            let w = w.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..25 {
                    let t = (i * 25 + j) as f64;
                    w.log_seconds(t, &RowFields::new().set("x", t));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        w.close();

        let lines = lines(w.path());
        // 1 header + 100 intact rows, no interleaved fragments.
        assert_eq!(lines.len(), 101);
        for line in &lines[1..] {
            let row: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(row.get("t").and_then(|v| v.as_f64()).is_some());
        }
    }
}
