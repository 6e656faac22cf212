//! Runlog operator CLI.
//!
//! Thin JSON-on-stdout surface over the store library, one subcommand per
//! store operation plus a synthetic `record` demo for smoke-testing a
//! store end to end.

use clap::{Parser, Subcommand, ValueEnum};
use runlog_common::Error;
use runlog_store::{RowFields, RunStore, StoreConfig, TimeUnit};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit codes: 0 ok, 1 not found, 2 validation error, 3 I/O or internal.
mod exit_codes {
    pub const OK: u8 = 0;
    pub const NOT_FOUND: u8 = 1;
    pub const VALIDATION: u8 = 2;
    pub const FAILURE: u8 = 3;
}

#[derive(Parser, Debug)]
#[command(name = "runlog", about = "Inspect, query, and manage runlog telemetry stores")]
struct Cli {
    /// Store root directory (falls back to $RUNLOG_ROOT, then the platform
    /// data directory).
    #[arg(long, env = "RUNLOG_ROOT", global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List category names
    Categories,
    /// List run base names for a category (most recent first)
    Runs {
        category: String,
    },
    /// Show existence and byte size for a run
    Meta {
        category: String,
        run: String,
    },
    /// Full tree snapshot with per-run metadata
    Tree,
    /// Reshape a run into column-oriented series data
    Data {
        category: String,
        run: String,
    },
    /// Rename a run by replacing its suffix (or overriding the base)
    Rename {
        category: String,
        run: String,
        /// New suffix after the run id (empty removes the suffix)
        #[arg(long, default_value = "")]
        suffix: String,
        /// Explicit base name, replacing the id-derived base
        #[arg(long)]
        base: Option<String>,
    },
    /// Delete a run, or a whole category when no run is given
    Delete {
        category: String,
        run: Option<String>,
    },
    /// Record a synthetic demo run (noisy steady + noisy ramp)
    Record {
        category: String,
        /// Number of rows to write
        #[arg(long, default_value_t = 100)]
        rows: u32,
        /// Time unit for the run file
        #[arg(long, value_enum, default_value_t = UnitArg::Ms)]
        unit: UnitArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum UnitArg {
    S,
    Ms,
    Ns,
}

impl From<UnitArg> for TimeUnit {
    fn from(u: UnitArg) -> Self {
        match u {
            UnitArg::S => TimeUnit::Seconds,
            UnitArg::Ms => TimeUnit::Milliseconds,
            UnitArg::Ns => TimeUnit::Nanoseconds,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = RunStore::new(StoreConfig::resolve(cli.root.clone()));

    match run(&cli.command, &store) {
        Ok(value) => {
            println!("{value}");
            ExitCode::from(exit_codes::OK)
        }
        Err(e) => {
            let payload = json!({ "ok": false, "error": e.to_string(), "code": e.code() });
            eprintln!("{payload}");
            if e.is_not_found() {
                ExitCode::from(exit_codes::NOT_FOUND)
            } else if e.is_validation() {
                ExitCode::from(exit_codes::VALIDATION)
            } else {
                ExitCode::from(exit_codes::FAILURE)
            }
        }
    }
}

fn run(command: &Command, store: &RunStore) -> Result<serde_json::Value, Error> {
    match command {
        Command::Categories => {
            let categories = store.list_categories()?;
            Ok(json!({ "categories": categories }))
        }
        Command::Runs { category } => {
            let runs = store.list_runs(category)?;
            Ok(json!({ "category": category, "runs": runs }))
        }
        Command::Meta { category, run } => {
            let meta = store.run_metadata(category, run)?;
            Ok(json!({
                "category": category,
                "run": run,
                "exists": meta.exists,
                "bytes": meta.bytes,
            }))
        }
        Command::Tree => {
            let tree = store.tree()?;
            Ok(json!({ "categories": tree }))
        }
        Command::Data { category, run } => {
            let payload = store.query_run(category, run)?;
            Ok(serde_json::to_value(payload)?)
        }
        Command::Rename {
            category,
            run,
            suffix,
            base,
        } => {
            let new_base = store.rename_run(category, run, Some(suffix.as_str()), base.as_deref())?;
            Ok(json!({ "ok": true, "run": new_base }))
        }
        Command::Delete { category, run } => {
            store.delete(category, run.as_deref())?;
            match run {
                Some(run) => Ok(json!({ "ok": true, "run": run })),
                None => Ok(json!({ "ok": true, "category": category })),
            }
        }
        Command::Record {
            category,
            rows,
            unit,
        } => {
            let writer = store.create_writer(category)?;
            record_demo(&writer, *rows, (*unit).into());
            let dropped = writer.dropped_rows();
            writer.close();
            Ok(json!({
                "ok": true,
                "category": writer.category(),
                "run": writer.run_base(),
                "rows": rows,
                "dropped": dropped,
            }))
        }
    }
}

/// Synthetic demo telemetry: a noisy steady signal and a noisy linear ramp,
/// 10 ms apart, the shape the dashboard is typically tuned against.
fn record_demo(writer: &runlog_store::RunWriter, rows: u32, unit: TimeUnit) {
    let mut state = 0x9e3779b97f4a7c15u64;
    let mut noise = move || {
        // xorshift; uniform in [-1, 1), good enough for demo jitter
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    };

    for i in 0..rows {
        let t_ms = i as f64 * 10.0;
        let t = match unit {
            TimeUnit::Seconds => t_ms / 1_000.0,
            TimeUnit::Milliseconds => t_ms,
            TimeUnit::Nanoseconds => t_ms * 1_000_000.0,
        };
        let fields = RowFields::new()
            .set("x", 500.0 + 20.0 * noise())
            .set("y", 0.5 * t_ms + 1.0 + 40.0 * noise());
        match unit {
            TimeUnit::Seconds => writer.log_seconds(t, &fields),
            TimeUnit::Milliseconds => writer.log_millis(t, &fields),
            TimeUnit::Nanoseconds => writer.log_nanos(t, &fields),
        }
    }
}
