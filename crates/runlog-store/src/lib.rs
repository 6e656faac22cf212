//! Runlog telemetry store.
//!
//! An append-only, file-backed recorder for numeric measurements over time,
//! paired with a read/query engine that reshapes recorded rows into
//! column-oriented time series.
//!
//! Layout on disk:
//!
//! ```text
//! <store-root>/<Category>/<RunBase>.jsonl
//! ```
//!
//! Each run file is UTF-8 JSON Lines: an optional unit declaration first
//! (`{"tUnit":"ms"}`), then one row per line (`{"t":12.5,"x":501.3}`). The
//! filesystem is the only state store; readers always reflect current
//! on-disk state.

pub mod alloc;
pub mod catalog;
pub mod config;
pub mod layout;
pub mod lifecycle;
pub mod query;
pub mod store;
pub mod writer;

pub use catalog::{CategoryEntry, RunEntry, RunMeta};
pub use config::StoreConfig;
pub use query::SeriesPayload;
pub use store::RunStore;
pub use writer::{RowFields, RunWriter};

pub use runlog_common::{Error, Result, TimeUnit};
