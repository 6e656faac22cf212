//! Runlog common types, errors, and name handling.
//!
//! This crate provides foundational types shared across runlog crates:
//! - Unified error type with diagnostic codes
//! - Filesystem-safe name sanitization
//! - Time unit declarations for run files

pub mod error;
pub mod name;
pub mod unit;

pub use error::{Error, Result};
pub use name::{is_safe_name, sanitize_category, sanitize_suffix, FALLBACK_CATEGORY};
pub use unit::{TimeUnit, UNIT_KEY, UNIT_KEY_LEGACY};

/// File extension for run files (without the leading dot).
pub const RUN_EXTENSION: &str = "jsonl";
