//! Time unit declarations for run files.
//!
//! A run file carries at most one meaningful unit declaration, written as
//! its first line: `{"tUnit":"s"}`. The unit governs how consumers interpret
//! the `t` field of every subsequent row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON key for the unit declaration line.
pub const UNIT_KEY: &str = "tUnit";

/// Legacy spelling of the unit declaration key, still honored on read.
pub const UNIT_KEY_LEGACY: &str = "t_unit";

/// Unit of the `t` field for an entire run file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "ns")]
    Nanoseconds,
}

impl TimeUnit {
    /// Wire representation used in the unit declaration line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Nanoseconds => "ns",
        }
    }
}

impl Default for TimeUnit {
    /// Readers assume seconds when a file never declared a unit.
    fn default() -> Self {
        TimeUnit::Seconds
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
