//! Store configuration and root directory resolution.
//!
//! Resolution ladder: explicit path → `RUNLOG_ROOT` environment variable →
//! platform data directory → current directory fallback.

use std::path::{Path, PathBuf};

/// Environment variable overriding the store root.
pub const ROOT_ENV_VAR: &str = "RUNLOG_ROOT";

/// Directory name used under the platform data directory.
const DEFAULT_DIR_NAME: &str = "runlog";

/// Store configuration. The root directory is the single external
/// dependency of the core.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    root: PathBuf,
}

impl StoreConfig {
    /// Create a config with an explicit root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the store root from an optional explicit path, falling back
    /// to `RUNLOG_ROOT`, then the platform data directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        if let Some(root) = explicit {
            return Self::new(root);
        }
        if let Some(root) = std::env::var_os(ROOT_ENV_VAR) {
            return Self::new(PathBuf::from(root));
        }
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(DEFAULT_DIR_NAME))
    }

    /// The store root directory. Created lazily on first write.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_wins() {
        let cfg = StoreConfig::resolve(Some(PathBuf::from("/tmp/explicit")));
        assert_eq!(cfg.root(), Path::new("/tmp/explicit"));
    }

    #[test]
    fn default_root_is_non_empty() {
        let cfg = StoreConfig::resolve(None);
        assert!(!cfg.root().as_os_str().is_empty());
    }
}
