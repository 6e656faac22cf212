//! Store facade: the single seam transports build on.

use crate::catalog::{self, CategoryEntry, RunMeta};
use crate::config::StoreConfig;
use crate::lifecycle;
use crate::query::{self, SeriesPayload};
use crate::writer::RunWriter;
use runlog_common::Result;
use std::path::Path;

/// Handle to one store root, exposing the full operation surface:
/// listings, metadata, query, rename, delete, and writer creation.
///
/// Cheap to construct; holds no open files and no cached state. The only
/// long-lived resource in the system is a [`RunWriter`] returned by
/// [`RunStore::create_writer`].
#[derive(Debug, Clone)]
pub struct RunStore {
    config: StoreConfig,
}

impl RunStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Open a store at an explicit root directory.
    pub fn open(root: impl Into<std::path::PathBuf>) -> Self {
        Self::new(StoreConfig::new(root))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// Open a new run for appending under the given category.
    pub fn create_writer(&self, category: &str) -> Result<RunWriter> {
        RunWriter::create(&self.config, category)
    }

    /// Ordered category names (ascending).
    pub fn list_categories(&self) -> Result<Vec<String>> {
        catalog::list_categories(self.root())
    }

    /// Ordered run base names for a category (descending).
    pub fn list_runs(&self, category: &str) -> Result<Vec<String>> {
        catalog::list_runs(self.root(), category)
    }

    /// Existence flag and byte size for one run.
    pub fn run_metadata(&self, category: &str, run: &str) -> Result<RunMeta> {
        catalog::run_metadata(self.root(), category, run)
    }

    /// Full tree snapshot for management views.
    pub fn tree(&self) -> Result<Vec<CategoryEntry>> {
        catalog::tree(self.root())
    }

    /// Reshape one run's rows into a column-oriented payload.
    pub fn query_run(&self, category: &str, run: &str) -> Result<SeriesPayload> {
        query::query_run(self.root(), category, run)
    }

    /// Rename a run; returns the new base name.
    pub fn rename_run(
        &self,
        category: &str,
        run: &str,
        suffix: Option<&str>,
        base_override: Option<&str>,
    ) -> Result<String> {
        lifecycle::rename_run(self.root(), category, run, suffix, base_override)
    }

    /// Delete one run, or the whole category when `run` is `None`.
    pub fn delete(&self, category: &str, run: Option<&str>) -> Result<()> {
        lifecycle::delete(self.root(), category, run)
    }
}
