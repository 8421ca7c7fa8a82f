//! Where the ledger lives

use std::path::{Path, PathBuf};

/// File name used when no other store location is configured
pub const DEFAULT_STORE_FILE: &str = "textile_products.csv";

/// Settings for opening a [`CsvLedger`](crate::types::CsvLedger).
///
/// Built once at startup and handed to the store; relative paths resolve against the
/// process's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    store_path: PathBuf,
}

impl LedgerConfig {
    /// Creates a configuration pointing at `store_path`
    #[must_use]
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    /// Returns the location of the backing CSV file
    #[must_use]
    #[inline]
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_FILE)
    }
}
