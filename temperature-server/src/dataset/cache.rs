//! In-memory cache of loaded tables, keyed by file path.
//!
//! An entry stays valid while the file's modification time and byte size
//! match the values recorded when it was loaded. Any difference forces a
//! full reload; entries are replaced whole, never patched.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use tracing::{debug, info};

use super::error::DatasetError;
use super::loader::{LoadedTable, load_table};
use super::order::sort_stations;
use super::table::{Month, Table};

/// Modification signature of a file: (mtime, size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityStamp {
    pub modified: SystemTime,
    pub size: u64,
}

impl ValidityStamp {
    /// Stat `path`, failing with `NotFound` if it is absent.
    pub fn of(path: &Path) -> Result<Self, DatasetError> {
        let metadata = std::fs::metadata(path).map_err(|e| DatasetError::from_io(path, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| DatasetError::from_io(path, e))?;

        Ok(Self {
            modified,
            size: metadata.len(),
        })
    }
}

/// A loaded table together with what was derived from it at load time.
#[derive(Debug)]
pub struct CacheEntry {
    pub stamp: ValidityStamp,
    pub table: Table,
    /// Months present, in calendar order.
    pub months: Vec<Month>,
    /// Distinct station identifiers.
    pub stations: HashSet<String>,
    /// The same identifiers in canonical order.
    pub sorted_stations: Vec<String>,
}

impl CacheEntry {
    /// Build an entry from a freshly loaded table.
    pub fn new(stamp: ValidityStamp, loaded: LoadedTable) -> Self {
        let mut sorted_stations: Vec<String> = loaded.stations.iter().cloned().collect();
        sort_stations(&mut sorted_stations);

        Self {
            stamp,
            table: loaded.table,
            months: loaded.months,
            stations: loaded.stations,
            sorted_stations,
        }
    }
}

/// Process-wide table cache.
///
/// Construct one at start-up and share it. Lookups and reloads run under
/// a single lock, so concurrent requests for a changed file trigger one
/// load and nobody sees a half-built entry.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: Mutex<HashMap<PathBuf, Arc<CacheEntry>>>,
}

impl TableCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current table for `path`, loading it if the cached copy
    /// is missing or stale.
    pub fn resolve(&self, path: &Path) -> Result<Arc<CacheEntry>, DatasetError> {
        let stamp = ValidityStamp::of(path)?;

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(path)
            && entry.stamp == stamp
        {
            debug!("Cache hit for {}", path.display());
            return Ok(Arc::clone(entry));
        }

        let loaded = load_table(path)?;
        let entry = Arc::new(CacheEntry::new(stamp, loaded));
        info!(
            "Loaded {} rows for {} stations from {}",
            entry.table.len(),
            entry.stations.len(),
            path.display()
        );

        entries.insert(path.to_path_buf(), Arc::clone(&entry));
        Ok(entry)
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
