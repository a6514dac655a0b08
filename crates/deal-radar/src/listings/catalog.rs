use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use tracing::info;

use super::dataset::{read_listings_from_path, DatasetError};
use super::domain::ListingRecord;

#[derive(Debug, Default)]
struct Loaded {
    records: Arc<Vec<ListingRecord>>,
    path: Option<PathBuf>,
    modified: Option<SystemTime>,
}

/// Process-wide, read-mostly listing dataset.
///
/// Readers take a cheap `Arc` snapshot. A batch run that replaces the file on
/// disk is picked up by `refresh_if_stale`, which swaps in a new snapshot and
/// never mutates one already handed out.
#[derive(Debug)]
pub struct ListingCatalog {
    enriched_path: Option<PathBuf>,
    raw_path: Option<PathBuf>,
    loaded: RwLock<Loaded>,
}

impl ListingCatalog {
    /// Loads the enriched file when it exists, otherwise the raw listings.
    pub fn open(enriched_path: &Path, raw_path: &Path) -> Result<Self, DatasetError> {
        let catalog = Self {
            enriched_path: Some(enriched_path.to_path_buf()),
            raw_path: Some(raw_path.to_path_buf()),
            loaded: RwLock::new(Loaded::default()),
        };
        catalog.reload()?;
        Ok(catalog)
    }

    pub fn from_records(records: Vec<ListingRecord>) -> Self {
        Self {
            enriched_path: None,
            raw_path: None,
            loaded: RwLock::new(Loaded {
                records: Arc::new(records),
                ..Loaded::default()
            }),
        }
    }

    /// Path the next reload will read, if the catalog is file-backed.
    pub fn source_path(&self) -> Option<&Path> {
        match (&self.enriched_path, &self.raw_path) {
            (Some(enriched), _) if enriched.exists() => Some(enriched.as_path()),
            (_, Some(raw)) => Some(raw.as_path()),
            (Some(enriched), None) => Some(enriched.as_path()),
            (None, None) => None,
        }
    }

    /// Re-reads the backing file. In-memory catalogs keep their records.
    pub fn reload(&self) -> Result<usize, DatasetError> {
        let Some(path) = self.source_path() else {
            return Ok(self.snapshot().len());
        };

        let modified = modified_at(path);
        let records = read_listings_from_path(path)?;
        let count = records.len();
        *self
            .loaded
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Loaded {
            records: Arc::new(records),
            path: Some(path.to_path_buf()),
            modified,
        };

        info!(path = %path.display(), count, "listing dataset loaded");
        Ok(count)
    }

    /// Reloads when the source file changed or a different file now takes
    /// precedence. Returns whether a reload happened.
    pub fn refresh_if_stale(&self) -> Result<bool, DatasetError> {
        let Some(path) = self.source_path() else {
            return Ok(false);
        };

        let stale = {
            let loaded = self
                .loaded
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            loaded.path.as_deref() != Some(path) || loaded.modified != modified_at(path)
        };

        if stale {
            self.reload()?;
        }
        Ok(stale)
    }

    pub fn snapshot(&self) -> Arc<Vec<ListingRecord>> {
        self.loaded
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .records
            .clone()
    }

    pub fn find(&self, id: &str) -> Option<ListingRecord> {
        self.snapshot()
            .iter()
            .find(|listing| listing.id == id)
            .cloned()
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .ok()
}
