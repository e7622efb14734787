use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::data::loader::{load_bytes, read_source};
use crate::data::model::{fingerprint_bytes, Dataset};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Memoised dataset loading
// ---------------------------------------------------------------------------

/// Loaded datasets keyed by source path and content fingerprint.
///
/// The source is re-read on every lookup so that edited files are noticed,
/// but it is only re-parsed when its bytes changed.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it if absent or if the
    /// file content changed since it was cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let bytes = read_source(path)?;
        let fingerprint = fingerprint_bytes(&bytes);

        if let Some(cached) = self.entries.get(path) {
            if cached.fingerprint() == fingerprint {
                debug!("cache hit for {}", path.display());
                return Ok(Arc::clone(cached));
            }
            debug!("{} changed on disk, reloading", path.display());
        }

        let dataset = Arc::new(load_bytes(path, &bytes)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forget one source; the next lookup reloads it.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
