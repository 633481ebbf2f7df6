use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use ephid_core::IdentifierSpace;
use ephid_logging::{ephid_debug, ephid_info, ephid_warn};
use serde::{Deserialize, Serialize};

use crate::catalog::catalog_fingerprint;
use crate::persist::{CacheDir, PersistError};
use crate::GenerateOptions;

/// Bumped whenever the stored envelope or the probing rules change.
pub const CACHE_VERSION: u32 = 3;

/// Byte-oriented key/value store for generated spaces.
pub trait SpaceCache: Send + Sync {
    /// `Ok(None)` when no entry exists for `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError>;
    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), PersistError>;
}

/// One JSON file per key inside a caller-chosen directory.
#[derive(Debug, Clone)]
pub struct DirSpaceCache {
    dir: CacheDir,
}

impl DirSpaceCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: CacheDir::new(dir),
        }
    }

    pub fn dir(&self) -> &CacheDir {
        &self.dir
    }
}

impl SpaceCache for DirSpaceCache {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        self.dir.read(key)
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let path = self.dir.write(key, bytes)?;
        ephid_debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// Process-local cache, mostly useful for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemorySpaceCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySpaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpaceCache for MemorySpaceCache {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope<S> {
    version: u32,
    catalog: String,
    model_id: String,
    prefix: String,
    long: bool,
    space: S,
}

/// Any failure (unreadable, corrupt, stale schema, foreign entry) is a miss.
pub(crate) fn load_space(
    cache: &dyn SpaceCache,
    key: &str,
    model_id: &str,
    options: &GenerateOptions,
) -> Option<IdentifierSpace> {
    let bytes = match cache.load(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            ephid_info!("Cache miss for {}", key);
            return None;
        }
        Err(err) => {
            ephid_warn!("Failed to read cached space {}: {}", key, err);
            return None;
        }
    };

    let envelope: CacheEnvelope<IdentifierSpace> = match serde_json::from_slice(&bytes) {
        Ok(envelope) => envelope,
        Err(err) => {
            ephid_warn!("Ignoring corrupt cached space {}: {}", key, err);
            return None;
        }
    };

    let matches = envelope.version == CACHE_VERSION
        && envelope.catalog == catalog_fingerprint()
        && envelope.model_id == model_id
        && envelope.prefix == options.prefix
        && envelope.long == options.long
        && envelope.space.starter_length() == options.starter_length();
    if !matches {
        ephid_info!("Ignoring stale cached space {} (version {})", key, envelope.version);
        return None;
    }
    Some(envelope.space)
}

/// Write failures are logged and otherwise ignored.
pub(crate) fn store_space(
    cache: &dyn SpaceCache,
    key: &str,
    model_id: &str,
    options: &GenerateOptions,
    space: &IdentifierSpace,
) {
    let envelope = CacheEnvelope {
        version: CACHE_VERSION,
        catalog: catalog_fingerprint(),
        model_id: model_id.to_string(),
        prefix: options.prefix.clone(),
        long: options.long,
        space,
    };
    let bytes = match serde_json::to_vec(&envelope) {
        Ok(bytes) => bytes,
        Err(err) => {
            ephid_warn!("Failed to serialize identifier space {}: {}", key, err);
            return;
        }
    };
    match cache.store(key, &bytes) {
        Ok(()) => ephid_info!("Saved identifier space to cache as {}", key),
        Err(err) => ephid_warn!("Failed to write cached space {}: {}", key, err),
    }
}
