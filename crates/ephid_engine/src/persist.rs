use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cache directory {path:?} is unusable: {reason}")]
    CacheDir { path: PathBuf, reason: String },
    #[error("cache key {0:?} is not a plain file name")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Directory holding one file per cache key.
///
/// Writes go through a temp file in the same directory and are renamed into
/// place, so a reader sees either the old entry or the new one.
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if missing; fails if the path is not a directory.
    pub fn ensure(&self) -> Result<(), PersistError> {
        let unusable = |reason: String| PersistError::CacheDir {
            path: self.root.clone(),
            reason,
        };
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(unusable("not a directory".into())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.root).map_err(|e| unusable(e.to_string()))
            }
            Err(err) => Err(unusable(err.to_string())),
        }
    }

    pub fn entry_path(&self, key: &str) -> Result<PathBuf, PersistError> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);
        if !plain {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    /// `Ok(None)` when the entry (or the whole directory) does not exist.
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        match fs::read(self.entry_path(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn write(&self, key: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        let target = self.entry_path(key)?;
        self.ensure()?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
