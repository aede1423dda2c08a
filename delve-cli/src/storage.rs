//! JSON save files on local disk.
use delve_game::{RunState, RunStorage, SaveError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("save file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: SaveError,
    },
}

/// One file per slot inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage rooted at the parent of `path`, with the file name as its slot.
    #[must_use]
    pub fn for_file(path: &Path) -> (Self, String) {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let slot = path
            .file_name()
            .map_or_else(|| "savegame.json".to_string(), |n| n.to_string_lossy().into_owned());
        (Self::new(dir), slot)
    }

    #[must_use]
    pub fn path_for(&self, slot: &str) -> PathBuf {
        self.dir.join(slot)
    }
}

impl RunStorage for JsonFileStorage {
    type Error = StorageError;

    fn save_run(&self, slot: &str, state: &RunState) -> Result<(), Self::Error> {
        let path = self.path_for(slot);
        let json = state.to_json().map_err(|source| StorageError::Corrupt {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StorageError::Io { path, source })
    }

    fn load_run(&self, slot: &str) -> Result<Option<RunState>, Self::Error> {
        let path = self.path_for(slot);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        RunState::from_json(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt { path, source })
    }

    fn delete_run(&self, slot: &str) -> Result<(), Self::Error> {
        let path = self.path_for(slot);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}
