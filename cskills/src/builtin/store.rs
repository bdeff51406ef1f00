//! JSON files backing the notes and reminders skills.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::SkillError;

/// A data directory shared by skills that persist user data.
///
/// Clones share one lock so read-modify-write cycles do not interleave.
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A missing or unreadable-as-JSON file reads as empty.
    pub(crate) fn load<T>(&self, file: &str) -> Result<T, SkillError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.dir.join(file);
        let body = match std::fs::read_to_string(&path) {
            Ok(body) => body,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => {
                return Err(SkillError::storage(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(
                    event = "data_file_corrupt",
                    path = %path.display(),
                    error = %err,
                    "treating data file as empty"
                );
                Ok(T::default())
            }
        }
    }

    pub(crate) fn save<T>(&self, file: &str, value: &T) -> Result<(), SkillError>
    where
        T: Serialize,
    {
        std::fs::create_dir_all(&self.dir).map_err(|err| {
            SkillError::storage(format!(
                "failed to create data directory {}: {err}",
                self.dir.display()
            ))
        })?;
        let path = self.dir.join(file);
        let body = serde_json::to_string_pretty(value)
            .map_err(|err| SkillError::storage(format!("failed to encode {file}: {err}")))?;
        std::fs::write(&path, body).map_err(|err| {
            SkillError::storage(format!("failed to write {}: {err}", path.display()))
        })
    }
}
