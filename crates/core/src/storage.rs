//! Durable key/value storage for the persisted session subset

use crate::error::CoreResult;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Durable client-side storage keyed by string
///
/// Values are opaque strings; the session store writes JSON.
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `key`
    fn load(&self, key: &str) -> CoreResult<Option<String>>;

    /// Replace the value stored under `key`
    fn store(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with a single entry
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        storage
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::SessionStorage;
    use crate::error::{CoreError, CoreResult};
    use std::io::ErrorKind;
    use std::path::PathBuf;

    /// Storage that keeps one JSON file per key inside a directory
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        dir: PathBuf,
    }

    impl FileStorage {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
            if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
                return Err(CoreError::storage(format!("invalid storage key: {key:?}")));
            }
            Ok(self.dir.join(format!("{key}.json")))
        }
    }

    impl SessionStorage for FileStorage {
        fn load(&self, key: &str) -> CoreResult<Option<String>> {
            match std::fs::read_to_string(self.path_for(key)?) {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        }

        fn store(&self, key: &str, value: &str) -> CoreResult<()> {
            let path = self.path_for(key)?;
            std::fs::create_dir_all(&self.dir)?;

            // Write-then-rename so a crash never leaves a half-written record
            let tmp = path.with_extension("json.tmp");
            std::fs::write(&tmp, value)?;
            std::fs::rename(&tmp, &path)?;
            Ok(())
        }

        fn remove(&self, key: &str) -> CoreResult<()> {
            match std::fs::remove_file(self.path_for(key)?) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        }
    }
}
