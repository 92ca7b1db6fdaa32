//! Key/value backends for the local cache
//!
//! Values are opaque strings (JSON in practice). Writes are last-write-wins:
//! two processes sharing a [`FileStore`] silently overwrite each other.

use crate::error::{CoreError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// File permissions for the storage file (Unix only): owner read/write.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Synchronous string key/value store
pub trait LocalStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
    fn clear(&self) -> Result<()>;
}

impl<S: LocalStore + ?Sized> LocalStore for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// In-process store, lost on drop
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.read().keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        self.items.write().clear();
        Ok(())
    }
}

/// Store backed by a single JSON object file
///
/// Every operation re-reads the file so writes from other processes are
/// visible. Writes go through a temp file + rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "local-storage.json";

    /// Open (or lazily create) `<dir>/local-storage.json`
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|source| CoreError::StorageWrite {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(Self::FILE_NAME);
        debug!(path = %path.display(), "Local storage opened");

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(CoreError::StorageRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|source| CoreError::StorageCorrupted {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(map).map_err(|source| CoreError::Encode {
            key: Self::FILE_NAME.to_string(),
            source,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        let write_err = |source| CoreError::StorageWrite {
            path: self.path.clone(),
            source,
        };

        std::fs::write(&tmp_path, content).map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(FILE_MODE))
                .map_err(write_err)?;
        }

        std::fs::rename(&tmp_path, &self.path).map_err(write_err)
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        apply(&mut map);
        self.write_map(&map)
    }
}

impl LocalStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.into_keys().collect())
    }

    fn clear(&self) -> Result<()> {
        self.update(BTreeMap::clear)
    }
}
