// # File State Store
//
// File-based implementation of StateStore.
//
// ## Durability
//
// - Atomic writes: write to `<file>.tmp`, then rename over the state file
// - Backup: after every successful rename the new file is copied to
//   `<file>.backup`, so the backup is always the last good snapshot
// - A state file that fails to decode is a Storage error; nothing is
//   recovered automatically. `restore_backup` copies the backup back.
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "resources": {
//     "www": {
//       "resource": {
//         "kind": "record",
//         "state": { "id": "12345", "domain": "example.com", "name": "www", "type": "A", ... }
//       },
//       "refreshed_at": "2026-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateStore, TrackedEntry};

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// File-based state store with crash recovery
///
/// Every mutation is written through to disk immediately.
///
/// # Example
///
/// ```rust,no_run
/// use porkdns_core::state::FileStateStore;
/// use porkdns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("porkdns.state.json").await?;
///     for address in store.list().await? {
///         println!("tracking {}", address);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

/// Internal state for file-based store
#[derive(Debug)]
struct FileState {
    resources: BTreeMap<String, TrackedEntry>,
    dirty: bool,
}

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    resources: BTreeMap<String, TrackedEntry>,
}

impl FileStateStore {
    /// Create or load a file state store
    ///
    /// A missing file starts empty (parent directories are created). An
    /// unreadable or undecodable file is an error.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create state directory", parent, e))?;
        }

        let resources = Self::load_state(&path).await?;
        tracing::debug!(
            "Loaded {} tracked resource(s) from {}",
            resources.len(),
            path.display()
        );

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                resources,
                dirty: false,
            })),
        })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the state file at `path` with its `.backup` snapshot
    ///
    /// The backup must decode; returns the number of resources restored.
    pub async fn restore_backup<P: AsRef<Path>>(path: P) -> Result<usize, Error> {
        let path = path.as_ref();
        let backup = sibling(path, "backup");
        if !backup.exists() {
            return Err(Error::state_store(format!(
                "No backup found at {}",
                backup.display()
            )));
        }

        let resources = Self::load_state(&backup).await?;
        fs::copy(&backup, path)
            .await
            .map_err(|e| io_error("restore", path, e))?;

        tracing::info!(
            "Restored {} tracked resource(s) from {}",
            resources.len(),
            backup.display()
        );
        Ok(resources.len())
    }

    /// Load state from file; a missing file is empty state
    async fn load_state(path: &Path) -> Result<BTreeMap<String, TrackedEntry>, Error> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| io_error("read state file", path, e))?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::state_store(format!(
                "State file {} is corrupted ({}); fix it or restore {}",
                path.display(),
                e,
                sibling(path, "backup").display()
            ))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.resources)
    }

    /// Persist every tracked resource: temp file, rename over the state
    /// file, then snapshot it as the backup
    async fn write_state(&self) -> Result<(), Error> {
        let mut guard = self.state.write().await;

        let snapshot = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            resources: guard.resources.clone(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| Error::state_store(format!("Failed to encode tracked state: {}", e)))?;

        let temp = sibling(&self.path, "tmp");
        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| io_error("create", &temp, e))?;
        file.write_all(&json)
            .await
            .map_err(|e| io_error("write", &temp, e))?;
        file.sync_all()
            .await
            .map_err(|e| io_error("sync", &temp, e))?;
        drop(file);

        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| io_error("replace", &self.path, e))?;

        if let Err(e) = fs::copy(&self.path, sibling(&self.path, "backup")).await {
            tracing::warn!("Could not refresh state backup: {}", e);
        }

        guard.dirty = false;
        tracing::trace!(
            "Wrote {} tracked resource(s) to {}",
            guard.resources.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// `path` with its extension replaced
fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    sibling.set_extension(extension);
    sibling
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::state_store(format!("Failed to {} {}: {}", action, path.display(), err))
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, address: &str) -> Result<Option<TrackedEntry>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.resources.get(address).cloned())
    }

    async fn put(&self, address: &str, entry: &TrackedEntry) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            state_guard
                .resources
                .insert(address.to_string(), entry.clone());
            state_guard.dirty = true;
        }

        self.write_state().await
    }

    async fn remove(&self, address: &str) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            if state_guard.resources.remove(address).is_none() {
                return Ok(());
            }
            state_guard.dirty = true;
        }

        self.write_state().await
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.resources.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty {
            self.write_state().await
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nameserver::NameServerSet;
    use crate::record::{DnsRecord, RecordSpec, RecordType};
    use crate::ErrorKind;
    use crate::traits::TrackedResource;
    use tempfile::tempdir;

    fn record(content: &str) -> DnsRecord {
        DnsRecord::new(
            "12345",
            RecordSpec::new("example.com", RecordType::A, content).with_name("www"),
        )
    }

    #[tokio::test]
    async fn test_file_store_basic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());

        store
            .put("www", &TrackedEntry::record(record("192.0.2.1")))
            .await
            .unwrap();
        store
            .put(
                "delegation",
                &TrackedEntry::nameservers(NameServerSet::new("example.com", ["ns1.host.net"])),
            )
            .await
            .unwrap();
        assert!(path.exists());

        // Load new instance and verify persistence
        let store2 = FileStateStore::new(&path).await.unwrap();
        assert_eq!(store2.list().await.unwrap(), vec!["delegation", "www"]);
        let entry = store2.get("www").await.unwrap().unwrap();
        assert_eq!(entry.resource, TrackedResource::Record(record("192.0.2.1")));
    }

    #[tokio::test]
    async fn test_file_store_remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store
            .put("www", &TrackedEntry::record(record("192.0.2.1")))
            .await
            .unwrap();
        store.remove("www").await.unwrap();

        let store2 = FileStateStore::new(&path).await.unwrap();
        assert!(store2.get("www").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_corruption_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store
            .put("www", &TrackedEntry::record(record("192.0.2.1")))
            .await
            .unwrap();
        assert!(sibling(&path, "backup").exists());

        fs::write(&path, b"corrupted json data").await.unwrap();

        let err = FileStateStore::new(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("corrupted"));
    }

    #[tokio::test]
    async fn test_file_store_corruption_without_backup_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json").await.unwrap();

        let err = FileStateStore::new(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(FileStateStore::restore_backup(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_backup_is_latest_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store
            .put("www", &TrackedEntry::record(record("192.0.2.1")))
            .await
            .unwrap();
        store
            .put("www", &TrackedEntry::record(record("192.0.2.2")))
            .await
            .unwrap();

        fs::write(&path, b"").await.unwrap();
        assert_eq!(FileStateStore::restore_backup(&path).await.unwrap(), 1);

        let restored = FileStateStore::new(&path).await.unwrap();
        let entry = restored.get("www").await.unwrap().unwrap();
        assert_eq!(entry.resource, TrackedResource::Record(record("192.0.2.2")));
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store
            .put("www", &TrackedEntry::record(record("192.0.2.1")))
            .await
            .unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }
}
