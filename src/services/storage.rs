use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur with the persisted session store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

const STORE_VERSION: u32 = 1;

/// Local key-value store for session data, kept as a single JSON file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoreFile, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StoreFile {
                version: STORE_VERSION,
                entries: BTreeMap::new(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, file: &StoreFile) -> Result<(), StorageError> {
        let json = serde_json::to_string(file)?;

        let dir = self.path.parent().filter(|d| !d.as_os_str().is_empty());
        if let Some(dir) = dir {
            tokio::fs::create_dir_all(dir).await?;
        }

        // Write to a sibling then rename so readers never see a partial file
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.entries.remove(key))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut file = self.load().await?;
        file.version = STORE_VERSION;
        file.entries.insert(key.to_string(), value.to_string());
        self.save(&file).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut file = self.load().await?;
        if file.entries.remove(key).is_some() {
            self.save(&file).await?;
        }
        Ok(())
    }

    pub async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.load().await?.entries.into_keys().collect())
    }

    /// Drop every key, including any half-finished write
    pub async fn clear(&self) -> Result<(), StorageError> {
        remove_if_present(&self.tmp_path()).await?;
        remove_if_present(&self.path).await
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

async fn remove_if_present(path: &Path) -> Result<(), StorageError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> SessionStore {
        let path = std::env::temp_dir()
            .join(format!("tindev-store-{}", uuid::Uuid::new_v4()))
            .join("session.json");
        SessionStore::new(path)
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = temp_store();

        assert_eq!(store.get("user").await.unwrap(), None);

        store.set("user", "5d3f1c").await.unwrap();
        store.set("theme", "dark").await.unwrap();
        assert_eq!(store.get("user").await.unwrap(), Some("5d3f1c".to_string()));
        assert_eq!(store.keys().await.unwrap(), vec!["theme", "user"]);

        store.remove("theme").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["user"]);

        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = temp_store();
        store.set("user", "5d3f1c").await.unwrap();
        store.set("token", "abc").await.unwrap();

        store.clear().await.unwrap();

        assert!(store.keys().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_clear_on_missing_file_is_ok() {
        let store = temp_store();
        store.clear().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_stranded_temp_file() {
        let store = temp_store();
        store.set("user", "5d3f1c").await.unwrap();

        // Left behind by a write whose rename never happened
        let tmp = store.path().with_extension("json.tmp");
        tokio::fs::write(&tmp, r#"{"version":1,"entries":{"user":"5d3f1c"}}"#)
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(!store.path().exists());
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let store = temp_store();
        tokio::fs::create_dir_all(store.path().parent().unwrap()).await.unwrap();
        tokio::fs::write(store.path(), "not json").await.unwrap();

        assert!(matches!(store.get("user").await, Err(StorageError::Serialization(_))));

        // Logout must still be able to wipe it
        store.clear().await.unwrap();
    }
}
