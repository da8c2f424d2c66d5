use super::PhotoStore;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Photos as plain files under one directory.
pub struct DiskPhotoStore {
    root: PathBuf,
}

impl DiskPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> AppResult<PathBuf> {
        let candidate = Path::new(name);
        if name.is_empty() || candidate.components().count() != 1 || name.starts_with('.') {
            return Err(AppError::Validation(format!("Invalid photo name: {}", name)));
        }
        Ok(self.root.join(candidate))
    }
}

#[async_trait]
impl PhotoStore for DiskPhotoStore {
    async fn put(&self, name: &str, data: &[u8]) -> AppResult<()> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!("Failed to create upload directory: {}", e))
        })?;

        // Readers never see a half-written file under the final name.
        let partial = self.root.join(format!(".{}.part", name));
        fs::write(&partial, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write photo: {}", e)))?;
        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(AppError::Storage(format!("Failed to store photo: {}", e)));
        }
        Ok(())
    }

    async fn get(&self, name: &str) -> AppResult<Option<Vec<u8>>> {
        let path = self.path_for(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read photo: {}", e))),
        }
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete photo: {}", e))),
        }
    }
}

#[derive(Default)]
pub struct MemoryPhotoStore {
    blobs: DashMap<String, Vec<u8>>,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn put(&self, name: &str, data: &[u8]) -> AppResult<()> {
        self.blobs.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, name: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(name).map(|b| b.value().clone()))
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        self.blobs.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("melawatch-photos-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn disk_store_round_trip_and_delete() {
        let root = scratch_dir();
        let store = DiskPhotoStore::new(&root);

        store.put("1-abc-photo.jpg", b"bytes").await.unwrap();
        assert_eq!(
            store.get("1-abc-photo.jpg").await.unwrap(),
            Some(b"bytes".to_vec())
        );
        assert!(!root.join(".1-abc-photo.jpg.part").exists());

        store.delete("1-abc-photo.jpg").await.unwrap();
        assert_eq!(store.get("1-abc-photo.jpg").await.unwrap(), None);
        // deleting twice is fine
        store.delete("1-abc-photo.jpg").await.unwrap();

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn disk_store_rejects_traversal() {
        let store = DiskPhotoStore::new(scratch_dir());
        assert!(store.get("../etc/passwd").await.is_err());
        assert!(store.get("a/b.jpg").await.is_err());
        assert!(store.put(".hidden", b"x").await.is_err());
    }
}
