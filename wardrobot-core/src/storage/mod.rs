// src/storage/mod.rs

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::Error;

/// Durable blob store for processed garment images: a flat directory of
/// uniquely named files. Names are generated here, so concurrent writes
/// never collide and the store stays append-only at the file layer.
#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| Error::Storage(format!("cannot create media dir {:?}: {}", root, e)))?;
        Ok(Self { root })
    }

    /// Write `bytes` under a fresh generated name and return that name as the
    /// durable reference.
    pub async fn store(&self, bytes: &[u8], ext: &str) -> Result<String, Error> {
        let name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.root.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Storage(format!("cannot write {:?}: {}", path, e)))?;
        Ok(name)
    }

    /// Absolute path for a stored reference. Rejects names that could escape
    /// the store root.
    pub fn path(&self, name: &str) -> Result<PathBuf, Error> {
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(Error::NotFound(format!("invalid media name: {}", name)));
        }
        Ok(self.root.join(name))
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, Error> {
        let path = self.path(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("no stored image {}", name)))
            }
            Err(e) => Err(Error::Storage(format!("cannot read {:?}: {}", path, e))),
        }
    }

    /// Best-effort removal, used to avoid orphaned files when a later
    /// pipeline step fails.
    pub async fn remove(&self, name: &str) {
        if let Ok(path) = self.path(name) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("failed to remove stored image {:?}: {}", path, e);
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_read_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path()).unwrap();

        let name = store.store(b"png bytes", "png").await.unwrap();
        assert!(name.ends_with(".png"));

        let read = store.read(&name).await.unwrap();
        assert_eq!(read, b"png bytes");

        store.remove(&name).await;
        assert!(matches!(store.read(&name).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn generated_names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path()).unwrap();

        let a = store.store(b"a", "png").await.unwrap();
        let b = store.store(b"b", "png").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path()).unwrap();

        assert!(store.path("../etc/passwd").is_err());
        assert!(store.path("a/b.png").is_err());
    }
}
