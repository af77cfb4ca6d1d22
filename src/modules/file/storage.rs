use std::path::{Path, PathBuf};

use crate::api::error;

/// Raw content of uploaded files, keyed by generated filename. The blobs are
/// meaningless without the matching row in `files`.
#[async_trait::async_trait]
pub trait BlobStorage {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), error::SystemError>;
    async fn read(&self, name: &str) -> Result<Vec<u8>, error::SystemError>;
    async fn delete(&self, name: &str) -> Result<(), error::SystemError>;
}

/// Rejects keys that could escape the storage directory.
pub fn validate_name(name: &str) -> Result<(), error::SystemError> {
    if name.is_empty() {
        return Err(error::SystemError::bad_request("Filename cannot be empty"));
    }
    if name.starts_with('.') || name.contains("..") || name.contains(['/', '\\', '\0']) {
        return Err(error::SystemError::bad_request("Invalid filename"));
    }
    Ok(())
}

/// Blob storage backed by a directory on the local filesystem.
#[derive(Clone)]
pub struct LocalBlobStorage {
    base_path: PathBuf,
}

impl LocalBlobStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, error::SystemError> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn blob_path(&self, name: &str) -> Result<PathBuf, error::SystemError> {
        validate_name(name)?;
        Ok(self.base_path.join(name))
    }
}

#[async_trait::async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), error::SystemError> {
        let path = self.blob_path(name)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, error::SystemError> {
        let path = self.blob_path(name)?;
        let bytes = tokio::fs::read(&path).await?;
        Ok(bytes)
    }

    async fn delete(&self, name: &str) -> Result<(), error::SystemError> {
        let path = self.blob_path(name)?;
        tokio::fs::remove_file(&path).await?;
        Ok(())
    }
}
