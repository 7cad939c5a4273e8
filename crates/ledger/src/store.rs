//! Durable storage for the state document.
//!
//! The document is small, so every write serializes it whole. The file store
//! writes to a sibling temp file and renames it into place, so a crash leaves
//! either the previous or the new document on disk, never a torn one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::Document;

/// Backing storage for the state document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load the document, or `None` if nothing has been stored yet.
    async fn load(&self) -> Result<Option<Document>, StoreError>;

    /// Overwrite the stored document.
    async fn persist(&self, document: &Document) -> Result<(), StoreError>;
}

/// JSON file implementation of DocumentStore.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Document>, StoreError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let document = serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "loaded state document");

        Ok(Some(document))
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(document)?;
        let temp_path = self.temp_path();

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}
