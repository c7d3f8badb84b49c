use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::FileCache;
use crate::error::CatalogError;

/// File cache backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalFileCache {
    dir: PathBuf,
}

impl LocalFileCache {
    /// Cache files under `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the cached files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, CatalogError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(CatalogError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid cache file name '{name}'"),
            )));
        }
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl FileCache for LocalFileCache {
    async fn write(&self, name: &str, text: &str) -> Result<(), CatalogError> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, text).await?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "Wrote cache file");
        Ok(())
    }

    async fn read(&self, name: &str) -> Option<String> {
        let path = self.path_for(name).ok()?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read cache file");
                None
            }
        }
    }
}

/// In-memory file cache.
///
/// Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileCache {
    files: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryFileCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding a single file.
    #[must_use]
    pub fn with_file(name: &str, text: &str) -> Self {
        let files = HashMap::from([(name.to_string(), text.to_string())]);
        Self {
            files: Arc::new(RwLock::new(files)),
        }
    }
}

#[async_trait]
impl FileCache for MemoryFileCache {
    async fn write(&self, name: &str, text: &str) -> Result<(), CatalogError> {
        self.files
            .write()
            .await
            .insert(name.to_string(), text.to_string());
        Ok(())
    }

    async fn read(&self, name: &str) -> Option<String> {
        self.files.read().await.get(name).cloned()
    }
}
