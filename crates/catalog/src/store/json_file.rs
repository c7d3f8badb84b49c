use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use tracing::instrument;

use super::{ProductRecord, ProductStore, StoreError, newest};

/// Product store backed by a single JSON file.
///
/// The file is read once on open. Replacements are written to a sibling
/// temporary file and renamed over the original before subscribers see them.
#[derive(Debug)]
pub struct JsonFileProductStore {
    path: PathBuf,
    sender: watch::Sender<Vec<ProductRecord>>,
    write_lock: Mutex<()>,
}

impl JsonFileProductStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str::<Vec<ProductRecord>>(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(count = records.len(), "Opened product store");

        Ok(Self {
            path,
            sender: watch::Sender::new(records),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_file(&self, records: &[ProductRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let text = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for JsonFileProductStore {
    async fn most_recent_update(&self) -> Result<Option<i64>, StoreError> {
        Ok(newest(&self.sender.borrow()))
    }

    #[instrument(skip(self, records), fields(path = %self.path.display(), count = records.len()))]
    async fn replace_all(&self, records: Vec<ProductRecord>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_file(&records).await?;
        self.sender.send_replace(records);
        Ok(())
    }

    async fn subscribe(&self) -> Result<watch::Receiver<Vec<ProductRecord>>, StoreError> {
        Ok(self.sender.subscribe())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::record;
    use super::*;

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileProductStore::open(dir.path().join("products.json"))
            .await
            .unwrap();

        assert_eq!(store.most_recent_update().await.unwrap(), None);
        assert!(store.subscribe().await.unwrap().borrow().is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("products.json");

        let store = JsonFileProductStore::open(&path).await.unwrap();
        store
            .replace_all(vec![record(1, "VOUCHER", 42), record(2, "TSHIRT", 42)])
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileProductStore::open(&path).await.unwrap();
        assert_eq!(reopened.most_recent_update().await.unwrap(), Some(42));
        let records = reopened.subscribe().await.unwrap().borrow().clone();
        assert_eq!(records, vec![record(1, "VOUCHER", 42), record(2, "TSHIRT", 42)]);
    }

    #[tokio::test]
    async fn test_subscriber_sees_write_after_file_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        let store = JsonFileProductStore::open(&path).await.unwrap();
        let mut rx = store.subscribe().await.unwrap();

        store.replace_all(vec![record(1, "MUG", 7)]).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert!(tokio::fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_open_corrupted_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        tokio::fs::write(&path, "{ not records").await.unwrap();

        let err = JsonFileProductStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }
}
