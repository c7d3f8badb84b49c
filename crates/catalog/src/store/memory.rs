use async_trait::async_trait;
use tokio::sync::watch;

use super::{ProductRecord, ProductStore, StoreError, newest};

/// Process-local product store.
#[derive(Debug)]
pub struct MemoryProductStore {
    sender: watch::Sender<Vec<ProductRecord>>,
}

impl MemoryProductStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store pre-filled with `records`.
    #[must_use]
    pub fn with_records(records: Vec<ProductRecord>) -> Self {
        Self {
            sender: watch::Sender::new(records),
        }
    }

    /// Copy of the current batch.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProductRecord> {
        self.sender.borrow().clone()
    }
}

impl Default for MemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn most_recent_update(&self) -> Result<Option<i64>, StoreError> {
        Ok(newest(&self.sender.borrow()))
    }

    async fn replace_all(&self, records: Vec<ProductRecord>) -> Result<(), StoreError> {
        self.sender.send_replace(records);
        Ok(())
    }

    async fn subscribe(&self) -> Result<watch::Receiver<Vec<ProductRecord>>, StoreError> {
        Ok(self.sender.subscribe())
    }
}
