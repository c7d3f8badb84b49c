//! Persisted product records.
//!
//! A store holds one batch of records at a time. Writers replace the whole
//! batch and readers subscribe to snapshots; a snapshot is published only
//! after the replacement has been written.

mod json_file;
mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopcart_core::{Product, ProductCode, ProductId};
use thiserror::Error;
use tokio::sync::watch;

pub use json_file::JsonFileProductStore;
pub use memory::MemoryProductStore;

/// Errors that can occur in a product store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file holds something other than product records.
    #[error("store data is corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),

    /// The store cannot serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A product as persisted, stamped with the time of the batch write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub code: ProductCode,
    pub name: String,
    pub price: Decimal,
    /// Epoch milliseconds of the write that produced this record.
    pub last_updated: i64,
}

impl ProductRecord {
    /// The product this record describes.
    #[must_use]
    pub fn to_product(&self) -> Product {
        Product::new(self.id, self.code.clone(), self.name.clone(), self.price)
    }
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self::new(record.id, record.code, record.name, record.price)
    }
}

/// Storage for the current product batch.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Newest `last_updated` across all records, `None` when empty.
    async fn most_recent_update(&self) -> Result<Option<i64>, StoreError>;

    /// Replace every record with `records` in one step.
    async fn replace_all(&self, records: Vec<ProductRecord>) -> Result<(), StoreError>;

    /// Receiver that yields the current batch and every later replacement.
    async fn subscribe(&self) -> Result<watch::Receiver<Vec<ProductRecord>>, StoreError>;
}

fn newest(records: &[ProductRecord]) -> Option<i64> {
    records.iter().map(|record| record.last_updated).max()
}
