//! Repository combining the remote sources with local persistence.
//!
//! Both operations return `'static` streams of [`Resource`] values.
//! Consumers reduce them with "latest state wins".
//!
//! - [`ProductRepository::products`] gates remote refreshes on the age of
//!   the persisted catalog, then follows the store.
//! - [`ProductRepository::discount_rules`] prefers the remote table and falls
//!   back to the cached file, then to the bundled resource.
//!
//! [`Resource`]: shopcart_core::Resource

mod discounts;
mod products;

use std::sync::Arc;

use chrono::TimeDelta;

use crate::clock::{Clock, SystemClock};
use crate::files::{FileCache, ResourceBundle};
use crate::remote::{DiscountSource, ProductSource};
use crate::store::ProductStore;

/// Default maximum age of the persisted catalog.
pub const DEFAULT_FRESHNESS: TimeDelta = TimeDelta::hours(24);

/// Product and discount-rule repository.
///
/// Cheap to clone; every collaborator is shared.
#[derive(Clone)]
pub struct ProductRepository {
    product_source: Arc<dyn ProductSource>,
    discount_source: Arc<dyn DiscountSource>,
    store: Arc<dyn ProductStore>,
    files: Arc<dyn FileCache>,
    resources: Arc<dyn ResourceBundle>,
    clock: Arc<dyn Clock>,
    freshness: TimeDelta,
}

impl ProductRepository {
    /// Create a repository using the system clock and a 24 hour freshness
    /// window.
    #[must_use]
    pub fn new(
        product_source: Arc<dyn ProductSource>,
        discount_source: Arc<dyn DiscountSource>,
        store: Arc<dyn ProductStore>,
        files: Arc<dyn FileCache>,
        resources: Arc<dyn ResourceBundle>,
    ) -> Self {
        Self {
            product_source,
            discount_source,
            store,
            files,
            resources,
            clock: Arc::new(SystemClock),
            freshness: DEFAULT_FRESHNESS,
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the freshness window.
    #[must_use]
    pub fn with_freshness(mut self, freshness: TimeDelta) -> Self {
        self.freshness = freshness;
        self
    }

    /// Maximum age of the persisted catalog before a refresh.
    #[must_use]
    pub const fn freshness(&self) -> TimeDelta {
        self.freshness
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Collaborators that fail on demand.

    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::{Notify, watch};

    use crate::error::CatalogError;
    use crate::files::{FileCache, MemoryFileCache, StaticResources};
    use crate::remote::{MockDiscountSource, MockProductSource};
    use crate::store::{MemoryProductStore, ProductRecord, ProductStore, StoreError};

    use super::ProductRepository;

    /// Store wrapper whose operations can be made to fail.
    #[derive(Default)]
    pub struct FlakyStore {
        pub inner: MemoryProductStore,
        pub fail_read: bool,
        pub fail_write: bool,
        pub fail_subscribe: bool,
        pub writes: AtomicUsize,
        /// Writes wait for a permit on this gate before landing.
        pub write_gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl ProductStore for FlakyStore {
        async fn most_recent_update(&self) -> Result<Option<i64>, StoreError> {
            if self.fail_read {
                return Err(StoreError::Unavailable("read failed".to_string()));
            }
            self.inner.most_recent_update().await
        }

        async fn replace_all(&self, records: Vec<ProductRecord>) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.write_gate {
                gate.notified().await;
            }
            if self.fail_write {
                return Err(StoreError::Unavailable("write failed".to_string()));
            }
            self.inner.replace_all(records).await
        }

        async fn subscribe(&self) -> Result<watch::Receiver<Vec<ProductRecord>>, StoreError> {
            if self.fail_subscribe {
                return Err(StoreError::Unavailable("subscribe failed".to_string()));
            }
            self.inner.subscribe().await
        }
    }

    /// File cache whose writes always fail.
    pub struct ReadOnlyFiles(pub MemoryFileCache);

    #[async_trait]
    impl FileCache for ReadOnlyFiles {
        async fn write(&self, name: &str, _text: &str) -> Result<(), CatalogError> {
            Err(CatalogError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("read-only cache: {name}"),
            )))
        }

        async fn read(&self, name: &str) -> Option<String> {
            self.0.read(name).await
        }
    }

    /// File cache whose writes wait on `gate` and signal `written` once done.
    #[derive(Default)]
    pub struct GatedFiles {
        pub inner: MemoryFileCache,
        pub gate: Arc<Notify>,
        pub written: Arc<Notify>,
    }

    #[async_trait]
    impl FileCache for GatedFiles {
        async fn write(&self, name: &str, text: &str) -> Result<(), CatalogError> {
            self.gate.notified().await;
            let result = self.inner.write(name, text).await;
            self.written.notify_one();
            result
        }

        async fn read(&self, name: &str) -> Option<String> {
            self.inner.read(name).await
        }
    }

    pub fn repository(
        products: MockProductSource,
        discounts: MockDiscountSource,
        store: Arc<dyn ProductStore>,
        files: Arc<dyn FileCache>,
        resources: StaticResources,
    ) -> ProductRepository {
        ProductRepository::new(
            Arc::new(products),
            Arc::new(discounts),
            store,
            files,
            Arc::new(resources),
        )
    }
}
