use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use shopcart_core::{Product, ProductId, Resource};
use tracing::instrument;

use crate::error::CatalogError;
use crate::remote::ProductsPayload;
use crate::store::{ProductRecord, StoreError};

use super::ProductRepository;

impl ProductRepository {
    /// Stream the product catalog.
    ///
    /// Emits `Loading` first. When the persisted catalog is older than the
    /// freshness window it is refetched and replaced, and the fetched set is
    /// emitted. After that the stream follows the store and emits its
    /// contents on every change until the store goes away.
    ///
    /// A failed refresh emits `Error` and ends the stream without touching
    /// the store.
    #[instrument(skip(self))]
    pub fn products(&self) -> impl Stream<Item = Resource<Vec<Product>>> + Send + 'static {
        let repo = self.clone();

        stream! {
            yield Resource::Loading;

            let last_updated = match repo.store.most_recent_update().await {
                Ok(last_updated) => last_updated.unwrap_or(0),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read product store");
                    yield Resource::Error(CatalogError::from(e).to_string());
                    return;
                }
            };

            let now = repo.clock.now_millis();
            if repo.is_stale(last_updated, now) {
                match repo.refresh(now).await {
                    Ok(products) => {
                        yield Resource::Success(products);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Product refresh failed");
                        yield Resource::Error(e.to_string());
                        return;
                    }
                }
            } else {
                tracing::debug!(last_updated, now, "Product catalog is fresh, skipping refresh");
            }

            let mut receiver = match repo.store.subscribe().await {
                Ok(receiver) => receiver,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to subscribe to product store");
                    yield Resource::Error(CatalogError::from(e).to_string());
                    return;
                }
            };

            loop {
                let products: Vec<Product> = receiver
                    .borrow_and_update()
                    .iter()
                    .map(ProductRecord::to_product)
                    .collect();
                yield Resource::Success(products);

                if receiver.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    /// Whether a catalog written at `last_updated` must be refetched at `now`.
    pub(crate) fn is_stale(&self, last_updated: i64, now: i64) -> bool {
        now.saturating_sub(last_updated) > self.freshness.num_milliseconds()
    }

    /// Fetch the catalog and replace the persisted set with it.
    ///
    /// The write runs on its own task so it completes even if the caller is
    /// dropped while waiting.
    #[instrument(skip(self))]
    async fn refresh(&self, now: i64) -> Result<Vec<Product>, CatalogError> {
        let payload = self.product_source.fetch_products().await?;
        let records = stamp_records(payload, now);
        let products: Vec<Product> = records.iter().map(ProductRecord::to_product).collect();

        let store = Arc::clone(&self.store);
        tokio::spawn(async move { store.replace_all(records).await })
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))??;

        tracing::info!(count = products.len(), "Product catalog refreshed");
        Ok(products)
    }
}

/// Number the fetched products from 1 and stamp them with the write time.
fn stamp_records(payload: ProductsPayload, now: i64) -> Vec<ProductRecord> {
    (1..)
        .zip(payload.products)
        .map(|(id, product)| ProductRecord {
            id: ProductId::new(id),
            code: product.code,
            name: product.name,
            price: product.price,
            last_updated: now,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use chrono::TimeDelta;
    use futures::StreamExt;
    use rust_decimal_macros::dec;
    use shopcart_core::ProductCode;
    use tokio::sync::Notify;
    use tokio::time::timeout;

    use super::*;
    use crate::clock::FixedClock;
    use crate::files::{MemoryFileCache, StaticResources};
    use crate::remote::{MockDiscountSource, MockProductSource, ProductPayload};
    use crate::repository::testing::{FlakyStore, repository};
    use crate::store::{MemoryProductStore, ProductStore};

    const NOW: i64 = 1_700_000_000_000;

    fn payload() -> ProductsPayload {
        let product = |code: &str, name: &str, price| ProductPayload {
            code: ProductCode::parse(code).unwrap(),
            name: name.to_string(),
            price,
        };
        ProductsPayload {
            products: vec![
                product("VOUCHER", "Cabify Voucher", dec!(5)),
                product("TSHIRT", "Cabify T-Shirt", dec!(20)),
                product("MUG", "Cabify Coffee Mug", dec!(7.5)),
            ],
        }
    }

    fn stored(last_updated: i64) -> MemoryProductStore {
        MemoryProductStore::with_records(stamp_records(payload(), last_updated))
    }

    fn products_source(times: usize) -> MockProductSource {
        let mut source = MockProductSource::new();
        source
            .expect_fetch_products()
            .times(times)
            .returning(|| Ok(payload()));
        source
    }

    fn repo_with(source: MockProductSource, store: Arc<dyn ProductStore>) -> ProductRepository {
        repository(
            source,
            MockDiscountSource::new(),
            store,
            Arc::new(MemoryFileCache::new()),
            StaticResources::new(),
        )
        .with_clock(Arc::new(FixedClock::new(NOW)))
    }

    fn codes(resource: &Resource<Vec<Product>>) -> Vec<String> {
        resource
            .data()
            .unwrap()
            .iter()
            .map(|p| p.code.to_string())
            .collect()
    }

    #[test]
    fn test_stamp_records_assigns_ids_and_timestamp() {
        let records = stamp_records(payload(), NOW);

        let ids: Vec<i32> = records.iter().map(|r| r.id.as_i32()).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert!(records.iter().all(|r| r.last_updated == NOW));
    }

    #[tokio::test]
    async fn test_empty_store_triggers_refresh() {
        let store = Arc::new(MemoryProductStore::new());
        let repo = repo_with(products_source(1), store.clone());

        let states: Vec<_> = repo.products().take(3).collect().await;

        assert!(states.first().unwrap().is_loading());
        assert_eq!(codes(states.get(1).unwrap()), ["VOUCHER", "TSHIRT", "MUG"]);
        assert_eq!(codes(states.get(2).unwrap()), ["VOUCHER", "TSHIRT", "MUG"]);

        let records = store.snapshot();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.last_updated == NOW));
    }

    #[tokio::test]
    async fn test_stale_catalog_is_refetched() {
        let last = NOW - TimeDelta::hours(25).num_milliseconds();
        let store = Arc::new(stored(last));
        let repo = repo_with(products_source(1), store.clone());

        let states: Vec<_> = repo.products().take(2).collect().await;

        assert!(states.get(1).unwrap().is_success());
        assert_eq!(store.most_recent_update().await.unwrap(), Some(NOW));
    }

    #[tokio::test]
    async fn test_fresh_catalog_is_not_refetched() {
        let last = NOW - TimeDelta::hours(23).num_milliseconds();
        let store = Arc::new(stored(last));
        let repo = repo_with(products_source(0), store.clone());

        let states: Vec<_> = repo.products().take(2).collect().await;

        assert!(states.first().unwrap().is_loading());
        assert_eq!(codes(states.get(1).unwrap()), ["VOUCHER", "TSHIRT", "MUG"]);
        assert_eq!(store.most_recent_update().await.unwrap(), Some(last));
    }

    #[tokio::test]
    async fn test_freshness_boundary_is_strict() {
        let repo = repo_with(MockProductSource::new(), Arc::new(MemoryProductStore::new()));
        let day = TimeDelta::hours(24).num_milliseconds();

        assert!(!repo.is_stale(NOW - day, NOW));
        assert!(repo.is_stale(NOW - day - 1, NOW));
        assert!(repo.is_stale(0, NOW));
    }

    #[tokio::test]
    async fn test_custom_freshness_window() {
        let last = NOW - TimeDelta::hours(2).num_milliseconds();
        let repo = repo_with(products_source(1), Arc::new(stored(last)))
            .with_freshness(TimeDelta::hours(1));

        let states: Vec<_> = repo.products().take(2).collect().await;
        assert!(states.get(1).unwrap().is_success());
    }

    #[tokio::test]
    async fn test_empty_payload_is_success() {
        let mut source = MockProductSource::new();
        source
            .expect_fetch_products()
            .times(1)
            .returning(|| Ok(ProductsPayload::default()));
        let repo = repo_with(source, Arc::new(MemoryProductStore::new()));

        let states: Vec<_> = repo.products().take(3).collect().await;

        assert_eq!(states.get(1).unwrap(), &Resource::Success(Vec::new()));
        assert_eq!(states.get(2).unwrap(), &Resource::Success(Vec::new()));
    }

    #[tokio::test]
    async fn test_remote_failure_is_terminal_and_keeps_store() {
        let last = NOW - TimeDelta::hours(48).num_milliseconds();
        let store = Arc::new(stored(last));
        let mut source = MockProductSource::new();
        source.expect_fetch_products().times(1).returning(|| {
            Err(CatalogError::Status {
                status: 500,
                message: "Internal Server Error".to_string(),
            })
        });
        let repo = repo_with(source, store.clone());

        let states: Vec<_> = repo.products().collect().await;

        assert_eq!(
            states,
            vec![
                Resource::Loading,
                Resource::Error("HTTP 500: Internal Server Error".to_string()),
            ]
        );
        assert_eq!(store.most_recent_update().await.unwrap(), Some(last));
    }

    #[tokio::test]
    async fn test_store_read_failure_is_terminal() {
        let store = Arc::new(FlakyStore {
            fail_read: true,
            ..FlakyStore::default()
        });
        let repo = repo_with(products_source(0), store);

        let states: Vec<_> = repo.products().collect().await;

        assert_eq!(states.len(), 2);
        assert_eq!(
            states.get(1).unwrap().error(),
            Some("Storage error: store unavailable: read failed")
        );
    }

    #[tokio::test]
    async fn test_store_write_failure_is_terminal() {
        let store = Arc::new(FlakyStore {
            fail_write: true,
            ..FlakyStore::default()
        });
        let repo = repo_with(products_source(1), store.clone());

        let states: Vec<_> = repo.products().collect().await;

        assert_eq!(states.len(), 2);
        assert!(states.get(1).unwrap().is_error());
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert!(store.inner.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_failure_after_refresh() {
        let store = Arc::new(FlakyStore {
            fail_subscribe: true,
            ..FlakyStore::default()
        });
        let repo = repo_with(products_source(1), store);

        let states: Vec<_> = repo.products().collect().await;

        assert_eq!(states.len(), 3);
        assert!(states.get(1).unwrap().is_success());
        assert_eq!(
            states.get(2).unwrap().error(),
            Some("Storage error: store unavailable: subscribe failed")
        );
    }

    #[tokio::test]
    async fn test_later_store_changes_are_emitted() {
        let store = Arc::new(stored(NOW));
        let repo = repo_with(products_source(0), store.clone());
        let mut stream = Box::pin(repo.products());

        assert!(stream.next().await.unwrap().is_loading());
        assert_eq!(codes(&stream.next().await.unwrap()), ["VOUCHER", "TSHIRT", "MUG"]);

        let mut records = stamp_records(payload(), NOW);
        records.truncate(1);
        store.replace_all(records).await.unwrap();

        assert_eq!(codes(&stream.next().await.unwrap()), ["VOUCHER"]);
    }

    #[tokio::test]
    async fn test_refresh_write_survives_dropped_stream() {
        let gate = Arc::new(Notify::new());
        let store = Arc::new(FlakyStore {
            write_gate: Some(Arc::clone(&gate)),
            ..FlakyStore::default()
        });
        let repo = repo_with(products_source(1), store.clone());
        let mut written = store.inner.subscribe().await.unwrap();
        let mut stream = Box::pin(repo.products());

        assert!(stream.next().await.unwrap().is_loading());
        // Parked on the store write, so nothing else comes out.
        assert!(timeout(Duration::from_millis(50), stream.next()).await.is_err());
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert!(store.inner.snapshot().is_empty());

        drop(stream);
        gate.notify_one();

        written.changed().await.unwrap();
        let records = store.inner.snapshot();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.last_updated == NOW));
    }
}
