use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use shopcart_core::{DiscountConfig, Resource};
use tracing::instrument;

use crate::files::{DISCOUNT_RULES_FILE, DISCOUNTS_RESOURCE};

use super::ProductRepository;

impl ProductRepository {
    /// Stream the discount rule table.
    ///
    /// A successful remote fetch is saved to the cache file and emitted as
    /// the only state. When the fetch fails the error is emitted first, then
    /// the cached file if it parses, otherwise the bundled table if that
    /// parses. If neither parses the error is the last state.
    #[instrument(skip(self))]
    pub fn discount_rules(&self) -> impl Stream<Item = Resource<DiscountConfig>> + Send + 'static {
        let repo = self.clone();

        stream! {
            match repo.discount_source.fetch_discount_rules().await {
                Ok(config) => {
                    repo.save_discount_rules(&config).await;
                    yield Resource::Success(config);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discount rules fetch failed, using fallback");
                    yield Resource::Error(e.to_string());

                    if let Some(config) = repo.fallback_discount_rules().await {
                        yield Resource::Success(config);
                    }
                }
            }
        }
    }

    /// Write `config` to the cache file. Failures are logged and ignored.
    ///
    /// The write runs on its own task so it completes even if the caller is
    /// dropped while waiting.
    #[instrument(skip_all, fields(rules = config.len()))]
    async fn save_discount_rules(&self, config: &DiscountConfig) {
        let text = match config.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize discount rules");
                return;
            }
        };

        let files = Arc::clone(&self.files);
        let written =
            tokio::spawn(async move { files.write(DISCOUNT_RULES_FILE, &text).await }).await;

        match written {
            Ok(Ok(())) => tracing::debug!(file = DISCOUNT_RULES_FILE, "Saved discount rules"),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, file = DISCOUNT_RULES_FILE, "Failed to save discount rules");
            }
            Err(e) => {
                tracing::warn!(error = %e, file = DISCOUNT_RULES_FILE, "Discount rules write task failed");
            }
        }
    }

    /// The cached table, or the bundled one when the cache is missing or
    /// unparseable.
    async fn fallback_discount_rules(&self) -> Option<DiscountConfig> {
        if let Some(config) = parse_rules(DISCOUNT_RULES_FILE, self.files.read(DISCOUNT_RULES_FILE).await) {
            tracing::info!(source = DISCOUNT_RULES_FILE, "Using cached discount rules");
            return Some(config);
        }

        let bundled = parse_rules(DISCOUNTS_RESOURCE, self.resources.read_bundled(DISCOUNTS_RESOURCE));
        if bundled.is_some() {
            tracing::info!(source = DISCOUNTS_RESOURCE, "Using bundled discount rules");
        } else {
            tracing::warn!("No usable discount rules in cache or bundle");
        }
        bundled
    }
}

fn parse_rules(source: &str, text: Option<String>) -> Option<DiscountConfig> {
    let Some(text) = text else {
        tracing::debug!(source, "Discount rules not found");
        return None;
    };

    DiscountConfig::from_json(&text)
        .inspect_err(|e| tracing::warn!(source, error = %e, "Failed to parse discount rules"))
        .ok()
}
