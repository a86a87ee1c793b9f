//! Catalog loader: fetch a product descriptor and normalize it.

use crate::catalog::{normalize, CatalogSlot, Product, ProductDescriptor, RetryPolicy};
use crate::config::ConfiguratorConfig;
use crate::error::ConfiguratorError;
use crate::ids::ProductId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Error reported by a catalog source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP error: {status} for product {product_id}")]
    Http { status: u16, product_id: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Server errors, timeouts and dropped connections may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http { status, .. } => (500..600).contains(status),
            SourceError::Connection(_) | SourceError::Timeout(_) => true,
            SourceError::Malformed(_) => false,
        }
    }
}

/// The catalog service.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the descriptor of one product.
    async fn get(&self, product_id: &ProductId) -> Result<ProductDescriptor, SourceError>;
}

/// Fixed in-memory catalog (for development/testing).
#[derive(Debug, Default)]
pub struct StaticCatalogSource {
    products: HashMap<ProductId, ProductDescriptor>,
}

impl StaticCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, descriptor: ProductDescriptor) -> Self {
        self.products
            .insert(ProductId::new(descriptor.id.clone()), descriptor);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn get(&self, product_id: &ProductId) -> Result<ProductDescriptor, SourceError> {
        self.products
            .get(product_id)
            .cloned()
            .ok_or_else(|| SourceError::Http {
                status: 404,
                product_id: product_id.to_string(),
            })
    }
}

/// Loads and normalizes products, retrying transient source failures.
pub struct CatalogLoader<S: CatalogSource> {
    source: S,
    config: ConfiguratorConfig,
    retry: RetryPolicy,
}

impl<S: CatalogSource> CatalogLoader<S> {
    pub fn new(source: S, config: ConfiguratorConfig) -> Self {
        let retry = config.retry.policy();
        Self {
            source,
            config,
            retry,
        }
    }

    /// Override the retry policy taken from the config.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &ConfiguratorConfig {
        &self.config
    }

    /// Fetch and normalize `product_id`.
    ///
    /// Malformed descriptors fail immediately; transient failures are retried
    /// per the policy and then surface as [`ConfiguratorError::CatalogLoad`].
    pub async fn load(&self, product_id: &ProductId) -> Result<Arc<Product>, ConfiguratorError> {
        let mut attempt = 0;
        let descriptor = loop {
            match self.source.get(product_id).await {
                Ok(descriptor) => break descriptor,
                Err(e) => match self.retry.next_delay(&e, attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            product_id = %product_id,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Catalog fetch failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        tracing::warn!(product_id = %product_id, attempt, error = %e, "Catalog fetch failed");
                        return Err(ConfiguratorError::CatalogLoad(e.to_string()));
                    }
                },
            }
        };

        if descriptor.id.trim() != product_id.as_str() {
            return Err(ConfiguratorError::CatalogLoad(format!(
                "requested {} but catalog returned {}",
                product_id, descriptor.id
            )));
        }

        let product = normalize(&descriptor, &self.config)?;
        tracing::info!(product_id = %product_id, attempts = attempt + 1, "Catalog loaded");
        Ok(Arc::new(product))
    }

    /// Load `product_id` and publish it into `slot` on success.
    ///
    /// On failure the slot stays empty, so nothing gets seeded from it.
    pub async fn load_into(
        &self,
        product_id: &ProductId,
        slot: &CatalogSlot,
    ) -> Result<Arc<Product>, ConfiguratorError> {
        let product = self.load(product_id).await?;
        slot.publish(Arc::clone(&product));
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Backoff;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn descriptor() -> ProductDescriptor {
        serde_json::from_value(serde_json::json!({
            "id": "shirt",
            "base_price": 8500,
            "fabrics": [{ "id": "champagne", "price_modifier": 200 }]
        }))
        .unwrap()
    }

    /// Fails with the given error a fixed number of times, then succeeds.
    struct FlakySource {
        failures: u32,
        error: SourceError,
        calls: AtomicU32,
    }

    #[async_trait]
    impl CatalogSource for FlakySource {
        async fn get(&self, _product_id: &ProductId) -> Result<ProductDescriptor, SourceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(descriptor())
            }
        }
    }

    fn fast_retry(max: u32) -> RetryPolicy {
        RetryPolicy::new(max, Backoff::Fixed(Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_load_static_product() {
        let source = StaticCatalogSource::new().with_product(descriptor());
        let loader = CatalogLoader::new(source, ConfiguratorConfig::default());
        let product = loader.load(&ProductId::new("shirt")).await.unwrap();
        assert_eq!(product.base_price.amount_minor, 8500);
        assert_eq!(product.fabric_options.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_retried() {
        let loader = CatalogLoader::new(StaticCatalogSource::new(), ConfiguratorConfig::default())
            .with_retry(fast_retry(3));
        let err = loader.load(&ProductId::new("ghost")).await.unwrap_err();
        assert!(matches!(err, ConfiguratorError::CatalogLoad(_)));
    }

    #[tokio::test]
    async fn test_transient_failures_retried() {
        let source = FlakySource {
            failures: 2,
            error: SourceError::Http {
                status: 503,
                product_id: "shirt".into(),
            },
            calls: AtomicU32::new(0),
        };
        let loader =
            CatalogLoader::new(source, ConfiguratorConfig::default()).with_retry(fast_retry(2));
        assert!(loader.load(&ProductId::new("shirt")).await.is_ok());
        assert_eq!(loader.source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let source = FlakySource {
            failures: 5,
            error: SourceError::Connection("reset".into()),
            calls: AtomicU32::new(0),
        };
        let loader =
            CatalogLoader::new(source, ConfiguratorConfig::default()).with_retry(fast_retry(1));
        let err = loader.load(&ProductId::new("shirt")).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(loader.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_not_retried_and_slot_untouched() {
        let source = FlakySource {
            failures: 1,
            error: SourceError::Malformed("truncated json".into()),
            calls: AtomicU32::new(0),
        };
        let loader =
            CatalogLoader::new(source, ConfiguratorConfig::default()).with_retry(fast_retry(3));
        let slot = CatalogSlot::new();
        assert!(loader.load_into(&ProductId::new("shirt"), &slot).await.is_err());
        assert!(slot.current().is_none());
        assert_eq!(loader.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_into_publishes() {
        let source = StaticCatalogSource::new().with_product(descriptor());
        let loader = CatalogLoader::new(source, ConfiguratorConfig::default());
        let slot = CatalogSlot::new();
        let mut watch = slot.watch();
        loader.load_into(&ProductId::new("shirt"), &slot).await.unwrap();
        let product = watch
            .ready(&ProductId::new("shirt"), Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(product.id.as_str(), "shirt");
    }
}
