//! Publication of the loaded catalog to waiting restores.

use crate::catalog::Product;
use crate::error::ConfiguratorError;
use crate::ids::ProductId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Holds the page's product once the catalog loader delivers it.
#[derive(Debug)]
pub struct CatalogSlot {
    tx: watch::Sender<Option<Arc<Product>>>,
}

impl CatalogSlot {
    /// An empty slot; the product has not loaded yet.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// A slot that already holds `product`.
    pub fn loaded(product: Arc<Product>) -> Self {
        let (tx, _rx) = watch::channel(Some(product));
        Self { tx }
    }

    /// Make `product` available to every watcher.
    pub fn publish(&self, product: Arc<Product>) {
        tracing::debug!(product_id = %product.id, "Catalog published");
        self.tx.send_replace(Some(product));
    }

    /// The product, if loaded.
    pub fn current(&self) -> Option<Arc<Product>> {
        self.tx.borrow().clone()
    }

    pub fn watch(&self) -> CatalogWatch {
        CatalogWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CatalogSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`CatalogSlot`].
#[derive(Debug, Clone)]
pub struct CatalogWatch {
    rx: watch::Receiver<Option<Arc<Product>>>,
}

impl CatalogWatch {
    /// Suspend until the product `product_id` is available, for at most `bound`.
    ///
    /// A slot dropped without ever publishing the product counts as a timeout:
    /// the catalog will not arrive.
    pub async fn ready(
        &mut self,
        product_id: &ProductId,
        bound: Duration,
    ) -> Result<Arc<Product>, ConfiguratorError> {
        let wait = self
            .rx
            .wait_for(|loaded| matches!(loaded, Some(p) if &p.id == product_id));

        match tokio::time::timeout(bound, wait).await {
            Ok(Ok(loaded)) => loaded
                .as_ref()
                .map(Arc::clone)
                .ok_or(ConfiguratorError::CatalogTimeout(bound)),
            Ok(Err(_closed)) => Err(ConfiguratorError::CatalogTimeout(bound)),
            Err(_elapsed) => Err(ConfiguratorError::CatalogTimeout(bound)),
        }
    }
}
