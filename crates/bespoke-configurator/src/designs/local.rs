//! Device-local design library.

use crate::designs::{Origin, SavedDesign};
use crate::error::ConfiguratorError;
use crate::ids::{DesignId, ProductId};
use bespoke_cache::{cache_key, Cache};

/// Capacity-bounded design list persisted in the local cache.
///
/// Entries are kept most-recently-saved first; once the list exceeds its
/// capacity the oldest entries are evicted.
#[derive(Debug, Clone)]
pub struct LocalDesignStore {
    cache: Cache,
    key: String,
    capacity: usize,
}

impl LocalDesignStore {
    /// Open the library for `device_scope`.
    pub fn new(cache: Cache, device_scope: &str, capacity: usize) -> Self {
        Self {
            cache,
            key: cache_key!("designs", device_scope),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Every stored design, newest first.
    pub fn all(&self) -> Result<Vec<SavedDesign>, ConfiguratorError> {
        Ok(self
            .cache
            .get::<Vec<SavedDesign>>(&self.key)?
            .unwrap_or_default())
    }

    /// Stored designs for one product, newest first.
    pub fn list(&self, product_id: &ProductId) -> Result<Vec<SavedDesign>, ConfiguratorError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|d| &d.product_id == product_id)
            .collect())
    }

    pub fn get(&self, id: &DesignId) -> Result<Option<SavedDesign>, ConfiguratorError> {
        Ok(self.all()?.into_iter().find(|d| &d.id == id))
    }

    /// Store `design` at the front, replacing any entry with the same id.
    ///
    /// Returns the ids evicted to stay within capacity.
    pub fn save(&self, design: SavedDesign) -> Result<Vec<DesignId>, ConfiguratorError> {
        let mut designs = self.all()?;
        designs.retain(|d| d.id != design.id);
        designs.insert(0, design.with_origin(Origin::Local));

        let evicted: Vec<DesignId> = if designs.len() > self.capacity {
            designs.split_off(self.capacity).into_iter().map(|d| d.id).collect()
        } else {
            Vec::new()
        };

        self.cache.set(&self.key, &designs)?;
        if !evicted.is_empty() {
            tracing::debug!(evicted = evicted.len(), capacity = self.capacity, "Evicted local designs");
        }
        Ok(evicted)
    }

    /// Remove `id`. Returns whether it was present.
    pub fn delete(&self, id: &DesignId) -> Result<bool, ConfiguratorError> {
        let mut designs = self.all()?;
        let before = designs.len();
        designs.retain(|d| &d.id != id);
        if designs.len() == before {
            return Ok(false);
        }
        self.cache.set(&self.key, &designs)?;
        Ok(true)
    }
}
