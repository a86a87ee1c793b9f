//! Saved design records.

use crate::configuration::{Configuration, ConfigurationStore};
use crate::error::ConfiguratorError;
use crate::ids::{DesignId, ProductId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which store a design was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Remote,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Local => "local",
            Origin::Remote => "remote",
        }
    }
}

/// An immutable snapshot of a configuration plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDesign {
    pub id: DesignId,
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub snapshot: Configuration,
    pub computed_price: Money,
    pub saved_at: DateTime<Utc>,
    pub origin: Origin,
}

impl SavedDesign {
    /// Snapshot the store's configuration under a fresh id.
    ///
    /// The store must be seeded; an unseeded store has no product to save
    /// against.
    pub fn capture(
        store: &ConfigurationStore,
        name: Option<String>,
        origin: Origin,
    ) -> Result<Self, ConfiguratorError> {
        let product = store.product().ok_or_else(|| {
            ConfiguratorError::invalid_selection("product", None, "catalog not loaded")
        })?;
        let snapshot = store.snapshot();
        let computed_price = crate::pricing::price(&snapshot, product);
        Ok(Self {
            id: DesignId::generate(),
            product_id: product.id.clone(),
            name,
            snapshot,
            computed_price,
            saved_at: Utc::now(),
            origin,
        })
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// Opaque authenticated-session token supplied by the host.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}
