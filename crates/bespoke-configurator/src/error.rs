//! Configurator error types.

use crate::ids::DesignId;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while configuring, persisting or ordering a garment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfiguratorError {
    /// Selection does not match the loaded catalog.
    #[error("Invalid selection for {category}: {reason}")]
    InvalidSelection {
        category: String,
        option: Option<String>,
        reason: String,
    },

    /// Catalog fetch failed or returned a malformed descriptor.
    #[error("Catalog load failed: {0}")]
    CatalogLoad(String),

    /// Restore target is absent from both stores.
    #[error("Saved design not found: {0}")]
    NotFound(DesignId),

    /// The remote design store could not be reached, so a lookup was inconclusive.
    #[error("Remote design store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The catalog did not become available within the hydration bound.
    #[error("Catalog not available after {0:?}")]
    CatalogTimeout(Duration),

    /// Remote or local design write failed.
    #[error("Design write failed: {reason}")]
    PersistenceWrite {
        reason: String,
        /// Id of the copy kept in the local store, if the fallback succeeded.
        local_fallback: Option<DesignId>,
    },

    /// Invalid restore state transition.
    #[error("Invalid restore transition from {from} to {to}")]
    InvalidRestoreTransition { from: String, to: String },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Order service rejected or failed the submission.
    #[error("Order submission failed: {0}")]
    OrderSubmission(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Local cache error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ConfiguratorError {
    /// Shorthand for an [`ConfiguratorError::InvalidSelection`].
    pub(crate) fn invalid_selection(
        category: impl Into<String>,
        option: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        ConfiguratorError::InvalidSelection {
            category: category.into(),
            option: option.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Whether the host may offer a retry for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConfiguratorError::CatalogLoad(_)
                | ConfiguratorError::CatalogTimeout(_)
                | ConfiguratorError::RemoteUnavailable(_)
                | ConfiguratorError::PersistenceWrite { .. }
                | ConfiguratorError::OrderSubmission(_)
        )
    }
}

impl From<bespoke_cache::CacheError> for ConfiguratorError {
    fn from(e: bespoke_cache::CacheError) -> Self {
        ConfiguratorError::Cache(e.to_string())
    }
}

impl From<serde_json::Error> for ConfiguratorError {
    fn from(e: serde_json::Error) -> Self {
        ConfiguratorError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for ConfiguratorError {
    fn from(e: toml::de::Error) -> Self {
        ConfiguratorError::Config(e.to_string())
    }
}
