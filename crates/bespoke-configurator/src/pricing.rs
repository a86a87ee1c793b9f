//! Pricing engine.
//!
//! Price is a pure function of a configuration and its product: the base
//! price plus the fabric modifier plus every selected option's modifier.
//! Negative modifiers are allowed and the total is never clamped.

use crate::catalog::Product;
use crate::configuration::{Configuration, ConfigurationStore};
use crate::money::Money;

/// Total price of `configuration` for `product`.
///
/// Empty slots and a missing fabric contribute zero. The sum saturates
/// rather than failing, so a price is always available for display.
pub fn price(configuration: &Configuration, product: &Product) -> Money {
    let fabric = configuration
        .fabric
        .as_ref()
        .map(|f| f.price_modifier.amount_minor)
        .unwrap_or(0);

    configuration
        .selections
        .values()
        .flatten()
        .map(|option| option.price_modifier.amount_minor)
        .fold(product.base_price.saturating_add_minor(fabric), |total, m| {
            total.saturating_add_minor(m)
        })
}

/// Caches the last computed price for one store revision.
///
/// Any mutation bumps the store's revision, so a hit means the whole
/// configuration is unchanged.
#[derive(Debug, Default)]
pub struct PriceMemo {
    cached: Option<(u64, u64, Money)>,
}

impl PriceMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price of the store's configuration, recomputed only after a mutation.
    pub fn price(&mut self, store: &ConfigurationStore) -> Option<Money> {
        let key = (store.instance(), store.revision());
        if let Some((instance, revision, money)) = self.cached {
            if (instance, revision) == key {
                return Some(money);
            }
        }
        let money = store.price()?;
        self.cached = Some((key.0, key.1, money));
        Some(money)
    }

    pub fn is_cached_for(&self, store: &ConfigurationStore) -> bool {
        matches!(self.cached, Some((i, r, _)) if i == store.instance() && r == store.revision())
    }
}
