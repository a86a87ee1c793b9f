//! Cart of configured line items.

use crate::cart::{LineItem, MAX_QUANTITY_PER_ITEM};
use crate::error::ConfiguratorError;
use crate::ids::{CartId, LineItemId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub currency: Currency,
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new(currency: Currency) -> Self {
        Self {
            id: CartId::generate(),
            currency,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Add a line item.
    ///
    /// An item with the same product and an identical configuration is merged
    /// into the existing line. Returns the id of the line holding the item.
    pub fn add(&mut self, item: LineItem) -> Result<LineItemId, ConfiguratorError> {
        if item.unit_price().currency != self.currency {
            return Err(ConfiguratorError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: item.unit_price().currency.code().to_string(),
            });
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.same_configuration(&item)) {
            let new_quantity = existing
                .quantity()
                .checked_add(item.quantity())
                .ok_or(ConfiguratorError::Overflow)?;
            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(ConfiguratorError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            *existing = existing.with_quantity(new_quantity)?;
            return Ok(existing.id().clone());
        }

        let id = item.id().clone();
        self.items.push(item);
        Ok(id)
    }

    /// Set a line's quantity; zero or less removes it.
    pub fn update_quantity(
        &mut self,
        line_item_id: &LineItemId,
        quantity: i64,
    ) -> Result<bool, ConfiguratorError> {
        if quantity <= 0 {
            return Ok(self.remove(line_item_id));
        }

        match self.items.iter_mut().find(|i| i.id() == line_item_id) {
            Some(item) => {
                *item = item.with_quantity(quantity)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove(&mut self, line_item_id: &LineItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| i.id() != line_item_id);
        self.items.len() < len_before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(LineItem::quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, line_item_id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id() == line_item_id)
    }

    pub fn subtotal(&self) -> Result<Money, ConfiguratorError> {
        let totals: Vec<Money> = self.items.iter().map(LineItem::total_price).collect();
        Money::try_sum(totals.iter(), self.currency).ok_or(ConfiguratorError::Overflow)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::USD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::to_line_item;
    use crate::catalog::{normalize, Product, ProductDescriptor};
    use crate::config::ConfiguratorConfig;
    use crate::configuration::ConfigurationStore;
    use serde_json::json;
    use std::sync::Arc;

    fn product() -> Arc<Product> {
        let descriptor: ProductDescriptor = serde_json::from_value(json!({
            "id": "shirt",
            "base_price": 8500,
            "fabrics": [{ "id": "white" }],
            "option_groups": [
                { "category_key": "collar", "options": [
                    { "id": "point" }, { "id": "spread", "price_modifier": 250 }
                ]}
            ]
        }))
        .unwrap();
        Arc::new(normalize(&descriptor, &ConfiguratorConfig::default()).unwrap())
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal().unwrap(), Money::zero(Currency::USD));
    }

    #[test]
    fn test_add_identical_configuration_merges() {
        let product = product();
        let store = ConfigurationStore::seeded(product.clone());
        let mut cart = Cart::default();

        let first = cart
            .add(to_line_item(store.configuration(), &product, 1).unwrap())
            .unwrap();
        let second = cart
            .add(to_line_item(store.configuration(), &product, 2).unwrap())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal().unwrap().amount_minor, 25500);
    }

    #[test]
    fn test_add_different_configuration_keeps_lines_apart() {
        let product = product();
        let mut store = ConfigurationStore::seeded(product.clone());
        let mut cart = Cart::default();

        cart.add(to_line_item(store.configuration(), &product, 1).unwrap())
            .unwrap();
        store
            .set_selection(&"collar".into(), Some(&"spread".into()))
            .unwrap();
        cart.add(to_line_item(store.configuration(), &product, 1).unwrap())
            .unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.subtotal().unwrap().amount_minor, 8500 + 8750);
    }

    #[test]
    fn test_merge_respects_quantity_limit() {
        let product = product();
        let store = ConfigurationStore::seeded(product.clone());
        let mut cart = Cart::default();

        cart.add(to_line_item(store.configuration(), &product, 9000).unwrap())
            .unwrap();
        let err = cart
            .add(to_line_item(store.configuration(), &product, 1000).unwrap())
            .unwrap_err();

        assert_eq!(
            err,
            ConfiguratorError::QuantityExceedsLimit(10_000, MAX_QUANTITY_PER_ITEM)
        );
        assert_eq!(cart.item_count(), 9000);
    }

    #[test]
    fn test_update_quantity_and_remove() {
        let product = product();
        let store = ConfigurationStore::seeded(product.clone());
        let mut cart = Cart::default();
        let id = cart
            .add(to_line_item(store.configuration(), &product, 1).unwrap())
            .unwrap();

        assert!(cart.update_quantity(&id, 4).unwrap());
        assert_eq!(cart.get(&id).unwrap().total_price().amount_minor, 34000);

        assert!(cart.update_quantity(&id, 0).unwrap());
        assert!(cart.is_empty());
        assert!(!cart.update_quantity(&id, 2).unwrap());
    }

    #[test]
    fn test_rejects_other_currency() {
        let product = product();
        let store = ConfigurationStore::seeded(product.clone());
        let mut cart = Cart::new(Currency::EUR);

        let err = cart
            .add(to_line_item(store.configuration(), &product, 1).unwrap())
            .unwrap_err();
        assert!(matches!(err, ConfiguratorError::CurrencyMismatch { .. }));
    }
}
