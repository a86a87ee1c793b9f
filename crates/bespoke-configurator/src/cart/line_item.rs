//! Configured line items.

use crate::catalog::Product;
use crate::configuration::Configuration;
use crate::error::ConfiguratorError;
use crate::ids::{LineItemId, ProductId};
use crate::money::Money;
use crate::pricing::price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A frozen configuration with a quantity.
///
/// Fields are read-only; the snapshot is a deep copy and does not follow
/// later changes to the configuration it was taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineItemId,
    product_id: ProductId,
    product_name: String,
    snapshot: Configuration,
    quantity: i64,
    unit_price: Money,
    total_price: Money,
    created_at: DateTime<Utc>,
}

/// Freeze `configuration` of `product` into a line item.
pub fn to_line_item(
    configuration: &Configuration,
    product: &Product,
    quantity: i64,
) -> Result<LineItem, ConfiguratorError> {
    validate_quantity(quantity)?;
    let unit_price = price(configuration, product);
    let total_price = unit_price
        .try_multiply(quantity)
        .ok_or(ConfiguratorError::Overflow)?;
    Ok(LineItem {
        id: LineItemId::generate(),
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        snapshot: configuration.clone(),
        quantity,
        unit_price,
        total_price,
        created_at: Utc::now(),
    })
}

fn validate_quantity(quantity: i64) -> Result<(), ConfiguratorError> {
    if quantity <= 0 {
        return Err(ConfiguratorError::InvalidQuantity(quantity));
    }
    if quantity > MAX_QUANTITY_PER_ITEM {
        return Err(ConfiguratorError::QuantityExceedsLimit(
            quantity,
            MAX_QUANTITY_PER_ITEM,
        ));
    }
    Ok(())
}

impl LineItem {
    pub fn id(&self) -> &LineItemId {
        &self.id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn snapshot(&self) -> &Configuration {
        &self.snapshot
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Price of one unit, computed when the item was created.
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// unit_price * quantity.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Same item with a different quantity; the id and creation time are kept.
    pub fn with_quantity(&self, quantity: i64) -> Result<LineItem, ConfiguratorError> {
        validate_quantity(quantity)?;
        let total_price = self
            .unit_price
            .try_multiply(quantity)
            .ok_or(ConfiguratorError::Overflow)?;
        Ok(LineItem {
            quantity,
            total_price,
            ..self.clone()
        })
    }

    /// Whether `other` is the same product with an identical configuration.
    pub fn same_configuration(&self, other: &LineItem) -> bool {
        self.product_id == other.product_id && self.snapshot == other.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{normalize, ProductDescriptor};
    use crate::config::ConfiguratorConfig;
    use crate::configuration::ConfigurationStore;
    use crate::ids::FabricId;
    use crate::money::Currency;
    use serde_json::json;
    use std::sync::Arc;

    fn product() -> Arc<Product> {
        let descriptor: ProductDescriptor = serde_json::from_value(json!({
            "id": "shirt",
            "name": "Oxford Shirt",
            "base_price": 8000,
            "fabrics": [{ "id": "navy", "price_modifier": 500 }]
        }))
        .unwrap();
        Arc::new(normalize(&descriptor, &ConfiguratorConfig::default()).unwrap())
    }

    #[test]
    fn test_line_item_prices_configuration() {
        let product = product();
        let store = ConfigurationStore::seeded(product.clone());
        let item = to_line_item(store.configuration(), &product, 3).unwrap();

        assert_eq!(item.unit_price(), Money::new(8500, Currency::USD));
        assert_eq!(item.total_price(), Money::new(25500, Currency::USD));
        assert_eq!(item.product_name(), "Oxford Shirt");
    }

    #[test]
    fn test_line_item_records_creation_time() {
        let product = product();
        let store = ConfigurationStore::seeded(product.clone());
        let before = Utc::now();
        let item = to_line_item(store.configuration(), &product, 1).unwrap();

        assert!(item.created_at() >= before);
        assert!(item.created_at() <= Utc::now());
    }

    #[test]
    fn test_line_item_ignores_later_mutation() {
        let product = product();
        let mut store = ConfigurationStore::seeded(product.clone());
        let item = to_line_item(store.configuration(), &product, 1).unwrap();

        store.set_fabric(None).unwrap();
        store.set_measurement("chest", "40");

        assert_eq!(item.snapshot().fabric_id(), Some(&FabricId::new("navy")));
        assert!(item.snapshot().measurements.is_empty());
        assert_eq!(item.unit_price(), Money::new(8500, Currency::USD));
    }

    #[test]
    fn test_line_item_rejects_bad_quantity() {
        let product = product();
        let store = ConfigurationStore::seeded(product.clone());

        assert_eq!(
            to_line_item(store.configuration(), &product, 0).unwrap_err(),
            ConfiguratorError::InvalidQuantity(0)
        );
        assert_eq!(
            to_line_item(store.configuration(), &product, 10_000).unwrap_err(),
            ConfiguratorError::QuantityExceedsLimit(10_000, MAX_QUANTITY_PER_ITEM)
        );
    }

    #[test]
    fn test_with_quantity_keeps_id() {
        let product = product();
        let store = ConfigurationStore::seeded(product.clone());
        let item = to_line_item(store.configuration(), &product, 1).unwrap();
        let more = item.with_quantity(4).unwrap();

        assert_eq!(more.id(), item.id());
        assert_eq!(more.created_at(), item.created_at());
        assert_eq!(more.total_price(), Money::new(34000, Currency::USD));
        assert_eq!(item.quantity(), 1);
    }
}
