mod common;

use bespoke_configurator::catalog::{CatalogLoader, CatalogSlot, ProductDescriptor, StaticCatalogSource};
use bespoke_configurator::configuration::ConfigurationStore;
use bespoke_configurator::ids::{OptionId, ProductId};
use bespoke_configurator::ConfiguratorError;
use serde_json::json;

#[tokio::test]
async fn test_loaded_catalog_seeds_defaults() -> anyhow::Result<()> {
    let loader = CatalogLoader::new(
        StaticCatalogSource::new().with_product(common::shirt_descriptor()),
        common::config(),
    );
    let slot = CatalogSlot::new();
    let product = loader.load_into(&ProductId::new("oxford-shirt"), &slot).await?;
    assert!(slot.current().is_some());

    let store = ConfigurationStore::seeded(product);
    let legacy = store.configuration().legacy_view();
    assert_eq!(legacy.fabric.map(|f| f.as_str()), Some("white"));
    assert_eq!(legacy.sleeve, Some(&OptionId::new("long")));
    assert_eq!(legacy.pocket, Some(&OptionId::new("patch")));
    assert_eq!(legacy.cuff, None);
    assert_eq!(store.price().map(|p| p.amount_minor), Some(8500));
    Ok(())
}

#[tokio::test]
async fn test_legacy_fields_become_categories() -> anyhow::Result<()> {
    let descriptor: ProductDescriptor = serde_json::from_value(json!({
        "id": "classic-shirt",
        "base_price": 7000,
        "fabrics": [{ "id": "blue", "color_token": "blue" }],
        "collars": [{ "id": "cutaway", "price_modifier": 300 }],
        "cuffs": [{ "id": "barrel" }, { "id": "french", "price_modifier": 500 }]
    }))?;
    let loader = CatalogLoader::new(
        StaticCatalogSource::new().with_product(descriptor),
        common::config(),
    );
    let product = loader.load(&ProductId::new("classic-shirt")).await?;

    let keys: Vec<&str> = product.category_keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["collar", "cuff"]);

    let mut store = ConfigurationStore::seeded(product);
    store.set_selection(&"cuff".into(), Some(&OptionId::new("french")))?;
    assert_eq!(store.price().map(|p| p.amount_minor), Some(7800));
    assert!(store
        .layers()
        .iter()
        .any(|l| l.image == "/assets/garments/cuff/blue/french_front.png"));
    Ok(())
}

#[tokio::test]
async fn test_missing_product_leaves_slot_empty() {
    let loader = CatalogLoader::new(StaticCatalogSource::new(), common::config());
    let slot = CatalogSlot::new();

    let err = loader
        .load_into(&ProductId::new("oxford-shirt"), &slot)
        .await
        .unwrap_err();

    assert!(matches!(err, ConfiguratorError::CatalogLoad(_)));
    assert!(slot.current().is_none());
}
